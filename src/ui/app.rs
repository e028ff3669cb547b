use std::cmp::min;
use std::fs;
use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::models::Book;
use crate::store::{LibraryStore, StoreError};

use super::forms::{BookField, BookForm, ConfirmBookDelete};
use super::helpers::{centered_rect, surface_error};
use super::screens::{SearchScreen, StatsScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// File the export flow writes next to the working directory, mirroring the
/// download name the collection is published under.
const EXPORT_FILE_NAME: &str = "books.json";

/// High-level navigation states. Keeping this explicit makes it easy to reason
/// about which rendering path runs and what keyboard shortcuts should do.
enum Screen {
    Library,
    SearchResults(SearchScreen),
    Stats(StatsScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    ConfirmDelete(ConfirmBookDelete),
    Searching(SearchState),
}

/// State for an active inline search entry.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. The store is held as a
/// trait object so the same app drives either backend; every catalog
/// operation goes through it and the cached `books` vector only ever holds
/// what the store last reported.
pub struct App {
    store: Box<dyn LibraryStore>,
    books: Vec<Book>,
    selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: Box<dyn LibraryStore>, books: Vec<Book>) -> Self {
        Self {
            store,
            books,
            selected: 0,
            screen: Screen::Library,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Library => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Up => self.move_selection(-1),
                    KeyCode::Down => self.move_selection(1),
                    KeyCode::PageUp => self.move_selection(-5),
                    KeyCode::PageDown => self.move_selection(5),
                    KeyCode::Home => self.selected = 0,
                    KeyCode::End => {
                        if !self.books.is_empty() {
                            self.selected = self.books.len() - 1;
                        }
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => {
                        self.clear_status();
                        return Ok(Mode::AddingBook(BookForm::new()));
                    }
                    KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Char('-') => {
                        if let Some(book) = self.current_book().cloned() {
                            self.clear_status();
                            return Ok(Mode::ConfirmDelete(ConfirmBookDelete::from(book)));
                        } else {
                            self.set_status("No book selected to remove.", StatusKind::Error);
                        }
                    }
                    KeyCode::Char('/') | KeyCode::Char('f') | KeyCode::Char('F') => {
                        self.clear_status();
                        return Ok(Mode::Searching(SearchState {
                            query: String::new(),
                        }));
                    }
                    KeyCode::Char('s') | KeyCode::Char('S') => {
                        self.clear_status();
                        self.open_stats();
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => self.export_library(),
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::SearchResults(ref mut results) => {
                let mut back_to_library = false;
                let mut new_search = false;

                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc => back_to_library = true,
                    KeyCode::Up => results.move_selection(-1),
                    KeyCode::Down => results.move_selection(1),
                    KeyCode::PageUp => results.move_selection(-5),
                    KeyCode::PageDown => results.move_selection(5),
                    KeyCode::Char('/') | KeyCode::Char('f') | KeyCode::Char('F') => {
                        new_search = true;
                    }
                    _ => {}
                }

                if back_to_library {
                    self.clear_status();
                    self.screen = Screen::Library;
                } else if new_search {
                    self.clear_status();
                    return Ok(Mode::Searching(SearchState {
                        query: String::new(),
                    }));
                }

                Ok(Mode::Normal)
            }
            Screen::Stats(_) => {
                match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                    }
                    KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('S') => {
                        self.clear_status();
                        self.screen = Screen::Library;
                    }
                    KeyCode::Char('e') | KeyCode::Char('E') => self.export_library(),
                    _ => {}
                }
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => {
                form.cycle(-1);
            }
            KeyCode::Right => {
                form.cycle(1);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Search is submit-based: the query only hits the store on Enter, and a
    /// blank query is bounced back by the store as a validation error rather
    /// than being treated as match-all.
    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                return match self.store.search(&state.query) {
                    Ok(books) => {
                        self.clear_status();
                        let query = state.query.trim().to_string();
                        self.screen = Screen::SearchResults(SearchScreen::new(query, books));
                        Ok(Mode::Normal)
                    }
                    Err(StoreError::Validation(message)) => {
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::Searching(state))
                    }
                    Err(err) => {
                        self.set_status(err.to_string(), StatusKind::Error);
                        Ok(Mode::Normal)
                    }
                };
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                }
            }
            _ => {}
        }
        Ok(Mode::Searching(state))
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Library => self.draw_library(frame, content_area),
            Screen::SearchResults(results) => self.draw_search_results(frame, content_area, results),
            Screen::Stats(stats) => self.draw_stats(frame, content_area, stats),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Your Book Collection")
            .borders(Borders::ALL);

        if self.books.is_empty() {
            let message = Paragraph::new("No books added yet. Press 'a' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .books
            .iter()
            .map(|book| ListItem::new(book.display_line()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_search_results(&self, frame: &mut Frame, area: Rect, results: &SearchScreen) {
        let block = Block::default()
            .title(format!("Search Results for \"{}\"", results.query))
            .borders(Borders::ALL);

        if results.books.is_empty() {
            let message = Paragraph::new("No matching books found.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = results
            .books
            .iter()
            .map(|book| ListItem::new(book.display_line()))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(results.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_stats(&self, frame: &mut Frame, area: Rect, screen: &StatsScreen) {
        let stats = screen.stats;
        let block = Block::default()
            .title("Library Statistics")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let figures = vec![
            Line::from(format!("Total Books: {}", stats.total)),
            Line::from(format!("Books Read: {}", stats.finished)),
            Line::from(format!("Percentage Read: {:.2}%", stats.percent_finished)),
            Line::from(""),
        ];
        frame.render_widget(Paragraph::new(figures), chunks[0]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .ratio((stats.percent_finished / 100.0).clamp(0.0, 1.0))
            .label(format!("{:.2}%", stats.percent_finished));
        frame.render_widget(gauge, chunks[1]);

        let encouragement = Paragraph::new(screen.encouragement()).wrap(Wrap { trim: true });
        frame.render_widget(encouragement, chunks[3]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) => Line::from(vec![
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[←→]", key_style),
                Span::raw(" Choose   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Save   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::ConfirmDelete(_)) => Line::from(vec![
                Span::styled("[Y]", key_style),
                Span::raw(" Confirm   "),
                Span::styled("[N/Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (_, Mode::Searching(_)) => Line::from(vec![
                Span::styled("[Enter]", key_style),
                Span::raw(" Search   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel"),
            ]),
            (Screen::Library, _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[a]", key_style),
                Span::raw(" Add   "),
                Span::styled("[d]", key_style),
                Span::raw(" Remove   "),
                Span::styled("[/]", key_style),
                Span::raw(" Search   "),
                Span::styled("[s]", key_style),
                Span::raw(" Stats   "),
                Span::styled("[e]", key_style),
                Span::raw(" Export   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::SearchResults(_), _) => Line::from(vec![
                Span::styled("[↑↓]", key_style),
                Span::raw(" Navigate   "),
                Span::styled("[/]", key_style),
                Span::raw(" New Search   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
            (Screen::Stats(_), _) => Line::from(vec![
                Span::styled("[e]", key_style),
                Span::raw(" Export   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Back   "),
                Span::styled("[q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            form.build_line("Year", BookField::Year),
            form.build_line("Genre", BookField::Genre),
            form.build_line("Status", BookField::Status),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        // Only the text fields get a visible cursor; the selectors are
        // operated with Left/Right instead of typed input.
        let cursor = match form.active {
            BookField::Title => Some(("Title: ", 0u16, BookField::Title)),
            BookField::Author => Some(("Author: ", 1, BookField::Author)),
            BookField::Year => Some(("Year: ", 2, BookField::Year)),
            BookField::Genre | BookField::Status => None,
        };
        if let Some((prefix, row, field)) = cursor {
            let cursor_x = inner.x + prefix.len() as u16 + form.value_len(field) as u16;
            frame.set_cursor_position((cursor_x, inner.y + row));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Remove '{}' by {}?",
                confirm.title, confirm.author
            )),
            Line::from("The record cannot be restored afterwards."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Search by Title or Author");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let (title, author, year, genre, status) = form.parse_inputs()?;
        let book = self.store.add(&title, &author, year, genre, status)?;
        self.reload_books(Some(book.id))?;
        self.set_status(
            format!("'{}' by {} added successfully.", book.title, book.author),
            StatusKind::Info,
        );
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) -> Result<()> {
        self.store.remove(confirm.id)?;
        self.reload_books(None)?;
        self.set_status(
            format!("'{}' removed successfully.", confirm.title),
            StatusKind::Info,
        );
        Ok(())
    }

    fn open_stats(&mut self) {
        match self.store.stats() {
            Ok(stats) => self.screen = Screen::Stats(StatsScreen::new(stats)),
            Err(err) => self.set_status(err.to_string(), StatusKind::Error),
        }
    }

    /// Write the current collection to `books.json`. An empty collection is
    /// reported instead of producing an empty file.
    fn export_library(&mut self) {
        match self.perform_export() {
            Ok(Some(count)) => {
                let noun = if count == 1 { "book" } else { "books" };
                self.set_status(
                    format!("Exported {count} {noun} to {EXPORT_FILE_NAME}."),
                    StatusKind::Info,
                );
            }
            Ok(None) => self.set_status("No books to export yet.", StatusKind::Info),
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn perform_export(&self) -> Result<Option<usize>> {
        let total = self.store.stats()?.total;
        if total == 0 {
            return Ok(None);
        }
        let bytes = self.store.export_json()?;
        fs::write(EXPORT_FILE_NAME, bytes).context("failed to write export file")?;
        Ok(Some(total))
    }

    /// Refresh the cached list from the store and keep the selection valid,
    /// optionally following a freshly inserted record.
    fn reload_books(&mut self, focus_id: Option<i64>) -> Result<()> {
        self.books = self.store.list_all()?;

        if let Some(id) = focus_id {
            if let Some(index) = self.books.iter().position(|book| book.id == id) {
                self.selected = index;
                return Ok(());
            }
        }

        if self.books.is_empty() {
            self.selected = 0;
        } else {
            self.selected = min(self.selected, self.books.len() - 1);
        }
        Ok(())
    }

    fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let len = self.books.len() as isize;
        self.selected = (self.selected as isize + offset).clamp(0, len - 1) as usize;
    }
}
