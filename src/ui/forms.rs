use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, Genre, ReadStatus, YEAR_MAX, YEAR_MIN};

/// Form state for adding a book. Free-text fields hold raw keystrokes; the
/// genre and status fields are pick-one selectors over the closed enums, so
/// invalid values cannot be typed in the first place.
#[derive(Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre_index: usize,
    pub(crate) status_index: usize,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the book form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum BookField {
    Title,
    Author,
    Year,
    Genre,
    Status,
}

impl Default for BookField {
    fn default() -> Self {
        BookField::Title
    }
}

impl BookForm {
    /// Fresh form with the year pre-seeded to the current year, matching the
    /// most common entry, and the selectors on their first options.
    pub(crate) fn new() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: chrono::Local::now().year().to_string(),
            genre_index: 0,
            status_index: 0,
            active: BookField::Title,
            error: None,
        }
    }

    pub(crate) fn genre(&self) -> Genre {
        Genre::ALL[self.genre_index % Genre::ALL.len()]
    }

    pub(crate) fn status(&self) -> ReadStatus {
        ReadStatus::ALL[self.status_index % ReadStatus::ALL.len()]
    }

    /// Move focus one field forward (Tab / Down).
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Year,
            BookField::Year => BookField::Genre,
            BookField::Genre => BookField::Status,
            BookField::Status => BookField::Title,
        };
    }

    /// Move focus one field back (BackTab / Up).
    pub(crate) fn prev_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Status,
            BookField::Author => BookField::Title,
            BookField::Year => BookField::Author,
            BookField::Genre => BookField::Year,
            BookField::Status => BookField::Genre,
        };
    }

    /// Append a character to the active field, validating allowed input.
    /// Selector fields consume no characters; they change via
    /// [`BookForm::cycle`].
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            BookField::Title => {
                if !ch.is_control() {
                    self.title.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Author => {
                if !ch.is_control() {
                    self.author.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Year => {
                if ch.is_ascii_digit() {
                    self.year.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Genre | BookField::Status => false,
        }
    }

    /// Remove the last character from the active text field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Genre | BookField::Status => {}
        }
    }

    /// Step the active selector field left or right, wrapping at both ends.
    /// Returns false when the active field is not a selector.
    pub(crate) fn cycle(&mut self, delta: isize) -> bool {
        match self.active {
            BookField::Genre => {
                self.genre_index = step_index(self.genre_index, delta, Genre::ALL.len());
                true
            }
            BookField::Status => {
                self.status_index = step_index(self.status_index, delta, ReadStatus::ALL.len());
                true
            }
            _ => false,
        }
    }

    /// Validate the inputs and return typed values ready for persistence.
    /// The store runs the same checks again; doing them here as well lets the
    /// form point at the offending field before any backend work happens.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, i64, Genre, ReadStatus)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(anyhow!("Author name is required."));
        }
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Publication year is required."));
        }
        let year = year_raw
            .parse::<i64>()
            .context("Publication year must be a number.")?;
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Err(anyhow!(
                "Publication year must be between {YEAR_MIN} and {YEAR_MAX}."
            ));
        }
        Ok((
            title.to_string(),
            author.to_string(),
            year,
            self.genre(),
            self.status(),
        ))
    }

    /// Render a single line for the form widget. Text fields show their raw
    /// value; selector fields render as `< value >` to hint at Left/Right.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let (display, is_empty) = match field {
            BookField::Title => (placeholder_or(&self.title), self.title.is_empty()),
            BookField::Author => (placeholder_or(&self.author), self.author.is_empty()),
            BookField::Year => (placeholder_or(&self.year), self.year.is_empty()),
            BookField::Genre => (format!("< {} >", self.genre()), false),
            BookField::Status => (format!("< {} >", self.status()), false),
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if is_empty {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Character count of a text field, used to park the cursor at its end.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
            BookField::Year => self.year.chars().count(),
            BookField::Genre | BookField::Status => 0,
        }
    }
}

impl Default for BookForm {
    fn default() -> Self {
        Self::new()
    }
}

fn placeholder_or(value: &str) -> String {
    if value.is_empty() {
        "<required>".to_string()
    } else {
        value.to_string()
    }
}

fn step_index(current: usize, delta: isize, len: usize) -> usize {
    let len = len as isize;
    (current as isize + delta).rem_euclid(len) as usize
}

/// Snapshot of the book under the delete prompt, so the modal keeps showing
/// the right record even if the list refreshes underneath it.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author: String,
}

impl ConfirmBookDelete {
    pub(crate) fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> BookForm {
        let mut form = BookForm::new();
        form.title = "Dune".to_string();
        form.author = "Frank Herbert".to_string();
        form.year = "1965".to_string();
        form
    }

    #[test]
    fn parse_inputs_accepts_a_complete_form() {
        let mut form = filled_form();
        form.active = BookField::Genre;
        form.cycle(5);
        form.active = BookField::Status;
        form.cycle(2);

        let (title, author, year, genre, status) = form.parse_inputs().unwrap();
        assert_eq!(title, "Dune");
        assert_eq!(author, "Frank Herbert");
        assert_eq!(year, 1965);
        assert_eq!(genre, Genre::ScienceFiction);
        assert_eq!(status, ReadStatus::Finished);
    }

    #[test]
    fn parse_inputs_rejects_missing_or_bad_fields() {
        let mut form = filled_form();
        form.title = "   ".to_string();
        assert!(form.parse_inputs().is_err());

        let mut form = filled_form();
        form.author.clear();
        assert!(form.parse_inputs().is_err());

        let mut form = filled_form();
        form.year = "999".to_string();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn year_field_only_accepts_digits() {
        let mut form = BookForm::new();
        form.year.clear();
        form.active = BookField::Year;
        assert!(!form.push_char('x'));
        assert!(form.push_char('1'));
        assert_eq!(form.year, "1");
    }

    #[test]
    fn selector_cycling_wraps_both_ways() {
        let mut form = BookForm::new();
        form.active = BookField::Genre;
        form.cycle(-1);
        assert_eq!(form.genre(), Genre::Other);
        form.cycle(1);
        assert_eq!(form.genre(), Genre::Fiction);
    }
}
