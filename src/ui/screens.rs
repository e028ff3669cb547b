use crate::models::{Book, LibraryStats};

/// Results screen shown after a submitted search. Owns its own row vector so
/// the library list underneath keeps its selection while the user browses
/// matches.
pub(crate) struct SearchScreen {
    pub(crate) query: String,
    pub(crate) books: Vec<Book>,
    pub(crate) selected: usize,
}

impl SearchScreen {
    pub(crate) fn new(query: String, books: Vec<Book>) -> Self {
        Self {
            query,
            books,
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.books.is_empty() {
            return;
        }
        let len = self.books.len() as isize;
        let next = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = next as usize;
    }
}

/// Snapshot of the aggregate figures taken when the statistics screen opens.
/// The collection cannot change while the screen is up (every mutation path
/// goes through other screens), so the snapshot never goes stale.
pub(crate) struct StatsScreen {
    pub(crate) stats: LibraryStats,
}

impl StatsScreen {
    pub(crate) fn new(stats: LibraryStats) -> Self {
        Self { stats }
    }

    /// The nudge line under the progress gauge, picked by how much of the
    /// collection is finished.
    pub(crate) fn encouragement(&self) -> &'static str {
        let percent = self.stats.percent_finished;
        if percent == 0.0 {
            "You haven't read any books yet! Start reading today!"
        } else if percent < 50.0 {
            "Keep going! You're making progress."
        } else if percent < 100.0 {
            "You're doing great! Almost there."
        } else {
            "Congratulations! You've read all your books!"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_stays_in_bounds() {
        let mut screen = SearchScreen::new("x".to_string(), Vec::new());
        screen.move_selection(1);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn encouragement_tracks_the_percentage() {
        let at = |total, finished| StatsScreen::new(LibraryStats::from_counts(total, finished));
        assert!(at(3, 0).encouragement().contains("Start reading"));
        assert!(at(3, 1).encouragement().contains("Keep going"));
        assert!(at(3, 2).encouragement().contains("Almost there"));
        assert!(at(3, 3).encouragement().contains("Congratulations"));
    }
}
