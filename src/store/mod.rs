//! Custody of the book collection, split across logical submodules. The
//! [`LibraryStore`] trait is the single contract the rest of the application
//! codes against; the two implementations differ only in where the records
//! live (an embedded SQLite file versus a session-scoped vector), never in
//! semantics. Shared input validation sits here so the backends cannot drift
//! apart on what counts as a well-formed record.

mod error;
mod memory;
mod sqlite;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::models::{Book, Genre, LibraryStats, ReadStatus, YEAR_MAX, YEAR_MIN};

/// Operations every backend offers over the catalog. The trait is object
/// safe on purpose: the UI owns a `Box<dyn LibraryStore>` and stays unaware
/// of which backend the process was started with.
pub trait LibraryStore {
    /// Validate and persist a new record, returning it with its fresh,
    /// store-unique id. Validation failures leave the collection untouched.
    fn add(
        &mut self,
        title: &str,
        author: &str,
        year: i64,
        genre: Genre,
        status: ReadStatus,
    ) -> Result<Book>;

    /// Every record in ascending id order, which equals insertion order
    /// because ids are never reused or reordered. An empty collection is an
    /// empty vector, not an error.
    fn list_all(&self) -> Result<Vec<Book>>;

    /// Delete one record. Removing an id that does not exist (any more) is
    /// reported as [`StoreError::NotFound`], so a repeated delete of the same
    /// record stays observable to the caller.
    fn remove(&mut self, id: i64) -> Result<()>;

    /// Case-insensitive substring match against title or author, preserving
    /// `list_all` ordering. A blank query is a caller error, not match-all.
    fn search(&self, query: &str) -> Result<Vec<Book>>;

    /// Derived totals over the collection. No side effects.
    fn stats(&self) -> Result<LibraryStats>;

    /// Serialize the full collection, in `list_all` order, as a
    /// pretty-printed JSON array of objects with explicit field names.
    /// Parsing the bytes back reconstructs an equal collection, which the
    /// round-trip tests below pin down.
    fn export_json(&self) -> Result<Vec<u8>> {
        let books = self.list_all()?;
        Ok(serde_json::to_vec_pretty(&books)?)
    }
}

/// Check a prospective record against the catalog invariants and hand back
/// the trimmed text fields ready for storage. Both backends call this before
/// touching their medium, so an `add` either fully succeeds or has no effect.
pub(crate) fn validate_new_book(
    title: &str,
    author: &str,
    year: i64,
) -> Result<(String, String)> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::Validation("Book title is required.".into()));
    }
    let author = author.trim();
    if author.is_empty() {
        return Err(StoreError::Validation("Author name is required.".into()));
    }
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(StoreError::Validation(format!(
            "Publication year must be between {YEAR_MIN} and {YEAR_MAX}."
        )));
    }
    Ok((title.to_string(), author.to_string()))
}

/// Reject blank search input; return the trimmed query for matching.
pub(crate) fn validate_query(query: &str) -> Result<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(StoreError::Validation(
            "Please enter a search query.".into(),
        ));
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The backend-independent contract. Each backend test below feeds a
    /// fresh, empty store through the same sequence so the two cannot drift.
    fn check_contract(store: &mut dyn LibraryStore) {
        assert!(store.list_all().unwrap().is_empty());

        let empty_stats = store.stats().unwrap();
        assert_eq!(empty_stats, LibraryStats::from_counts(0, 0));

        // Rejected inputs must leave the collection untouched.
        let err = store
            .add("", "Isaac Asimov", 1951, Genre::ScienceFiction, ReadStatus::NotRead)
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let err = store
            .add("Foundation", "   ", 1951, Genre::ScienceFiction, ReadStatus::NotRead)
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let err = store
            .add("Foundation", "Isaac Asimov", 999, Genre::ScienceFiction, ReadStatus::NotRead)
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let err = store
            .add("Foundation", "Isaac Asimov", 2101, Genre::ScienceFiction, ReadStatus::NotRead)
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list_all().unwrap().is_empty());

        let foundation = store
            .add(
                "  Foundation  ",
                "Isaac Asimov",
                1951,
                Genre::ScienceFiction,
                ReadStatus::Finished,
            )
            .unwrap();
        assert_eq!(foundation.title, "Foundation");
        let emma = store
            .add("Emma", "Jane Austen", 1815, Genre::Romance, ReadStatus::Finished)
            .unwrap();
        let dracula = store
            .add("Dracula", "Bram Stoker", 1897, Genre::Horror, ReadStatus::NotRead)
            .unwrap();
        let hobbit = store
            .add(
                "The Hobbit",
                "J.R.R. Tolkien",
                1937,
                Genre::Fantasy,
                ReadStatus::CurrentlyReading,
            )
            .unwrap();
        assert!(foundation.id < emma.id && emma.id < dracula.id && dracula.id < hobbit.id);

        let all = store.list_all().unwrap();
        assert_eq!(
            all,
            vec![
                foundation.clone(),
                emma.clone(),
                dracula.clone(),
                hobbit.clone()
            ]
        );

        // Boundary years are inside the accepted range.
        let oldest = store
            .add("Beowulf", "Unknown", 1000, Genre::History, ReadStatus::NotRead)
            .unwrap();
        let newest = store
            .add("Far Future", "Nobody Yet", 2100, Genre::Other, ReadStatus::NotRead)
            .unwrap();
        store.remove(oldest.id).unwrap();
        store.remove(newest.id).unwrap();

        // Substring search, case-insensitive, on title or author.
        let hits = store.search("asimov").unwrap();
        assert_eq!(hits, vec![foundation.clone()]);
        let hits = store.search("THE").unwrap();
        assert_eq!(hits, vec![hobbit.clone()]);
        assert!(store.search("austen 2").unwrap().is_empty());
        let err = store.search("   ").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.finished, 2);
        assert_eq!(stats.percent_finished, 50.0);

        // Export mirrors list_all exactly, ids included.
        let exported = store.export_json().unwrap();
        let restored: Vec<crate::models::Book> = serde_json::from_slice(&exported).unwrap();
        assert_eq!(restored, store.list_all().unwrap());

        // One-shot deletion: the second attempt must surface NotFound.
        store.remove(emma.id).unwrap();
        let err = store.remove(emma.id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == emma.id));
        assert_eq!(store.list_all().unwrap().len(), 3);

        // Ids of deleted records never come back.
        let late = store
            .add("Ubik", "Philip K. Dick", 1969, Genre::ScienceFiction, ReadStatus::NotRead)
            .unwrap();
        assert!(late.id > hobbit.id);
    }

    #[test]
    fn memory_store_honors_contract() {
        let mut store = MemoryStore::new();
        check_contract(&mut store);
    }

    #[test]
    fn sqlite_store_honors_contract() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        check_contract(&mut store);
    }

    #[test]
    fn validation_messages_read_like_the_ui() {
        let err = validate_new_book("", "A", 2000).unwrap_err();
        assert_eq!(err.to_string(), "Book title is required.");
        let err = validate_query("").unwrap_err();
        assert_eq!(err.to_string(), "Please enter a search query.");
    }
}
