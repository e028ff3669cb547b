use crate::models::{Book, Genre, LibraryStats, ReadStatus};

use super::error::{Result, StoreError};
use super::{validate_new_book, validate_query, LibraryStore};

/// Volatile backend: the whole collection lives in an owned vector and is
/// discarded with the store value. Useful for throwaway sessions and as the
/// reference implementation the SQLite backend is tested against.
///
/// Ids come from a counter that only ever moves forward, so a deleted id is
/// never handed out again within the store's lifetime and the ascending-id
/// ordering of [`LibraryStore::list_all`] is plain insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: Vec<Book>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            next_id: 0,
        }
    }
}

impl LibraryStore for MemoryStore {
    fn add(
        &mut self,
        title: &str,
        author: &str,
        year: i64,
        genre: Genre,
        status: ReadStatus,
    ) -> Result<Book> {
        let (title, author) = validate_new_book(title, author, year)?;

        self.next_id += 1;
        let book = Book {
            id: self.next_id,
            title,
            author,
            year,
            genre,
            status,
        };
        self.books.push(book.clone());
        Ok(book)
    }

    fn list_all(&self) -> Result<Vec<Book>> {
        Ok(self.books.clone())
    }

    fn remove(&mut self, id: i64) -> Result<()> {
        match self.books.iter().position(|book| book.id == id) {
            Some(index) => {
                self.books.remove(index);
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn search(&self, query: &str) -> Result<Vec<Book>> {
        let needle = validate_query(query)?.to_lowercase();
        Ok(self
            .books
            .iter()
            .filter(|book| {
                book.title.to_lowercase().contains(&needle)
                    || book.author.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<LibraryStats> {
        let finished = self
            .books
            .iter()
            .filter(|book| book.status == ReadStatus::Finished)
            .count();
        Ok(LibraryStats::from_counts(self.books.len(), finished))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.list_all().unwrap().is_empty());
        assert_eq!(store.stats().unwrap().total, 0);
    }

    #[test]
    fn ids_stay_monotone_across_deletes() {
        let mut store = MemoryStore::new();
        let a = store
            .add("A", "First", 2000, Genre::Fiction, ReadStatus::NotRead)
            .unwrap();
        let b = store
            .add("B", "Second", 2001, Genre::Fiction, ReadStatus::NotRead)
            .unwrap();
        store.remove(b.id).unwrap();

        let c = store
            .add("C", "Third", 2002, Genre::Fiction, ReadStatus::NotRead)
            .unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(c.id, 3);
    }

    #[test]
    fn search_matches_title_or_author() {
        let mut store = MemoryStore::new();
        store
            .add("Foundation", "Isaac Asimov", 1951, Genre::ScienceFiction, ReadStatus::NotRead)
            .unwrap();
        store
            .add("I, Robot", "Isaac Asimov", 1950, Genre::ScienceFiction, ReadStatus::NotRead)
            .unwrap();

        assert_eq!(store.search("robot").unwrap().len(), 1);
        assert_eq!(store.search("ASIMOV").unwrap().len(), 2);
        assert!(store.search("clarke").unwrap().is_empty());
    }
}
