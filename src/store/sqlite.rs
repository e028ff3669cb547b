use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use rusqlite::{params, Connection, Row};

use crate::models::{Book, Genre, LibraryStats, ReadStatus};

use super::error::{Result, StoreError};
use super::{validate_new_book, validate_query, LibraryStore};

/// Environment variable that overrides the database location. Takes the place
/// of a full connection string since the embedded store only needs a path.
const DB_PATH_ENV: &str = "LIBRARY_DB_PATH";
/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".personal-library-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";

/// Durable backend over an embedded SQLite database. The connection is opened
/// once and owned by the store for the life of the process; every operation
/// is a single synchronous statement against it.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at its configured location, creating the data
    /// directory and schema on first use. This is the only constructor that
    /// can fail with [`StoreError::Configuration`]; once it returns, the
    /// store is fully initialized.
    pub fn open_default() -> Result<Self> {
        let db_path = default_db_path()?;
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::open(&db_path)
    }

    /// Open (or create) the database file at an explicit path and run the
    /// lazy schema setup. Safe to call against an existing database: the
    /// schema statement is a no-op when the table is already there.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Private in-memory database, used by the test suite so contract runs
    /// exercise real SQL without touching the filesystem.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            year: row.get(3)?,
            genre: row.get(4)?,
            status: row.get(5)?,
        })
    }
}

/// Resolve the absolute path of the database: the `LIBRARY_DB_PATH` override
/// when set and non-empty, otherwise a dot-directory inside the user's home.
/// A system without a resolvable home directory cannot start the durable
/// backend at all, which is reported as a configuration problem rather than
/// a storage failure.
pub fn default_db_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os(DB_PATH_ENV).filter(|path| !path.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().ok_or_else(|| {
        StoreError::Configuration("could not locate home directory".into())
    })?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

/// Create the `books` table if this database has never seen one. Runs on
/// every open; `IF NOT EXISTS` keeps repeated initialization from touching
/// existing records. `AUTOINCREMENT` pins the no-id-reuse invariant even
/// after the highest-numbered row is deleted.
fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            year INTEGER NOT NULL,
            genre TEXT NOT NULL,
            status TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

impl LibraryStore for SqliteStore {
    /// Insert a brand new book. We echo the hydrated struct so callers can
    /// update UI state without having to re-query the database.
    fn add(
        &mut self,
        title: &str,
        author: &str,
        year: i64,
        genre: Genre,
        status: ReadStatus,
    ) -> Result<Book> {
        let (title, author) = validate_new_book(title, author, year)?;

        self.conn.execute(
            "INSERT INTO books (title, author, year, genre, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![title, author, year, genre, status],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Book {
            id,
            title,
            author,
            year,
            genre,
            status,
        })
    }

    fn list_all(&self) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, author, year, genre, status
             FROM books
             ORDER BY id",
        )?;

        let books = stmt
            .query_map([], Self::row_to_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(books)
    }

    fn remove(&mut self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])?;

        if deleted == 0 {
            Err(StoreError::NotFound(id))
        } else {
            Ok(())
        }
    }

    /// Substring match in SQL via `instr` on lowercased text, so `%` and `_`
    /// in a query match themselves and the semantics line up with the
    /// in-memory backend's `contains` check.
    fn search(&self, query: &str) -> Result<Vec<Book>> {
        let needle = validate_query(query)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, title, author, year, genre, status
             FROM books
             WHERE instr(lower(title), lower(?1)) > 0
                OR instr(lower(author), lower(?1)) > 0
             ORDER BY id",
        )?;

        let books = stmt
            .query_map([needle], Self::row_to_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(books)
    }

    fn stats(&self) -> Result<LibraryStats> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;

        let finished: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM books WHERE status = ?1",
            params![ReadStatus::Finished],
            |row| row.get(0),
        )?;

        Ok(LibraryStats::from_counts(total as usize, finished as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reopening_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("library.sqlite");

        {
            let mut store = SqliteStore::open(&db_path).unwrap();
            store
                .add("Foundation", "Isaac Asimov", 1951, Genre::ScienceFiction, ReadStatus::Finished)
                .unwrap();
            store
                .add("Emma", "Jane Austen", 1815, Genre::Romance, ReadStatus::NotRead)
                .unwrap();
        }

        // Second open runs the schema setup again; records must survive it.
        let mut store = SqliteStore::open(&db_path).unwrap();
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Foundation");
        assert_eq!(all[1].status, ReadStatus::NotRead);

        let next = store
            .add("Dracula", "Bram Stoker", 1897, Genre::Horror, ReadStatus::NotRead)
            .unwrap();
        assert_eq!(next.id, 3);
    }

    #[test]
    fn deleted_ids_are_never_reassigned() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = store
            .add("A", "First", 2000, Genre::Fiction, ReadStatus::NotRead)
            .unwrap();
        let second = store
            .add("B", "Second", 2001, Genre::Fiction, ReadStatus::NotRead)
            .unwrap();
        store.remove(second.id).unwrap();

        let third = store
            .add("C", "Third", 2002, Genre::Fiction, ReadStatus::NotRead)
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(third.id, second.id + 1);
    }

    #[test]
    fn corrupt_enum_label_is_a_storage_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO books (title, author, year, genre, status)
                 VALUES ('X', 'Y', 2000, 'Fiction', 'Skimmed')",
                [],
            )
            .unwrap();

        let err = store.list_all().unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    #[test]
    fn default_path_honors_environment_override() {
        let dir = tempfile::tempdir().unwrap();
        let override_path = dir.path().join("elsewhere.sqlite");
        env::set_var(DB_PATH_ENV, &override_path);

        let resolved = default_db_path().unwrap();
        env::remove_var(DB_PATH_ENV);
        assert_eq!(resolved, override_path);
    }
}
