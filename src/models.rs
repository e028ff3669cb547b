//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. The intent is that these types stay light-weight data holders so the
//! store backends and the presentation layer can share one vocabulary. The
//! genre and reading-status enumerations own every conversion to and from
//! their canonical text labels, which keeps the database column, the JSON
//! export, and the screens from each inventing their own spelling.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Earliest publication year the catalog accepts.
pub const YEAR_MIN: i64 = 1000;
/// Latest publication year the catalog accepts.
pub const YEAR_MAX: i64 = 2100;

/// One cataloged book. The struct mirrors rows in the `books` table; the
/// volatile backend stores the very same type, so both backends and the JSON
/// export agree on field names and ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier. Kept on the record even though the UI only
    /// needs display fields, because the delete flow bubbles the id back to
    /// the persistence layer.
    pub id: i64,
    /// Title displayed in lists and search results.
    pub title: String,
    /// Author field used both for display and search matching.
    pub author: String,
    /// Publication year, within [`YEAR_MIN`, `YEAR_MAX`].
    pub year: i64,
    pub genre: Genre,
    pub status: ReadStatus,
}

impl Book {
    /// Compose the one-line summary used by the library list and the search
    /// results, e.g. `Dune by Frank Herbert (1965) - Science Fiction | Finished`.
    pub fn display_line(&self) -> String {
        format!(
            "{} by {} ({}) - {} | {}",
            self.title, self.author, self.year, self.genre, self.status
        )
    }
}

/// Closed set of shelving genres. The text forms are the canonical labels
/// stored in the database and written to the JSON export, so the serde names
/// below must stay in lockstep with [`Genre::as_str`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genre {
    #[default]
    Fiction,
    #[serde(rename = "Non-fiction")]
    NonFiction,
    Mystery,
    Romance,
    Fantasy,
    #[serde(rename = "Science Fiction")]
    ScienceFiction,
    Horror,
    History,
    Other,
}

impl Genre {
    /// Every genre in the order the selector cycles through them.
    pub const ALL: [Genre; 9] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Mystery,
        Genre::Romance,
        Genre::Fantasy,
        Genre::ScienceFiction,
        Genre::Horror,
        Genre::History,
        Genre::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-fiction",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::Fantasy => "Fantasy",
            Genre::ScienceFiction => "Science Fiction",
            Genre::Horror => "Horror",
            Genre::History => "History",
            Genre::Other => "Other",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.as_str() == s)
            .ok_or_else(|| format!("unknown genre: {s}"))
    }
}

impl ToSql for Genre {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Genre {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: String| FromSqlError::Other(err.into()))
    }
}

/// Reading progress for a book. Same label discipline as [`Genre`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadStatus {
    #[default]
    #[serde(rename = "Not Read")]
    NotRead,
    #[serde(rename = "Currently Reading")]
    CurrentlyReading,
    Finished,
}

impl ReadStatus {
    /// Every status in the order the selector cycles through them.
    pub const ALL: [ReadStatus; 3] = [
        ReadStatus::NotRead,
        ReadStatus::CurrentlyReading,
        ReadStatus::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadStatus::NotRead => "Not Read",
            ReadStatus::CurrentlyReading => "Currently Reading",
            ReadStatus::Finished => "Finished",
        }
    }
}

impl fmt::Display for ReadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown reading status: {s}"))
    }
}

impl ToSql for ReadStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for ReadStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: String| FromSqlError::Other(err.into()))
    }
}

/// Aggregate view over the whole collection, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LibraryStats {
    pub total: usize,
    pub finished: usize,
    /// Share of finished books in percent, rounded to two decimals. Zero for
    /// an empty collection rather than a division error.
    pub percent_finished: f64,
}

impl LibraryStats {
    /// Derive the percentage from the raw counts. Rounding happens here so
    /// every backend reports identical figures.
    pub fn from_counts(total: usize, finished: usize) -> Self {
        let percent_finished = if total > 0 {
            (finished as f64 / total as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            total,
            finished,
            percent_finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_labels_round_trip() {
        for genre in Genre::ALL {
            assert_eq!(genre.as_str().parse::<Genre>().unwrap(), genre);
        }
        assert_eq!(Genre::ScienceFiction.to_string(), "Science Fiction");
        assert_eq!(Genre::NonFiction.to_string(), "Non-fiction");
        assert!("Sci-Fi".parse::<Genre>().is_err());
    }

    #[test]
    fn status_labels_round_trip() {
        for status in ReadStatus::ALL {
            assert_eq!(status.as_str().parse::<ReadStatus>().unwrap(), status);
        }
        assert_eq!(ReadStatus::NotRead.to_string(), "Not Read");
        assert!("Done".parse::<ReadStatus>().is_err());
    }

    #[test]
    fn serde_uses_canonical_labels() {
        let book = Book {
            id: 1,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            year: 1965,
            genre: Genre::ScienceFiction,
            status: ReadStatus::NotRead,
        };

        let json = serde_json::to_string_pretty(&book).unwrap();
        assert!(json.contains("\"Science Fiction\""));
        assert!(json.contains("\"Not Read\""));

        let restored: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, book);
    }

    #[test]
    fn stats_percent_rounds_to_two_decimals() {
        let empty = LibraryStats::from_counts(0, 0);
        assert_eq!(empty.percent_finished, 0.0);

        let half = LibraryStats::from_counts(4, 2);
        assert_eq!(half.percent_finished, 50.0);

        let third = LibraryStats::from_counts(3, 1);
        assert_eq!(third.percent_finished, 33.33);
    }
}
