//! Core library surface for the personal library manager TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the domain models, the store contract with its two backends, and
//! the interactive front-end.

pub mod models;
pub mod store;
pub mod ui;

/// The domain vocabulary shared by both backends and the UI.
pub use models::{Book, Genre, LibraryStats, ReadStatus};

/// The persistence contract plus the durable and volatile implementations.
pub use store::{LibraryStore, MemoryStore, SqliteStore, StoreError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
