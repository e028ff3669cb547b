//! Binary entry point that glues a library store to the TUI. The
//! bootstrapping pipeline is short on purpose: pick the backend, hydrate the
//! initial book list, and drive the Ratatui event loop until the user exits.

use personal_library_manager::{run_app, App, LibraryStore, MemoryStore, SqliteStore};

/// Initialize persistence, load cached data, and launch the Ratatui event
/// loop. Passing `--ephemeral` runs a throwaway in-memory session instead of
/// opening the on-disk database.
///
/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unresolvable database location) to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    let ephemeral = std::env::args().skip(1).any(|arg| arg == "--ephemeral");

    let store: Box<dyn LibraryStore> = if ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(SqliteStore::open_default()?)
    };

    let books = store.list_all()?;
    let mut app = App::new(store, books);
    run_app(&mut app)
}
