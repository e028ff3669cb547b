//! Ratatui front-end for the personal library manager. The module mirrors the
//! four surfaces of the catalog (collection list, add form, search, and
//! statistics with export) while every piece of catalog logic stays behind
//! the store trait; the code here only moves keystrokes in and rows out.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
