// NOTE: CLI Rationale
//
// Why file-backed trees (not a live connection)?
// - A JSON export of the document tree is enough to reproduce what a screen renders
// - `resolve` answers "what would the screen show right now"
// - `replay` feeds a scripted sequence of writes and prints every published state
// - Both run the same Session the embedding app uses, so output matches the app

mod args;
mod commands;
mod handlers;
mod logging;
mod output;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
