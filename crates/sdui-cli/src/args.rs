use crate::types::{LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sdui")]
#[command(about = "Resolve server-driven UI document trees into view models", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $SDUI_CONFIG, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Diagnostics level on stderr; RUST_LOG takes precedence when set
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the view state a document tree resolves to
    Resolve {
        /// JSON export of the document tree
        tree: PathBuf,
    },

    /// Apply scripted writes to a tree and print every published state
    Replay {
        /// JSON export of the initial document tree
        tree: PathBuf,

        /// JSON-lines script: {"path", "value"}, {"path", "remove": true} or {"path", "error"}
        updates: PathBuf,
    },

    /// Print the effective configuration
    Config,
}
