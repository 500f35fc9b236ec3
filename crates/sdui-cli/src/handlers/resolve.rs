use crate::output;
use crate::types::OutputFormat;
use anyhow::Result;
use sdui_runtime::{Config, DocumentStore, Session};
use std::path::Path;

pub fn handle(tree: &Path, config: &Config, format: OutputFormat) -> Result<()> {
    let store = DocumentStore::load(tree)?;
    let session = Session::open(store, config);

    let state = session.resolve();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
        OutputFormat::Text => print!("{}", output::render_state(&state, output::use_color())),
    }
    Ok(())
}
