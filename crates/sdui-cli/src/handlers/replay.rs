use crate::output;
use crate::types::OutputFormat;
use anyhow::{Context, Result, anyhow, bail};
use futures::StreamExt;
use sdui_engine::ViewStream;
use sdui_runtime::{Config, DocumentStore, Session};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// One scripted write against the document store
#[derive(Debug, Clone, PartialEq)]
enum Update {
    Set { path: String, value: Value },
    Remove { path: String },
    Fail { path: String, message: String },
}

impl Update {
    fn apply(&self, store: &DocumentStore) {
        match self {
            Update::Set { path, value } => store.set(path, value.clone()),
            Update::Remove { path } => store.remove(path),
            Update::Fail { path, message } => store.fail(path, message.clone()),
        }
    }
}

fn parse_update(line_no: usize, text: &str) -> Result<Update> {
    let record: Value =
        serde_json::from_str(text).with_context(|| format!("line {}: invalid JSON", line_no))?;

    let path = record
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("line {}: missing \"path\"", line_no))?
        .to_string();

    if let Some(error) = record.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Ok(Update::Fail { path, message });
    }

    if record.get("remove").and_then(Value::as_bool) == Some(true) {
        return Ok(Update::Remove { path });
    }

    match record.get("value") {
        Some(value) => Ok(Update::Set {
            path,
            value: value.clone(),
        }),
        None => bail!(
            "line {}: expected one of \"value\", \"remove\" or \"error\"",
            line_no
        ),
    }
}

/// Parse a JSON-lines script; blank lines and `#` comments are skipped
fn parse_script(content: &str) -> Result<Vec<Update>> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| parse_update(line_no, line))
        .collect()
}

async fn print_states(mut stream: ViewStream, format: OutputFormat) -> Result<usize> {
    let color = output::use_color();
    let mut printed = 0;

    while let Some(state) = stream.next().await {
        printed += 1;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&state)?),
            OutputFormat::Text => {
                print!("[{}] {}", printed, output::render_state(&state, color))
            }
        }
    }
    Ok(printed)
}

pub fn handle(tree: &Path, updates: &Path, config: &Config, format: OutputFormat) -> Result<()> {
    let store = DocumentStore::load(tree)?;
    let content = std::fs::read_to_string(updates)
        .with_context(|| format!("failed to read {}", updates.display()))?;
    let script = parse_script(&content)?;
    info!(updates = script.len(), "replaying script");

    let session = Session::open(store, config);
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;

    let published = runtime.block_on(async {
        let printer = tokio::spawn(print_states(session.stream(), format));

        for update in &script {
            debug!(?update, "applying update");
            update.apply(session.store());
        }
        // Ends the stream once everything queued so far is printed
        session.engine().shutdown();

        let printed = printer.await??;
        anyhow::Ok(printed)
    })?;

    debug!(published, "replay finished");
    Ok(())
}
