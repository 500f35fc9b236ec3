use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the three upstream sources a value or failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Items,
    Layout,
    Meta,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Items => "items",
            SourceKind::Layout => "layout",
            SourceKind::Meta => "meta",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported on a source's error channel.
///
/// `source` is filled in by the engine when the error crosses into it, so
/// adapters may report errors without knowing which slot they feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceError {
    pub source: Option<SourceKind>,
    pub message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            source: None,
            message: message.into(),
        }
    }

    pub fn from_source(source: SourceKind, message: impl Into<String>) -> Self {
        Self {
            source: Some(source),
            message: message.into(),
        }
    }

    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source.get_or_insert(source);
        self
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Some(kind) => write!(f, "{} source failed: {}", kind, self.message),
            None => write!(f, "source failed: {}", self.message),
        }
    }
}

impl std::error::Error for SourceError {}
