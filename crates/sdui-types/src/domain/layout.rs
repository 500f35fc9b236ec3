use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the renderer arranges items.
///
/// Closed set: renderers match on it exhaustively. `columns` is always at
/// least 1 once a value has passed through the layout parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutVariant {
    #[default]
    List,
    Grid {
        columns: u32,
    },
}

impl LayoutVariant {
    pub fn is_grid(&self) -> bool {
        matches!(self, LayoutVariant::Grid { .. })
    }

    /// Number of items per row (1 for lists)
    pub fn columns(&self) -> u32 {
        match self {
            LayoutVariant::List => 1,
            LayoutVariant::Grid { columns } => *columns,
        }
    }
}

/// One layout entry exactly as the layout source delivered it.
///
/// Every field is optional: records written by hand into a remote store are
/// routinely incomplete, and the parser decides what a gap means.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawLayoutRecord {
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub columns: Option<i64>,
}

impl RawLayoutRecord {
    pub fn list() -> Self {
        Self {
            kind: Some("list".to_string()),
            columns: None,
        }
    }

    pub fn grid(columns: i64) -> Self {
        Self {
            kind: Some("grid".to_string()),
            columns: Some(columns),
        }
    }

    pub fn with_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            columns: None,
        }
    }
}

/// Mode name → raw layout record, one emission of the layout source
pub type RawLayoutDirectory = HashMap<String, RawLayoutRecord>;

/// Mode name → parsed layout
pub type LayoutDirectory = HashMap<String, LayoutVariant>;
