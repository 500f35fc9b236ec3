use sdui_types::{LayoutDirectory, LayoutVariant, RawLayoutDirectory, RawLayoutRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

const KIND_LIST: &str = "list";
const KIND_GRID: &str = "grid";

/// What to do with a grid record whose `columns` is zero or negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridColumnsPolicy {
    /// Keep the grid, with a single column
    #[default]
    Clamp,
    /// Drop to the list layout
    Reject,
}

/// Why a layout record did not parse as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutDiagnostic {
    MissingKind,
    UnknownKind(String),
    MissingColumns,
    ColumnsClamped { given: i64, applied: u32 },
    ColumnsRejected { given: i64 },
}

impl fmt::Display for LayoutDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutDiagnostic::MissingKind => write!(f, "layout record has no kind"),
            LayoutDiagnostic::UnknownKind(kind) => {
                write!(f, "unrecognized layout kind '{}'", kind)
            }
            LayoutDiagnostic::MissingColumns => write!(f, "grid layout has no columns"),
            LayoutDiagnostic::ColumnsClamped { given, applied } => {
                write!(f, "grid columns {} out of range, using {}", given, applied)
            }
            LayoutDiagnostic::ColumnsRejected { given } => {
                write!(f, "grid columns {} rejected", given)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLayout {
    pub variant: LayoutVariant,
    pub diagnostic: Option<LayoutDiagnostic>,
}

impl ParsedLayout {
    fn clean(variant: LayoutVariant) -> Self {
        Self {
            variant,
            diagnostic: None,
        }
    }

    fn fallback(diagnostic: LayoutDiagnostic) -> Self {
        Self {
            variant: LayoutVariant::List,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Classify a raw record without logging.
///
/// Total over every input: anything that is not a well-formed list or grid
/// record becomes `List` with a diagnostic explaining why.
pub fn inspect(raw: &RawLayoutRecord, policy: GridColumnsPolicy) -> ParsedLayout {
    let Some(kind) = raw.kind.as_deref() else {
        return ParsedLayout::fallback(LayoutDiagnostic::MissingKind);
    };

    match kind {
        KIND_LIST => ParsedLayout::clean(LayoutVariant::List),
        KIND_GRID => match raw.columns {
            None => ParsedLayout::fallback(LayoutDiagnostic::MissingColumns),
            Some(given) => grid_columns(given, policy),
        },
        other => ParsedLayout::fallback(LayoutDiagnostic::UnknownKind(other.to_string())),
    }
}

fn grid_columns(given: i64, policy: GridColumnsPolicy) -> ParsedLayout {
    if given >= 1 {
        return match u32::try_from(given) {
            Ok(columns) => ParsedLayout::clean(LayoutVariant::Grid { columns }),
            Err(_) => ParsedLayout {
                variant: LayoutVariant::Grid { columns: u32::MAX },
                diagnostic: Some(LayoutDiagnostic::ColumnsClamped {
                    given,
                    applied: u32::MAX,
                }),
            },
        };
    }

    match policy {
        GridColumnsPolicy::Clamp => ParsedLayout {
            variant: LayoutVariant::Grid { columns: 1 },
            diagnostic: Some(LayoutDiagnostic::ColumnsClamped { given, applied: 1 }),
        },
        GridColumnsPolicy::Reject => {
            ParsedLayout::fallback(LayoutDiagnostic::ColumnsRejected { given })
        }
    }
}

/// Parse one record with the default columns policy
pub fn parse(raw: &RawLayoutRecord) -> LayoutVariant {
    parse_with(raw, GridColumnsPolicy::default())
}

pub fn parse_with(raw: &RawLayoutRecord, policy: GridColumnsPolicy) -> LayoutVariant {
    let parsed = inspect(raw, policy);
    if let Some(diagnostic) = &parsed.diagnostic {
        warn!(%diagnostic, kind = ?raw.kind, "malformed layout record");
    }
    parsed.variant
}

/// Parse every entry of one layout source emission
pub fn parse_directory(raw: &RawLayoutDirectory, policy: GridColumnsPolicy) -> LayoutDirectory {
    raw.iter()
        .map(|(mode, record)| {
            let parsed = inspect(record, policy);
            if let Some(diagnostic) = &parsed.diagnostic {
                warn!(mode = %mode, %diagnostic, "malformed layout record");
            }
            (mode.clone(), parsed.variant)
        })
        .collect()
}
