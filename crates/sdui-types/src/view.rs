use serde::{Deserialize, Serialize};

use crate::domain::{Item, LayoutVariant};
use crate::source::SourceError;

/// Layout settings resolved for the active mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutMeta {
    pub layout_variant: LayoutVariant,
    pub favorites_enabled: bool,
}

/// Renderable snapshot: resolved layout plus the ordered items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub layout_meta: LayoutMeta,
    pub items: Vec<Item>,
}

/// What the engine publishes to its observers.
///
/// Renderers only ever need to handle these three cases; nothing inside the
/// engine surfaces as a panic or an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// No renderable content yet, or the item list is empty
    NotReady,
    Ready(ViewModel),
    /// An upstream source reported a failure
    Degraded {
        last_good: Option<ViewModel>,
        error: SourceError,
    },
}

impl ViewState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }

    pub fn view_model(&self) -> Option<&ViewModel> {
        match self {
            ViewState::Ready(vm) => Some(vm),
            ViewState::Degraded { last_good, .. } => last_good.as_ref(),
            ViewState::NotReady => None,
        }
    }
}
