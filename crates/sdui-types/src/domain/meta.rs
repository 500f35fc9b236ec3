use serde::{Deserialize, Serialize};

/// Screen-wide settings: which layout mode is active and whether the
/// favorite toggle is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, alias = "mode", alias = "activeMode")]
    pub active_mode: String,
    #[serde(default, alias = "canFavorite", alias = "favoritesEnabled")]
    pub favorites_enabled: bool,
}

impl Meta {
    pub fn new(active_mode: impl Into<String>, favorites_enabled: bool) -> Self {
        Self {
            active_mode: active_mode.into(),
            favorites_enabled,
        }
    }
}
