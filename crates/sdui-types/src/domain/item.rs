use serde::{Deserialize, Serialize};

/// One content unit shown by the renderer.
///
/// Items are replaced wholesale whenever the data source emits; the engine
/// never edits an individual item in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Stable unique key, used by renderers to diff list rows
    pub id: String,
    pub title: String,
    pub description: String,
    /// Read from a nested sub-field of the stored record.
    /// Absent or malformed values decode as `false`.
    #[serde(default)]
    pub is_favorite: bool,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            is_favorite: false,
        }
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_serializes_camel_case() {
        let item = Item::new("1", "A", "d").favorite(true);
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], "1");
        assert_eq!(json["isFavorite"], true);
        assert!(json.get("is_favorite").is_none());
    }

    #[test]
    fn test_item_missing_favorite_defaults_false() {
        let item: Item =
            serde_json::from_str(r#"{"id":"7","title":"T","description":"D"}"#).unwrap();
        assert!(!item.is_favorite);
    }
}
