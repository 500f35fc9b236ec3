use sdui_types::{Item, LayoutDirectory, LayoutMeta, Meta, ViewModel};

/// Resolve the active mode against the directory.
///
/// A mode missing from the directory resolves to `List` without any log:
/// meta and layout are written independently, so the two routinely disagree
/// for a moment while an update is in flight.
pub fn resolve_layout(directory: &LayoutDirectory, meta: &Meta) -> LayoutMeta {
    LayoutMeta {
        layout_variant: directory
            .get(&meta.active_mode)
            .copied()
            .unwrap_or_default(),
        favorites_enabled: meta.favorites_enabled,
    }
}

pub fn project(items: &[Item], directory: &LayoutDirectory, meta: &Meta) -> ViewModel {
    ViewModel {
        layout_meta: resolve_layout(directory, meta),
        items: items.to_vec(),
    }
}
