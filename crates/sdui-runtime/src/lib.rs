pub mod adapters;
pub mod config;
pub mod document;
pub mod error;
pub mod session;
pub mod store;

pub use adapters::{NodeSource, items_source, layout_source, meta_source};
pub use config::{Config, LayoutConfig, NodeConfig, resolve_config_path};
pub use document::{decode_items, decode_layouts, decode_meta};
pub use error::{Error, Result};
pub use session::Session;
pub use store::DocumentStore;
