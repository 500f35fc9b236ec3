pub mod domain;
pub mod source;
pub mod view;

pub use domain::*;
pub use source::{SourceError, SourceKind};
pub use view::*;
