mod item;
mod layout;
mod meta;

pub use item::Item;
pub use layout::{LayoutDirectory, LayoutVariant, RawLayoutDirectory, RawLayoutRecord};
pub use meta::Meta;
