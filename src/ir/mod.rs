//! Intermediate representation.
//!
//! This is the tree handed to the Markdown renderer and the optional
//! reformatting stage. It serializes to JSON with snake_case field names,
//! omitting empty and zero-valued optional fields.

mod document;
mod image;
mod list;
mod paragraph;
mod table;

pub use document::*;
pub use image::*;
pub use list::*;
pub use paragraph::*;
pub use table::*;

/// IR schema version written into every document.
pub const IR_VERSION: &str = "1.0";

pub(crate) fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
