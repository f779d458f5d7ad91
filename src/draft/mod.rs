//! Draft persistence: the serializable editor snapshot and its sanitizer.

pub mod model;
pub mod sanitize;

pub use model::{DRAFT_VERSION, Draft};
pub use sanitize::sanitize;
