pub mod fonts;
pub mod placement;
pub mod sizing;
pub mod template;
