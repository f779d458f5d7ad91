pub mod editor;
pub mod layer;
pub mod scene;
pub mod viewport;
