pub mod document;
pub mod render;
pub mod terminal;
