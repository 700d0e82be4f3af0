#[macro_use]
pub mod macros;

pub mod config;
pub mod editor;
pub mod events;
pub mod geometry;
pub mod matpalette;
pub mod picker;
