pub mod alloc;
pub mod collection;
pub mod io;
pub mod model;
pub mod style;

pub use alloc::{allocate_angles, unset_intervals, UnsetInterval};
pub use collection::{next_visible, NavDirection, PaletteCollection};
pub use model::{
    BrushItem, BrushName, ItemAngle, LayerName, MaterialItem, MaterialName, Palette, PaletteError,
    PaletteName,
};
pub use style::{MaterialStyle, Rgba};
