//! grassfield - tile-based LOD and visibility scheduling for a GPU grass field

pub mod core;
pub mod grass;
pub mod lighting;
pub mod math;
pub mod render;
pub mod scene;
