//! Geometry used by tile culling

pub mod frustum;
pub mod rect;

pub use frustum::{Plane, Frustum};
pub use rect::{GroundRect, circle_overlaps_rect, ground};
