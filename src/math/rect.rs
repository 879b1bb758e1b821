//! Ground-plane rectangles and the broad-phase circle overlap test
//!
//! The ground plane is world X/Z; a [`Vec2`] here holds `(x, z)`.

use crate::core::types::{Vec2, Vec3};

/// Project a world position onto the ground plane
pub fn ground(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

/// Axis-aligned rectangle on the ground plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl GroundRect {
    /// Rectangle with its minimum corner at `origin`
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// The four corners lifted to world space at height `y`
    pub fn corners(&self, y: f32) -> [Vec3; 4] {
        [
            Vec3::new(self.min.x, y, self.min.y),
            Vec3::new(self.max.x, y, self.min.y),
            Vec3::new(self.min.x, y, self.max.y),
            Vec3::new(self.max.x, y, self.max.y),
        ]
    }
}

/// Conservative circle/rectangle overlap on the ground plane
///
/// Rejects only when the center distance exceeds a half extent plus the
/// radius on some axis; a circle near a rectangle's corner can therefore be
/// accepted without touching it. The result depends only on the
/// center-to-center distance.
pub fn circle_overlaps_rect(center: Vec2, radius: f32, rect: &GroundRect) -> bool {
    let half = rect.half_extents();
    let distance = center.distance(rect.center());
    !(distance > half.x + radius || distance > half.y + radius)
}
