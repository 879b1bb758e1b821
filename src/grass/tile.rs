//! Spatial tiles and their LOD / blade-count policy

use std::fmt;

use crate::core::error::Error;
use crate::core::types::{Result, Vec2, Vec3};
use crate::math::{GroundRect, circle_overlaps_rect};

/// Stable identifier of a tile, also the seed of its blade pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile#{}", self.0)
    }
}

/// Hands out unique tile ids; one allocator per field (or shared across fields)
#[derive(Debug)]
pub struct TileIdAllocator {
    next: Option<u32>,
}

impl TileIdAllocator {
    /// Ids start at 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u32) -> Self {
        Self { next: Some(first) }
    }

    /// Fails once the id range is used up
    pub fn allocate(&mut self) -> Result<TileId> {
        let id = self
            .next
            .ok_or_else(|| Error::Configuration("tile ids exhausted".into()))?;
        self.next = id.checked_add(1);
        Ok(TileId(id))
    }
}

impl Default for TileIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Level of detail of a tile's blades
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GrassLod {
    High,
    #[default]
    Low,
}

impl GrassLod {
    /// Value passed to the draw shader
    pub fn shader_value(self) -> u32 {
        match self {
            GrassLod::High => 1,
            GrassLod::Low => 2,
        }
    }

    /// Vertices emitted per blade when drawing
    pub fn vertices_per_blade(self) -> u32 {
        match self {
            GrassLod::High => 15,
            GrassLod::Low => 3,
        }
    }
}

/// Blade count limits; `min <= max_low <= max_high`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BladeBudget {
    pub min: u32,
    pub max_high: u32,
    pub max_low: u32,
}

impl BladeBudget {
    /// Cap for a LOD
    pub fn max_for(&self, lod: GrassLod) -> u32 {
        match lod {
            GrassLod::High => self.max_high,
            GrassLod::Low => self.max_low,
        }
    }

    /// Blades for a tile at ground `distance` from the camera
    ///
    /// Interpolates linearly from the LOD cap at distance 0 down to `min` at
    /// `radius`, truncating; at or beyond `radius` the count is `min`.
    /// Non-increasing in `distance`.
    ///
    /// # Example
    /// ```
    /// use grassfield::grass::tile::{BladeBudget, GrassLod};
    /// let budget = BladeBudget { min: 256, max_high: 8192, max_low: 8192 };
    /// assert_eq!(budget.blade_count(GrassLod::High, 0.0, 30.0), 8192);
    /// assert_eq!(budget.blade_count(GrassLod::High, 15.0, 30.0), 4224);
    /// assert_eq!(budget.blade_count(GrassLod::Low, 31.0, 30.0), 256);
    /// ```
    pub fn blade_count(&self, lod: GrassLod, distance: f32, radius: f32) -> u32 {
        let max = self.max_for(lod);
        if !(distance < radius) {
            return self.min;
        }
        let alpha = (distance / radius).max(0.0);
        let count = max as f32 * (1.0 - alpha) + self.min as f32 * alpha;
        (count as u32).clamp(self.min, max)
    }
}

/// One square patch of the grass field
#[derive(Clone, Debug)]
pub struct Tile {
    id: TileId,
    rect: GroundRect,
    radius_render: f32,
    lod: GrassLod,
    blade_count: u32,
}

impl Tile {
    /// New tile at low LOD with the minimum blade count
    pub fn new(id: TileId, origin: Vec2, size: Vec2, radius_render: f32, budget: &BladeBudget) -> Self {
        Self {
            id,
            rect: GroundRect::new(origin, size),
            radius_render,
            lod: GrassLod::Low,
            blade_count: budget.min,
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    /// Ground footprint
    pub fn rect(&self) -> &GroundRect {
        &self.rect
    }

    /// Minimum corner on the ground plane
    pub fn origin(&self) -> Vec2 {
        self.rect.min
    }

    pub fn width(&self) -> f32 {
        self.rect.size().x
    }

    pub fn height(&self) -> f32 {
        self.rect.size().y
    }

    /// Center at ground level
    pub fn center(&self) -> Vec3 {
        let c = self.rect.center();
        Vec3::new(c.x, 0.0, c.y)
    }

    /// Corners at ground level
    pub fn corners(&self) -> [Vec3; 4] {
        self.rect.corners(0.0)
    }

    pub fn radius_render(&self) -> f32 {
        self.radius_render
    }

    pub fn lod(&self) -> GrassLod {
        self.lod
    }

    pub fn blade_count(&self) -> u32 {
        self.blade_count
    }

    /// Recompute LOD and blade count for a camera at `camera_ground` (x, z)
    pub fn update_lod(&mut self, camera_ground: Vec2, radius_high_lod: f32, budget: &BladeBudget) {
        self.lod = if circle_overlaps_rect(camera_ground, radius_high_lod, &self.rect) {
            GrassLod::High
        } else {
            GrassLod::Low
        };
        let distance = camera_ground.distance(self.rect.center());
        self.blade_count = budget.blade_count(self.lod, distance, self.radius_render);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: BladeBudget = BladeBudget { min: 256, max_high: 8192, max_low: 8192 };

    fn tile_at(origin: Vec2) -> Tile {
        Tile::new(TileId(1), origin, Vec2::splat(4.0), 30.0, &BUDGET)
    }

    #[test]
    fn test_allocator_starts_at_one() {
        let mut ids = TileIdAllocator::new();
        assert_eq!(ids.allocate().unwrap(), TileId(1));
        assert_eq!(ids.allocate().unwrap(), TileId(2));

        let mut shifted = TileIdAllocator::starting_at(100);
        assert_eq!(shifted.allocate().unwrap(), TileId(100));
    }

    #[test]
    fn test_allocator_exhaustion() {
        let mut ids = TileIdAllocator::starting_at(u32::MAX);
        assert_eq!(ids.allocate().unwrap(), TileId(u32::MAX));
        assert!(matches!(ids.allocate(), Err(Error::Configuration(_))));
        assert!(ids.allocate().is_err());
    }

    #[test]
    fn test_lod_shader_values() {
        assert_eq!(GrassLod::High.shader_value(), 1);
        assert_eq!(GrassLod::Low.shader_value(), 2);
        assert!(GrassLod::High.vertices_per_blade() > GrassLod::Low.vertices_per_blade());
    }

    #[test]
    fn test_blade_count_endpoints() {
        assert_eq!(BUDGET.blade_count(GrassLod::High, 0.0, 30.0), 8192);
        assert_eq!(BUDGET.blade_count(GrassLod::High, 30.0, 30.0), 256);
        assert_eq!(BUDGET.blade_count(GrassLod::High, 31.0, 30.0), 256);
        assert_eq!(BUDGET.blade_count(GrassLod::Low, 1000.0, 30.0), 256);
    }

    #[test]
    fn test_blade_count_monotonic_and_bounded() {
        let mut previous = u32::MAX;
        for step in 0..=400 {
            let d = step as f32 * 0.1;
            let count = BUDGET.blade_count(GrassLod::High, d, 30.0);
            assert!(count <= previous, "count rose at d={d}");
            assert!((256..=8192).contains(&count));
            previous = count;
        }
    }

    #[test]
    fn test_low_lod_cap() {
        let budget = BladeBudget { min: 256, max_high: 8192, max_low: 2048 };
        assert_eq!(budget.blade_count(GrassLod::Low, 0.0, 30.0), 2048);
        assert_eq!(budget.blade_count(GrassLod::High, 0.0, 30.0), 8192);
    }

    #[test]
    fn test_tile_geometry() {
        let tile = tile_at(Vec2::new(8.0, 4.0));
        assert_eq!(tile.origin(), Vec2::new(8.0, 4.0));
        assert_eq!(tile.center(), Vec3::new(10.0, 0.0, 6.0));
        assert_eq!(tile.width(), 4.0);
        assert_eq!(tile.height(), 4.0);
        assert!(tile.corners().iter().all(|c| c.y == 0.0));
    }

    #[test]
    fn test_new_tile_is_within_budget() {
        let tile = tile_at(Vec2::ZERO);
        assert_eq!(tile.lod(), GrassLod::Low);
        assert_eq!(tile.blade_count(), 256);
    }

    #[test]
    fn test_update_lod_near_is_high() {
        let mut tile = tile_at(Vec2::ZERO);
        tile.update_lod(Vec2::new(2.0, 2.0), 20.0, &BUDGET);
        assert_eq!(tile.lod(), GrassLod::High);
        assert_eq!(tile.blade_count(), 8192);
    }

    #[test]
    fn test_update_lod_far_is_low() {
        let mut tile = tile_at(Vec2::new(100.0, 100.0));
        tile.update_lod(Vec2::ZERO, 20.0, &BUDGET);
        assert_eq!(tile.lod(), GrassLod::Low);
        assert_eq!(tile.blade_count(), 256);
    }

    #[test]
    fn test_beyond_high_radius_plus_half_extent_is_low() {
        // Center distance just over radius + max half extent
        let mut tile = tile_at(Vec2::new(20.1, -2.0));
        tile.update_lod(Vec2::ZERO, 20.0, &BUDGET);
        assert!(tile.center().length() > 20.0 + 2.0);
        assert_eq!(tile.lod(), GrassLod::Low);
    }

    #[test]
    fn test_display_id() {
        assert_eq!(TileId(7).to_string(), "tile#7");
    }
}
