//! Grass field configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::grass::tile::{BladeBudget, GrassLod};

/// Layout, LOD radii and blade budget of the tiled grass field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassConfig {
    /// Tiles per side; the field holds `tiles_per_side²` tiles
    pub tiles_per_side: u32,
    /// Tile extent along world X
    pub tile_width: f32,
    /// Tile extent along world Z
    pub tile_height: f32,
    /// Blade sub-grid columns inside one tile
    pub blade_grid_cols: u32,
    /// Blade sub-grid rows inside one tile
    pub blade_grid_rows: u32,
    /// Tiles within this ground radius of the camera use the high LOD
    pub radius_high_lod: f32,
    /// Tiles beyond this ground radius are culled; also scales blade density
    pub radius_render: f32,
    /// Blade count floor
    pub min_blades: u32,
    /// Blade cap for high LOD tiles; also the size of one attribute slot
    pub max_blades: u32,
    /// Blade cap for low LOD tiles
    pub low_lod_max_blades: u32,
    /// Number of attribute slots processed per batch
    pub parallel_slots: u32,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            tiles_per_side: 100,
            tile_width: 4.0,
            tile_height: 4.0,
            blade_grid_cols: 16,
            blade_grid_rows: 16,
            radius_high_lod: 20.0,
            radius_render: 30.0,
            min_blades: 256,
            max_blades: 8192,
            low_lod_max_blades: 8192,
            parallel_slots: 2,
        }
    }
}

impl GrassConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject layouts the scheduler cannot honour
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::Configuration(msg));

        if self.tiles_per_side == 0 {
            return fail("grass field needs at least one tile per side".into());
        }
        if !(self.tile_width > 0.0 && self.tile_height > 0.0) {
            return fail(format!(
                "tile size must be positive, got {}x{}",
                self.tile_width, self.tile_height
            ));
        }
        if self.blade_grid_cols == 0 || self.blade_grid_rows == 0 {
            return fail("blade sub-grid must have at least one cell".into());
        }
        if !(self.radius_high_lod > 0.0 && self.radius_render > 0.0) {
            return fail(format!(
                "LOD radii must be positive, got high={} render={}",
                self.radius_high_lod, self.radius_render
            ));
        }
        if self.min_blades == 0 || self.min_blades > self.max_blades {
            return fail(format!(
                "blade range [{}, {}] is empty",
                self.min_blades, self.max_blades
            ));
        }
        if self.low_lod_max_blades < self.min_blades || self.low_lod_max_blades > self.max_blades {
            return fail(format!(
                "low LOD cap {} outside [{}, {}]",
                self.low_lod_max_blades, self.min_blades, self.max_blades
            ));
        }
        if self.parallel_slots == 0 {
            return fail("at least one parallel slot is required".into());
        }
        if self.tiles_per_side.checked_mul(self.tiles_per_side).is_none() {
            return fail(format!(
                "{0}x{0} tiles exceed the tile index range",
                self.tiles_per_side
            ));
        }
        if self.parallel_slots.checked_mul(self.max_blades).is_none() {
            return fail(format!(
                "{} slots of {} blades exceed the attribute index range",
                self.parallel_slots, self.max_blades
            ));
        }
        if self
            .max_blades
            .checked_mul(GrassLod::High.vertices_per_blade())
            .is_none()
        {
            return fail(format!(
                "{} blades per tile exceed the vertex index range",
                self.max_blades
            ));
        }
        Ok(())
    }

    /// Total number of tiles
    pub fn tile_count(&self) -> usize {
        self.tiles_per_side as usize * self.tiles_per_side as usize
    }

    /// Blade count policy derived from the caps
    pub fn budget(&self) -> BladeBudget {
        BladeBudget {
            min: self.min_blades,
            max_high: self.max_blades,
            max_low: self.low_lod_max_blades,
        }
    }

    /// Elements per attribute buffer (all slots)
    pub fn attribute_capacity(&self) -> u64 {
        self.parallel_slots as u64 * self.max_blades as u64
    }
}
