//! Blade generation dispatches

use crate::core::error::Error;
use crate::core::types::Result;
use crate::grass::commands::{FrameCommands, SlotDispatch};
use crate::grass::config::GrassConfig;
use crate::grass::tile::Tile;
use crate::render::limits::{DeviceLimits, DispatchSize};
use crate::render::uniforms::{UniformBlock, UniformKind, UniformLayout};

const TILE_WIDTH: &str = "tileWidth";
const TILE_HEIGHT: &str = "tileHeight";
const GRID_COLS: &str = "gridCols";
const GRID_ROWS: &str = "gridRows";
const TILE_POS: &str = "tilePos";
const TILE_ID: &str = "tileID";
const PARALLEL_SLOT: &str = "parallelSlot";
const MAX_BLADES_PER_SLOT: &str = "maxBladesPerSlot";
const BLADE_COUNT: &str = "bladeCount";
const DISPATCH_WIDTH: &str = "dispatchWidth";
const DISPATCH_HEIGHT: &str = "dispatchHeight";

/// Uniforms the generation program must declare
pub const REQUIRED_UNIFORMS: &[(&str, UniformKind)] = &[
    (TILE_WIDTH, UniformKind::Float),
    (TILE_HEIGHT, UniformKind::Float),
    (GRID_COLS, UniformKind::Uint),
    (GRID_ROWS, UniformKind::Uint),
    (TILE_POS, UniformKind::Vec2),
    (TILE_ID, UniformKind::Uint),
    (PARALLEL_SLOT, UniformKind::Uint),
    (MAX_BLADES_PER_SLOT, UniformKind::Uint),
    (BLADE_COUNT, UniformKind::Uint),
    (DISPATCH_WIDTH, UniformKind::Uint),
    (DISPATCH_HEIGHT, UniformKind::Uint),
];

/// Drives the blade generation program for one tile at a time
#[derive(Debug)]
pub struct ComputeDispatcher {
    uniforms: UniformBlock,
    limits: DeviceLimits,
    workgroup_size: u32,
    grid_cols: u32,
    grid_rows: u32,
    max_blades: u32,
}

impl ComputeDispatcher {
    /// `layout` is the program's parameter block, `workgroup_size` its X work-group size
    pub fn new(
        layout: UniformLayout,
        workgroup_size: u32,
        limits: DeviceLimits,
        config: &GrassConfig,
    ) -> Result<Self> {
        layout.require(REQUIRED_UNIFORMS)?;
        if workgroup_size == 0 {
            return Err(Error::Configuration("compute work-group size is zero".into()));
        }
        Ok(Self {
            uniforms: UniformBlock::new(layout),
            limits,
            workgroup_size,
            grid_cols: config.blade_grid_cols,
            grid_rows: config.blade_grid_rows,
            max_blades: config.max_blades,
        })
    }

    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    pub fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }

    /// Work groups needed for `blade_count` blades, folded to the device limits
    pub fn dispatch_size(&self, blade_count: u32) -> Result<DispatchSize> {
        self.limits.dispatch_size(blade_count.div_ceil(self.workgroup_size))
    }

    /// Record generation of `tile`'s blades into attribute slot `slot`
    pub fn dispatch_tile(&mut self, tile: &Tile, slot: u32, commands: &mut FrameCommands) -> Result<DispatchSize> {
        let size = self.dispatch_size(tile.blade_count())?;

        let u = &mut self.uniforms;
        u.set_float(TILE_WIDTH, tile.width())?;
        u.set_float(TILE_HEIGHT, tile.height())?;
        u.set_uint(GRID_COLS, self.grid_cols)?;
        u.set_uint(GRID_ROWS, self.grid_rows)?;
        u.set_vec2(TILE_POS, tile.origin())?;
        u.set_uint(TILE_ID, tile.id().0)?;
        u.set_uint(PARALLEL_SLOT, slot)?;
        u.set_uint(MAX_BLADES_PER_SLOT, self.max_blades)?;
        u.set_uint(BLADE_COUNT, tile.blade_count())?;
        u.set_uint(DISPATCH_WIDTH, size.x)?;
        u.set_uint(DISPATCH_HEIGHT, size.y)?;

        commands.dispatch(SlotDispatch { slot, tile: tile.id(), size }, self.uniforms.bytes())?;
        log::trace!("dispatch {} -> slot {} ({} blades, {:?})", tile.id(), slot, tile.blade_count(), size);
        Ok(size)
    }
}
