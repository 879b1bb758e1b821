//! K-slot batching of tile generation and drawing
//!
//! A batch takes up to K tiles. Each visible tile is generated into its own
//! attribute slot, one barrier fences all of the batch's writes, then every
//! visible slot is drawn. Batches with no visible tile record nothing.

use crate::core::camera::CameraSnapshot;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::grass::commands::{FrameCommands, SlotDraw};
use crate::grass::config::GrassConfig;
use crate::grass::dispatch::ComputeDispatcher;
use crate::grass::tile::{GrassLod, Tile, TileId};
use crate::grass::visibility;
use crate::render::uniforms::{UniformBlock, UniformKind, UniformLayout};

const START_OFFSET: &str = "startOffset";
const TILE_LOD: &str = "tileLOD";
const VERTICES_PER_BLADE: &str = "verticesPerBlade";
const TIME: &str = "time";

/// Uniforms the draw program must declare in its per-draw block
pub const REQUIRED_UNIFORMS: &[(&str, UniformKind)] = &[
    (START_OFFSET, UniformKind::Uint),
    (TILE_LOD, UniformKind::Uint),
    (VERTICES_PER_BLADE, UniformKind::Uint),
    (TIME, UniformKind::Float),
];

/// What one slot held in the last batch; `blade_count` is 0 when not drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotRecord {
    pub tile: TileId,
    pub blade_count: u32,
    pub lod: GrassLod,
}

/// Command counts of one batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub visible: u32,
    pub dispatches: u32,
    pub barriers: u32,
    pub draws: u32,
    pub blades: u64,
}

/// Orders dispatch, barrier and draw for batches of up to K tiles
#[derive(Debug)]
pub struct BatchRenderer {
    uniforms: UniformBlock,
    slots: u32,
    max_blades: u32,
    records: Vec<SlotRecord>,
}

impl BatchRenderer {
    /// `layout` is the draw program's per-draw parameter block
    pub fn new(layout: UniformLayout, config: &GrassConfig) -> Result<Self> {
        config.validate()?;
        layout.require(REQUIRED_UNIFORMS)?;
        Ok(Self {
            uniforms: UniformBlock::new(layout),
            slots: config.parallel_slots,
            max_blades: config.max_blades,
            records: Vec::with_capacity(config.parallel_slots as usize),
        })
    }

    /// K
    pub fn slots(&self) -> u32 {
        self.slots
    }

    /// Slot records of the most recent batch, in slot order
    pub fn records(&self) -> &[SlotRecord] {
        &self.records
    }

    /// Cull, generate, fence and draw one batch of at most K tiles
    pub fn render_batch(
        &mut self,
        tiles: &[Tile],
        camera: &CameraSnapshot,
        time: f32,
        dispatcher: &mut ComputeDispatcher,
        commands: &mut FrameCommands,
    ) -> Result<BatchOutcome> {
        if tiles.len() > self.slots as usize {
            return Err(Error::Gpu(format!(
                "batch of {} tiles exceeds {} slots",
                tiles.len(),
                self.slots
            )));
        }

        self.records.clear();
        let mut outcome = BatchOutcome::default();

        for (slot, tile) in (0u32..).zip(tiles) {
            let mut record = SlotRecord {
                tile: tile.id(),
                blade_count: 0,
                lod: tile.lod(),
            };
            if visibility::is_visible(tile, camera.position, &camera.frustum) {
                dispatcher.dispatch_tile(tile, slot, commands)?;
                record.blade_count = tile.blade_count();
                outcome.visible += 1;
                outcome.dispatches += 1;
            }
            self.records.push(record);
        }

        if outcome.visible == 0 {
            return Ok(outcome);
        }

        commands.barrier();
        outcome.barriers = 1;

        self.uniforms.set_float(TIME, time)?;
        for (slot, record) in (0u32..).zip(&self.records) {
            if record.blade_count == 0 {
                continue;
            }
            let draw = SlotDraw {
                slot,
                tile: record.tile,
                start_offset: slot * self.max_blades,
                blade_count: record.blade_count,
                lod: record.lod,
            };
            self.uniforms.set_uint(START_OFFSET, draw.start_offset)?;
            self.uniforms.set_uint(TILE_LOD, draw.lod.shader_value())?;
            self.uniforms.set_uint(VERTICES_PER_BLADE, draw.lod.vertices_per_blade())?;
            commands.draw(draw, self.uniforms.bytes())?;

            outcome.draws += 1;
            outcome.blades += record.blade_count as u64;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::Camera;
    use crate::core::types::{Vec2, Vec3};
    use crate::grass::commands::GpuCommand;
    use crate::grass::testing;
    use crate::grass::tile::{BladeBudget, TileIdAllocator};
    use crate::render::limits::DeviceLimits;

    const BUDGET: BladeBudget = BladeBudget { min: 256, max_high: 8192, max_low: 8192 };

    /// A row of tiles along +X, camera at the origin looking down +X
    fn row_of_tiles(n: u32) -> (Vec<Tile>, CameraSnapshot) {
        let mut ids = TileIdAllocator::new();
        let tiles = (0..n)
            .map(|i| Tile::new(ids.allocate().unwrap(), Vec2::new(2.0 + i as f32 * 4.0, -2.0), Vec2::splat(4.0), 100.0, &BUDGET))
            .collect();
        let camera = Camera::look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(10.0, 0.0, 0.0), Vec3::Y);
        (tiles, camera.snapshot())
    }

    /// Camera far away facing away from every tile
    fn blind_camera() -> CameraSnapshot {
        Camera::look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(-10.0, 1.0, 0.0), Vec3::Y).snapshot()
    }

    fn setup(k: u32) -> (BatchRenderer, ComputeDispatcher, FrameCommands) {
        let config = GrassConfig { parallel_slots: k, ..Default::default() };
        (
            testing::batcher(&config),
            testing::dispatcher(&config, DeviceLimits::default()),
            FrameCommands::new(k, 256),
        )
    }

    #[test]
    fn test_all_visible_batch_order() {
        let (tiles, camera) = row_of_tiles(2);
        let (mut batcher, mut dispatcher, mut commands) = setup(2);
        let outcome = batcher.render_batch(&tiles, &camera, 0.0, &mut dispatcher, &mut commands).unwrap();

        assert_eq!(outcome.visible, 2);
        let kinds: Vec<&str> = commands
            .commands()
            .iter()
            .map(|c| match c {
                GpuCommand::Dispatch { .. } => "dispatch",
                GpuCommand::Barrier => "barrier",
                GpuCommand::Draw { .. } => "draw",
            })
            .collect();
        assert_eq!(kinds, ["dispatch", "dispatch", "barrier", "draw", "draw"]);
    }

    #[test]
    fn test_no_visible_tile_records_nothing() {
        let (tiles, _) = row_of_tiles(3);
        let (mut batcher, mut dispatcher, mut commands) = setup(3);
        let outcome = batcher.render_batch(&tiles, &blind_camera(), 0.0, &mut dispatcher, &mut commands).unwrap();

        assert_eq!(outcome, BatchOutcome::default());
        assert!(commands.is_empty());
        assert!(batcher.records().iter().all(|r| r.blade_count == 0));
    }

    #[test]
    fn test_only_visible_slots_dispatch_and_draw() {
        // K = 4, tiles 0 and 2 in view, 1 and 3 pushed behind the camera
        let (mut tiles, camera) = row_of_tiles(4);
        let mut ids = TileIdAllocator::starting_at(50);
        tiles[1] = Tile::new(ids.allocate().unwrap(), Vec2::new(-20.0, -2.0), Vec2::splat(4.0), 100.0, &BUDGET);
        tiles[3] = Tile::new(ids.allocate().unwrap(), Vec2::new(-40.0, -2.0), Vec2::splat(4.0), 100.0, &BUDGET);

        let (mut batcher, mut dispatcher, mut commands) = setup(4);
        let outcome = batcher.render_batch(&tiles, &camera, 0.0, &mut dispatcher, &mut commands).unwrap();

        assert_eq!(outcome.dispatches, 2);
        assert_eq!(outcome.barriers, 1);
        assert_eq!(outcome.draws, 2);
        assert_eq!(commands.dispatch_count(), 2);
        assert_eq!(commands.barrier_count(), 1);
        assert_eq!(commands.draw_count(), 2);

        let drawn: Vec<u32> = commands
            .commands()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::Draw { draw, .. } => Some(draw.slot),
                _ => None,
            })
            .collect();
        assert_eq!(drawn, [0, 2]);
    }

    #[test]
    fn test_draw_parameters_follow_slot() {
        let (mut tiles, camera) = row_of_tiles(2);
        tiles[1].update_lod(Vec2::new(0.0, 0.0), 20.0, &BUDGET);
        let (mut batcher, mut dispatcher, mut commands) = setup(2);
        batcher.render_batch(&tiles, &camera, 1.5, &mut dispatcher, &mut commands).unwrap();

        let draws: Vec<SlotDraw> = commands
            .commands()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::Draw { draw, .. } => Some(*draw),
                _ => None,
            })
            .collect();
        assert_eq!(draws[0].start_offset, 0);
        assert_eq!(draws[1].start_offset, 8192);
        assert_eq!(draws[1].lod, GrassLod::High);
        assert_eq!(draws[1].blade_count, tiles[1].blade_count());
        assert_eq!(draws[0].lod, GrassLod::Low);
    }

    #[test]
    fn test_partial_batch_leaves_slots_empty() {
        let (tiles, camera) = row_of_tiles(1);
        let (mut batcher, mut dispatcher, mut commands) = setup(3);
        let outcome = batcher.render_batch(&tiles, &camera, 0.0, &mut dispatcher, &mut commands).unwrap();
        assert_eq!(outcome.draws, 1);
        assert_eq!(batcher.records().len(), 1);
    }

    #[test]
    fn test_oversized_batch_is_rejected() {
        let (tiles, camera) = row_of_tiles(3);
        let (mut batcher, mut dispatcher, mut commands) = setup(2);
        let err = batcher.render_batch(&tiles, &camera, 0.0, &mut dispatcher, &mut commands).unwrap_err();
        assert!(matches!(err, Error::Gpu(_)));
    }
}
