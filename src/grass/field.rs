//! The tiled grass field: per-frame LOD update and batched rendering

use crate::core::camera::CameraSnapshot;
use crate::core::error::Error;
use crate::core::types::{Result, Vec2, Vec3};
use crate::grass::batch::{BatchOutcome, BatchRenderer, SlotRecord};
use crate::grass::commands::FrameCommands;
use crate::grass::config::GrassConfig;
use crate::grass::dispatch::ComputeDispatcher;
use crate::grass::tile::{BladeBudget, Tile, TileIdAllocator};
use crate::math::ground;
use crate::render::limits::DeviceLimits;
use crate::render::program::ShaderProgram;

/// Totals for one rendered frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub batches: u32,
    pub visible_tiles: u32,
    pub dispatches: u32,
    pub barriers: u32,
    pub draws: u32,
    pub blades: u64,
}

impl FrameStats {
    fn add(&mut self, batch: &BatchOutcome) {
        self.batches += 1;
        self.visible_tiles += batch.visible;
        self.dispatches += batch.dispatches;
        self.barriers += batch.barriers;
        self.draws += batch.draws;
        self.blades += batch.blades;
    }
}

/// N×N tiles laid out row-major from the world origin
pub struct GrassField {
    config: GrassConfig,
    budget: BladeBudget,
    tiles: Vec<Tile>,
    dispatcher: ComputeDispatcher,
    batcher: BatchRenderer,
    time: f32,
    last_frame: Vec<SlotRecord>,
}

impl GrassField {
    /// Lay out the tiles, drawing their ids from `ids`
    pub fn new(
        config: &GrassConfig,
        ids: &mut TileIdAllocator,
        dispatcher: ComputeDispatcher,
        batcher: BatchRenderer,
    ) -> Result<Self> {
        config.validate()?;
        if batcher.slots() != config.parallel_slots {
            return Err(Error::Configuration(format!(
                "batch renderer has {} slots, field expects {}",
                batcher.slots(),
                config.parallel_slots
            )));
        }

        let budget = config.budget();
        let size = Vec2::new(config.tile_width, config.tile_height);
        let n = config.tiles_per_side;
        let tiles = (0..n * n)
            .map(|i| {
                let origin = Vec2::new((i % n) as f32, (i / n) as f32) * size;
                Ok(Tile::new(ids.allocate()?, origin, size, config.radius_render, &budget))
            })
            .collect::<Result<Vec<Tile>>>()?;

        log::info!(
            "Grass field: {}x{} tiles of {}x{}, {} slots of {} blades",
            n, n, config.tile_width, config.tile_height, config.parallel_slots, config.max_blades
        );

        Ok(Self {
            config: config.clone(),
            budget,
            last_frame: Vec::with_capacity(tiles.len()),
            tiles,
            dispatcher,
            batcher,
            time: 0.0,
        })
    }

    /// Build the dispatcher and batcher from the programs' reflected
    /// parameter blocks (compute group 0, draw group 1)
    pub fn from_programs(
        config: &GrassConfig,
        ids: &mut TileIdAllocator,
        compute: &ShaderProgram,
        draw: &ShaderProgram,
        limits: DeviceLimits,
    ) -> Result<Self> {
        let [workgroup_x, _, _] = compute.workgroup_size("main")?;
        let dispatcher = ComputeDispatcher::new(compute.uniform_layout(0, 0)?, workgroup_x, limits, config)?;
        let batcher = BatchRenderer::new(draw.uniform_layout(1, 0)?, config)?;
        Self::new(config, ids, dispatcher, batcher)
    }

    pub fn config(&self) -> &GrassConfig {
        &self.config
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Accumulated animation time in seconds
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Middle of the field, one unit above the ground
    pub fn center(&self) -> Vec3 {
        let n = self.config.tiles_per_side as f32;
        Vec3::new(n * self.config.tile_width * 0.5, 1.0, n * self.config.tile_height * 0.5)
    }

    /// Per-tile slot records of the last `render`, in tile order
    pub fn last_frame(&self) -> &[SlotRecord] {
        &self.last_frame
    }

    /// Advance time and recompute every tile's LOD and blade count
    pub fn update(&mut self, dt: f32, camera_position: Vec3) {
        self.time += dt;
        let camera_ground = ground(camera_position);
        for tile in &mut self.tiles {
            tile.update_lod(camera_ground, self.config.radius_high_lod, &self.budget);
        }
    }

    /// Record the frame's dispatches, barriers and draws, K tiles at a time
    pub fn render(&mut self, camera: &CameraSnapshot, commands: &mut FrameCommands) -> Result<FrameStats> {
        let Self { tiles, dispatcher, batcher, last_frame, time, .. } = self;
        last_frame.clear();

        let mut stats = FrameStats::default();
        for chunk in tiles.chunks(batcher.slots() as usize) {
            let outcome = batcher.render_batch(chunk, camera, *time, dispatcher, commands)?;
            last_frame.extend_from_slice(batcher.records());
            stats.add(&outcome);
        }

        log::trace!(
            "grass frame: {} batches, {} visible, {} draws, {} blades",
            stats.batches, stats.visible_tiles, stats.draws, stats.blades
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::Camera;
    use crate::grass::commands::GpuCommand;
    use crate::grass::testing;
    use crate::grass::tile::{GrassLod, TileId};
    use crate::render::limits::DeviceLimits;

    fn small_config() -> GrassConfig {
        GrassConfig {
            tiles_per_side: 4,
            radius_high_lod: 1.0,
            radius_render: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_row_major_layout() {
        let field = testing::field(&small_config(), DeviceLimits::default());
        assert_eq!(field.tile_count(), 16);
        assert_eq!(field.tiles()[0].origin(), Vec2::ZERO);
        assert_eq!(field.tiles()[1].origin(), Vec2::new(4.0, 0.0));
        assert_eq!(field.tiles()[4].origin(), Vec2::new(0.0, 4.0));
        assert_eq!(field.tiles()[15].origin(), Vec2::new(12.0, 12.0));
        assert_eq!(field.tiles()[0].id(), TileId(1));
        assert_eq!(field.tiles()[15].id(), TileId(16));
    }

    #[test]
    fn test_center() {
        let field = testing::field(&small_config(), DeviceLimits::default());
        assert_eq!(field.center(), Vec3::new(8.0, 1.0, 8.0));
    }

    #[test]
    fn test_slot_count_mismatch() {
        let config = small_config();
        let other = GrassConfig { parallel_slots: 3, ..small_config() };
        let result = GrassField::new(
            &config,
            &mut TileIdAllocator::new(),
            testing::dispatcher(&config, DeviceLimits::default()),
            testing::batcher(&other),
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_single_visible_tile_scenario() {
        // 4x4 field, K = 2, camera at the origin facing tile 0 only
        let mut field = testing::field(&small_config(), DeviceLimits::default());
        let camera = Camera::look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 0.0, 2.0), Vec3::Y);
        field.update(0.016, camera.position);

        let mut commands = FrameCommands::new(2, 256);
        let stats = field.render(&camera.snapshot(), &mut commands).unwrap();

        assert_eq!(stats.batches, 8);
        assert_eq!(stats.visible_tiles, 1);
        assert_eq!(commands.dispatch_count(), 1);
        assert_eq!(commands.barrier_count(), 1);
        assert_eq!(commands.draw_count(), 1);

        let records = field.last_frame();
        assert_eq!(records.len(), 16);
        assert_eq!(records[0].blade_count, field.tiles()[0].blade_count());
        assert!(records[0].blade_count > 0);
        assert!(records[1..].iter().all(|r| r.blade_count == 0));
    }

    #[test]
    fn test_nothing_visible_records_nothing() {
        let mut field = testing::field(&small_config(), DeviceLimits::default());
        let camera = Camera::look_at(Vec3::new(-50.0, 1.0, -50.0), Vec3::new(-60.0, 1.0, -60.0), Vec3::Y);
        field.update(0.016, camera.position);

        let mut commands = FrameCommands::new(2, 256);
        let stats = field.render(&camera.snapshot(), &mut commands).unwrap();
        assert_eq!(stats.batches, 8);
        assert!(commands.is_empty());
        assert!(field.last_frame().iter().all(|r| r.blade_count == 0));
    }

    #[test]
    fn test_lod_follows_camera() {
        let config = GrassConfig { tiles_per_side: 10, ..Default::default() };
        let mut field = testing::field(&config, DeviceLimits::default());

        field.update(0.0, Vec3::new(2.0, 1.0, 2.0));
        assert_eq!(field.tiles()[0].lod(), GrassLod::High);
        assert_eq!(field.tiles()[99].lod(), GrassLod::Low);
        let near = field.tiles()[0].blade_count();
        let far = field.tiles()[99].blade_count();
        assert!(near > far);

        field.update(0.0, Vec3::new(38.0, 1.0, 38.0));
        assert_eq!(field.tiles()[99].lod(), GrassLod::High);
        assert_eq!(field.tiles()[0].lod(), GrassLod::Low);
    }

    #[test]
    fn test_update_accumulates_time() {
        let mut field = testing::field(&small_config(), DeviceLimits::default());
        field.update(0.25, Vec3::ZERO);
        field.update(0.5, Vec3::ZERO);
        assert!((field.time() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_stream_is_well_formed() {
        // Realistic view over a 10x10 field with K = 3
        let config = GrassConfig { tiles_per_side: 10, parallel_slots: 3, ..Default::default() };
        let mut field = testing::field(&config, DeviceLimits::default());
        let camera = Camera::look_at(Vec3::new(20.0, 1.5, 20.0), Vec3::new(30.0, 0.0, 28.0), Vec3::Y);
        field.update(0.016, camera.position);

        let mut commands = FrameCommands::new(3, 256);
        let stats = field.render(&camera.snapshot(), &mut commands).unwrap();
        assert!(stats.visible_tiles > 3, "expected several batches with work");
        assert_eq!(stats.barriers as usize, commands.barrier_count());

        // Stream is a sequence of groups: 1..=K dispatches, one barrier, then draws of those slots
        let mut pending: Vec<u32> = Vec::new();
        let mut fenced: Vec<u32> = Vec::new();
        let mut drawing = false;
        for command in commands.commands() {
            match command {
                GpuCommand::Dispatch { dispatch, .. } => {
                    if drawing {
                        fenced.clear();
                        drawing = false;
                    }
                    assert!(!pending.contains(&dispatch.slot));
                    pending.push(dispatch.slot);
                    assert!(pending.len() <= 3);
                }
                GpuCommand::Barrier => {
                    assert!(!pending.is_empty());
                    fenced = std::mem::take(&mut pending);
                    drawing = true;
                }
                GpuCommand::Draw { draw, .. } => {
                    assert!(drawing);
                    assert!(fenced.contains(&draw.slot));
                    assert_eq!(draw.start_offset, draw.slot * config.max_blades);
                }
            }
        }
        assert!(pending.is_empty(), "dispatches left unfenced");
        assert_eq!(commands.dispatch_count(), commands.draw_count());
    }
}
