//! Recorded GPU command stream of one frame
//!
//! The scheduler never talks to the device directly. It records dispatches,
//! barriers and draws here together with a snapshot of the uniforms each one
//! needs; the renderer replays the stream into wgpu passes. Slot state is
//! tracked so a draw can only follow a dispatch into the same slot that has
//! been fenced by a barrier.

use crate::core::error::Error;
use crate::core::types::Result;
use crate::grass::tile::{GrassLod, TileId};
use crate::render::limits::DispatchSize;

/// Blade generation for one tile into one slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotDispatch {
    pub slot: u32,
    pub tile: TileId,
    pub size: DispatchSize,
}

/// Draw of the blades stored in one slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotDraw {
    pub slot: u32,
    pub tile: TileId,
    /// First attribute element of the slot
    pub start_offset: u32,
    pub blade_count: u32,
    pub lod: GrassLod,
}

impl SlotDraw {
    pub fn vertex_count(&self) -> u32 {
        self.blade_count * self.lod.vertices_per_blade()
    }
}

/// One entry of the stream; `uniform_offset` indexes [`FrameCommands::uniform_bytes`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpuCommand {
    Dispatch { dispatch: SlotDispatch, uniform_offset: u32 },
    /// Makes all preceding dispatch writes visible to later draws
    Barrier,
    Draw { draw: SlotDraw, uniform_offset: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Empty,
    Written,
    Fenced,
}

/// Ordered commands plus their packed uniform records
#[derive(Debug)]
pub struct FrameCommands {
    commands: Vec<GpuCommand>,
    uniforms: Vec<u8>,
    stride: u32,
    slots: Vec<SlotState>,
}

impl FrameCommands {
    /// `stride` is the byte distance between uniform records (the device's
    /// dynamic offset alignment)
    pub fn new(slot_count: u32, stride: u32) -> Self {
        Self {
            commands: Vec::new(),
            uniforms: Vec::new(),
            stride: stride.max(4),
            slots: vec![SlotState::Empty; slot_count as usize],
        }
    }

    /// Forget the previous frame, keeping allocations
    pub fn clear(&mut self) {
        self.commands.clear();
        self.uniforms.clear();
        self.slots.fill(SlotState::Empty);
    }

    pub fn dispatch(&mut self, dispatch: SlotDispatch, uniforms: &[u8]) -> Result<()> {
        self.slot_mut(dispatch.slot)?;
        let uniform_offset = self.push_uniforms(uniforms)?;
        *self.slot_mut(dispatch.slot)? = SlotState::Written;
        self.commands.push(GpuCommand::Dispatch { dispatch, uniform_offset });
        Ok(())
    }

    /// Fences the slots written since the previous barrier; slots fenced
    /// earlier go stale and must be regenerated before their next draw
    pub fn barrier(&mut self) {
        for state in &mut self.slots {
            *state = match *state {
                SlotState::Written => SlotState::Fenced,
                _ => SlotState::Empty,
            };
        }
        self.commands.push(GpuCommand::Barrier);
    }

    pub fn draw(&mut self, draw: SlotDraw, uniforms: &[u8]) -> Result<()> {
        let state = *self.slot_mut(draw.slot)?;
        if state != SlotState::Fenced {
            return Err(Error::Gpu(format!(
                "draw of slot {} ({}) before its blades were generated and fenced",
                draw.slot, draw.tile
            )));
        }
        let uniform_offset = self.push_uniforms(uniforms)?;
        self.commands.push(GpuCommand::Draw { draw, uniform_offset });
        Ok(())
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Uniform records, each starting at a multiple of [`Self::stride`]
    pub fn uniform_bytes(&self) -> &[u8] {
        &self.uniforms
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn slot_count(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn dispatch_count(&self) -> usize {
        self.count(|c| matches!(c, GpuCommand::Dispatch { .. }))
    }

    pub fn barrier_count(&self) -> usize {
        self.count(|c| matches!(c, GpuCommand::Barrier))
    }

    pub fn draw_count(&self) -> usize {
        self.count(|c| matches!(c, GpuCommand::Draw { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn count(&self, pred: impl Fn(&GpuCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    fn slot_mut(&mut self, slot: u32) -> Result<&mut SlotState> {
        let slot_count = self.slots.len();
        self.slots.get_mut(slot as usize).ok_or_else(|| {
            Error::Gpu(format!("slot {} out of range ({} slots)", slot, slot_count))
        })
    }

    fn push_uniforms(&mut self, bytes: &[u8]) -> Result<u32> {
        if bytes.len() > self.stride as usize {
            return Err(Error::Configuration(format!(
                "uniform record of {} bytes exceeds the {} byte stride",
                bytes.len(),
                self.stride
            )));
        }
        let offset = self.uniforms.len();
        self.uniforms.extend_from_slice(bytes);
        self.uniforms.resize(offset + self.stride as usize, 0);
        u32::try_from(offset).map_err(|_| Error::Gpu("frame uniform stream exceeds 4 GiB".into()))
    }
}
