//! Tile-based grass field scheduling
//!
//! The field is split into square tiles. Every frame each tile gets a level
//! of detail and blade count from its distance to the camera; then tiles are
//! processed K at a time: visible tiles have their blades generated by a
//! compute program into one of K attribute slots, a single barrier fences the
//! batch, and the slots are drawn.

pub mod batch;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod field;
pub mod tile;
pub mod visibility;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchOutcome, BatchRenderer, SlotRecord};
pub use commands::{FrameCommands, GpuCommand, SlotDispatch, SlotDraw};
pub use config::GrassConfig;
pub use dispatch::ComputeDispatcher;
pub use field::{FrameStats, GrassField};
pub use tile::{BladeBudget, GrassLod, Tile, TileId, TileIdAllocator};
