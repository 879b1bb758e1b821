//! Device limits that shape compute dispatches and uniform packing

use crate::core::error::Error;
use crate::core::types::Result;

/// Work-group counts for one compute dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl DispatchSize {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total work groups launched
    pub fn total(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }
}

/// Limits queried once from the device and passed to whoever dispatches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Maximum work-group count per dimension (X, Y, Z)
    pub max_workgroups: [u32; 3],
    /// Required alignment of dynamic uniform buffer offsets
    pub uniform_offset_alignment: u32,
}

impl DeviceLimits {
    pub fn new(max_workgroups: [u32; 3], uniform_offset_alignment: u32) -> Self {
        Self {
            max_workgroups,
            uniform_offset_alignment,
        }
    }

    /// Read the relevant limits from a wgpu device
    pub fn from_wgpu(limits: &wgpu::Limits) -> Self {
        let per_dim = limits.max_compute_workgroups_per_dimension;
        Self {
            max_workgroups: [per_dim; 3],
            uniform_offset_alignment: limits.min_uniform_buffer_offset_alignment,
        }
    }

    /// Fold a 1-D work-group count into X, then Y, then Z
    ///
    /// When `groups` exceeds the X limit, X is clamped and Y becomes
    /// `ceil(groups / max_x)`; the same folding moves overflow from Y into Z.
    /// The launched total may exceed `groups`; shaders discard the excess.
    pub fn dispatch_size(&self, groups: u32) -> Result<DispatchSize> {
        let [max_x, max_y, max_z] = self.max_workgroups.map(|m| m.max(1));

        let mut size = DispatchSize::new(groups, 1, 1);
        if size.x > max_x {
            size.y = size.x.div_ceil(max_x);
            size.x = max_x;
        }
        if size.y > max_y {
            size.z = size.y.div_ceil(max_y);
            size.y = max_y;
        }
        if size.z > max_z {
            return Err(Error::CapacityExceeded {
                requested: groups,
                limits: self.max_workgroups,
            });
        }
        Ok(size)
    }
}

impl Default for DeviceLimits {
    /// WebGPU baseline limits
    fn default() -> Self {
        Self::new([65535; 3], 256)
    }
}
