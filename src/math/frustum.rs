//! View frustum for tile culling

use crate::core::types::Vec3;

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Plane through `point` with the given (not necessarily unit) normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Index of each plane in [`Frustum::planes`]
pub const NEAR: usize = 0;
pub const FAR: usize = 1;
pub const LEFT: usize = 2;
pub const RIGHT: usize = 3;
pub const TOP: usize = 4;
pub const BOTTOM: usize = 5;

/// View frustum with 6 inward-facing planes (Near, Far, Left, Right, Top, Bottom)
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Build the frustum of a perspective camera
    ///
    /// `fov_y` is the vertical field of view in radians and `aspect` is
    /// width / height. `forward` and `up` need not be orthogonal; the true up
    /// vector is re-derived from them.
    pub fn from_camera(
        eye: Vec3,
        forward: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let forward = forward.normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        let half_v = far * (fov_y * 0.5).tan();
        let half_h = half_v * aspect;
        let far_center = forward * far;

        let mut planes = [Plane::new(Vec3::ZERO, 0.0); 6];
        planes[NEAR] = Plane::from_point_normal(eye + forward * near, forward);
        planes[FAR] = Plane::from_point_normal(eye + far_center, -forward);
        planes[LEFT] = Plane::from_point_normal(eye, (far_center - right * half_h).cross(up));
        planes[RIGHT] = Plane::from_point_normal(eye, up.cross(far_center + right * half_h));
        planes[TOP] = Plane::from_point_normal(eye, (far_center + up * half_v).cross(right));
        planes[BOTTOM] = Plane::from_point_normal(eye, right.cross(far_center - up * half_v));

        Self { planes }
    }

    /// Check if point is inside frustum (on a plane counts as inside)
    pub fn contains_point(&self, point: Vec3) -> bool {
        for plane in &self.planes {
            if plane.distance_to_point(point) < 0.0 {
                return false;
            }
        }
        true
    }
}
