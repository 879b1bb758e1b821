//! Two-phase tile visibility
//!
//! The broad phase keeps tiles near the camera on the ground plane; the
//! narrow phase keeps tiles with at least one ground corner inside the view
//! frustum. A tile fully behind the near plane has no corner inside and is
//! always rejected.

use crate::core::types::Vec3;
use crate::grass::tile::Tile;
use crate::math::{Frustum, circle_overlaps_rect, ground};

/// Broad phase: render-radius circle around the camera against the tile footprint
pub fn in_render_radius(tile: &Tile, camera_position: Vec3) -> bool {
    circle_overlaps_rect(ground(camera_position), tile.radius_render(), tile.rect())
}

/// Narrow phase: any corner inside (or on) every frustum plane
pub fn any_corner_in_frustum(corners: &[Vec3; 4], frustum: &Frustum) -> bool {
    corners.iter().any(|&corner| frustum.contains_point(corner))
}

/// Whether a tile should be generated and drawn this frame
pub fn is_visible(tile: &Tile, camera_position: Vec3, frustum: &Frustum) -> bool {
    in_render_radius(tile, camera_position) && any_corner_in_frustum(&tile.corners(), frustum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::Camera;
    use crate::core::types::Vec2;
    use crate::grass::tile::{BladeBudget, TileId};

    const BUDGET: BladeBudget = BladeBudget { min: 256, max_high: 8192, max_low: 8192 };

    fn tile(origin: Vec2, radius_render: f32) -> Tile {
        Tile::new(TileId(1), origin, Vec2::splat(4.0), radius_render, &BUDGET)
    }

    fn camera(eye: Vec3, target: Vec3) -> Camera {
        Camera::look_at(eye, target, Vec3::Y)
    }

    #[test]
    fn test_tile_in_front_is_visible() {
        let t = tile(Vec2::new(-2.0, -12.0), 30.0);
        let cam = camera(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -10.0));
        assert!(is_visible(&t, cam.position, &cam.frustum()));
    }

    #[test]
    fn test_tile_behind_camera_is_rejected() {
        let t = tile(Vec2::new(-2.0, 8.0), 30.0);
        let cam = camera(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -10.0));
        assert!(in_render_radius(&t, cam.position));
        assert!(!is_visible(&t, cam.position, &cam.frustum()));
    }

    #[test]
    fn test_tile_beyond_render_radius_is_rejected() {
        let t = tile(Vec2::new(-2.0, -60.0), 30.0);
        let cam = camera(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -10.0));
        assert!(!in_render_radius(&t, cam.position));
        assert!(!is_visible(&t, cam.position, &cam.frustum()));
    }

    #[test]
    fn test_single_corner_inside_is_enough() {
        let frustum = camera(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -10.0)).frustum();
        let corners = [
            Vec3::new(-500.0, 0.0, -10.0),
            Vec3::new(500.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, 500.0),
        ];
        assert!(any_corner_in_frustum(&corners, &frustum));

        let outside = [corners[0], corners[1], corners[3], Vec3::new(0.0, 0.0, 10.0)];
        assert!(!any_corner_in_frustum(&outside, &frustum));
    }

    #[test]
    fn test_broad_phase_ignores_camera_height() {
        let t = tile(Vec2::ZERO, 5.0);
        assert!(in_render_radius(&t, Vec3::new(2.0, 0.0, 2.0)));
        assert!(in_render_radius(&t, Vec3::new(2.0, 500.0, 2.0)));
    }
}
