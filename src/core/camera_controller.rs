//! First-person camera controller

use crate::core::camera::Camera;
use crate::core::input::InputState;
use winit::keyboard::KeyCode;

/// Fly camera: WASD to move, arrow Up/Down for world up/down, Shift to go faster,
/// mouse look while the cursor is captured
pub struct FpsCameraController {
    /// Movement speed in units per second
    pub speed: f32,
    /// Mouse sensitivity
    pub sensitivity: f32,
    /// Speed multiplier while Shift is held
    pub boost: f32,
    yaw: f32,
    pitch: f32,
}

impl FpsCameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            boost: 5.0,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Adopt the camera's current orientation so the first mouse move does not snap
    pub fn sync_with(&mut self, camera: &Camera) {
        let (yaw, pitch) = camera.euler_angles();
        self.yaw = yaw;
        self.pitch = pitch.clamp(-1.5, 1.5);
    }

    /// Update camera based on input
    pub fn update(&mut self, camera: &mut Camera, input: &InputState, dt: f32) {
        if input.is_mouse_captured() {
            let (dx, dy) = input.mouse_delta();
            self.yaw -= dx * self.sensitivity * 0.001;
            self.pitch -= dy * self.sensitivity * 0.001;
            self.pitch = self.pitch.clamp(-1.5, 1.5);

            camera.set_rotation_euler(self.yaw, self.pitch);
        }

        let mut velocity = glam::Vec3::ZERO;
        let forward = camera.forward();
        let right = camera.right();

        if input.is_key_pressed(KeyCode::KeyW) {
            velocity += forward;
        }
        if input.is_key_pressed(KeyCode::KeyS) {
            velocity -= forward;
        }
        if input.is_key_pressed(KeyCode::KeyA) {
            velocity -= right;
        }
        if input.is_key_pressed(KeyCode::KeyD) {
            velocity += right;
        }
        if input.is_key_pressed(KeyCode::ArrowUp) {
            velocity.y += 1.0;
        }
        if input.is_key_pressed(KeyCode::ArrowDown) {
            velocity.y -= 1.0;
        }

        if velocity.length_squared() > 0.0 {
            let mut speed = self.speed;
            if input.is_key_pressed(KeyCode::ShiftLeft) || input.is_key_pressed(KeyCode::ShiftRight) {
                speed *= self.boost;
            }
            camera.position += velocity.normalize() * speed * dt;
        }
    }
}

impl Default for FpsCameraController {
    fn default() -> Self {
        Self::new(5.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use winit::event::ElementState;

    #[test]
    fn test_forward_motion() {
        let mut camera = Camera::default();
        let start = camera.position;
        let mut controller = FpsCameraController::new(2.0, 1.0);
        let mut input = InputState::new();
        input.process_key(KeyCode::KeyW, ElementState::Pressed);

        controller.update(&mut camera, &input, 0.5);
        assert!((camera.position - (start + Vec3::new(0.0, 0.0, -1.0))).length() < 1e-5);
    }

    #[test]
    fn test_shift_boosts_vertical_motion() {
        let mut camera = Camera::default();
        let start = camera.position;
        let mut controller = FpsCameraController::new(1.0, 1.0);
        let mut input = InputState::new();
        input.process_key(KeyCode::ArrowUp, ElementState::Pressed);
        input.process_key(KeyCode::ShiftLeft, ElementState::Pressed);

        controller.update(&mut camera, &input, 1.0);
        assert!((camera.position.y - (start.y + 5.0)).abs() < 1e-5);
    }

    #[test]
    fn test_sync_keeps_orientation() {
        let mut camera = Camera::look_at(Vec3::ZERO, Vec3::new(3.0, -1.0, -4.0), Vec3::Y);
        let before = camera.forward();
        let mut controller = FpsCameraController::default();
        controller.sync_with(&camera);

        let mut input = InputState::new();
        input.set_mouse_captured(true);
        controller.update(&mut camera, &input, 0.0);
        assert!(camera.forward().distance(before) < 1e-4);
    }
}
