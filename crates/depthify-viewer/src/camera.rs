//! Orbit camera with damped rotation, pan, and zoom

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Orbit camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Fraction of pending rotation/pan applied each frame; the rest decays
    pub damping_factor: f32,
    /// Rotation sensitivity (radians per pixel dragged)
    pub rotate_speed: f32,
    /// Distance multiplier per wheel step
    pub zoom_step: f32,
    /// Minimum distance from the target
    pub min_distance: f32,
    /// Maximum distance from the target
    pub max_distance: f32,
    /// Pitch limit in degrees, both directions
    pub pitch_limit: f32,
    /// Camera position before any model is framed
    pub initial_position: [f32; 3],
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            damping_factor: 0.05,
            rotate_speed: 0.005,
            zoom_step: 0.95,
            min_distance: 0.1,
            max_distance: 900.0,
            pitch_limit: 89.0,
            initial_position: [0.0, 0.0, 100.0],
        }
    }
}

/// Camera orbiting a target point. User input accumulates into pending deltas
/// that [`OrbitCamera::update`] applies with damping, once per frame.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Configuration
    pub config: OrbitConfig,
    target: Vec3,
    /// Rotation around the target's vertical axis, radians
    yaw: f32,
    /// Elevation above the target's horizontal plane, radians
    pitch: f32,
    distance: f32,
    pending_rotation: Vec2,
    pending_pan: Vec3,
    pending_zoom: f32,
}

impl OrbitCamera {
    /// Create a camera at the configured initial position, looking at the origin
    pub fn new(config: OrbitConfig) -> Self {
        let initial = Vec3::from_array(config.initial_position);
        let mut camera = Self {
            config,
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance: 1.0,
            pending_rotation: Vec2::ZERO,
            pending_pan: Vec3::ZERO,
            pending_zoom: 1.0,
        };
        camera.look_from(initial, Vec3::ZERO);
        camera
    }

    /// Place the camera at `position` looking at `target`, discarding pending input
    pub fn look_from(&mut self, position: Vec3, target: Vec3) {
        let offset = position - target;
        let distance = offset.length().max(self.config.min_distance);
        self.target = target;
        self.distance = distance;
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        self.clamp_pitch();
        self.clear_pending();
    }

    /// Retarget the orbit without moving the camera
    pub fn set_target(&mut self, target: Vec3) {
        let position = self.position();
        self.look_from(position, target);
    }

    /// Camera world position
    pub fn position(&self) -> Vec3 {
        let cos_pitch = self.pitch.cos();
        self.target
            + Vec3::new(
                self.yaw.sin() * cos_pitch,
                self.pitch.sin(),
                self.yaw.cos() * cos_pitch,
            ) * self.distance
    }

    /// The point the camera orbits and looks at
    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Get the projection matrix for the given viewport aspect ratio
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.config.fov.to_radians(), aspect_ratio, self.config.near, self.config.far)
    }

    /// Mouse drag: rotate around the target
    pub fn handle_rotate(&mut self, drag_delta: Vec2) {
        self.pending_rotation += drag_delta * self.config.rotate_speed;
    }

    /// Right-button drag: move the target in the camera plane
    pub fn handle_pan(&mut self, drag_delta: Vec2) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        // Pan speed scales with distance so the target tracks the cursor.
        let scale = self.distance * (self.config.fov.to_radians() * 0.5).tan() / 500.0;
        self.pending_pan += (-right * drag_delta.x + up * drag_delta.y) * scale;
    }

    /// Scroll wheel: positive steps zoom in
    pub fn handle_zoom(&mut self, scroll_steps: f32) {
        self.pending_zoom *= self.config.zoom_step.powf(scroll_steps);
    }

    /// Apply pending input. Call once per frame.
    pub fn update(&mut self) {
        let damping = self.config.damping_factor;

        self.yaw -= self.pending_rotation.x * damping;
        self.pitch += self.pending_rotation.y * damping;
        self.clamp_pitch();
        self.target += self.pending_pan * damping;

        self.distance = (self.distance * self.pending_zoom)
            .clamp(self.config.min_distance, self.config.max_distance);
        self.pending_zoom = 1.0;

        self.pending_rotation *= 1.0 - damping;
        self.pending_pan *= 1.0 - damping;
    }

    fn clamp_pitch(&mut self) {
        let limit = self.config.pitch_limit.to_radians();
        self.pitch = self.pitch.clamp(-limit, limit);
    }

    fn clear_pending(&mut self) {
        self.pending_rotation = Vec2::ZERO;
        self.pending_pan = Vec3::ZERO;
        self.pending_zoom = 1.0;
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(OrbitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_at_initial_position() {
        let camera = OrbitCamera::default();
        let position = camera.position();
        assert_relative_eq!(position.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(position.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(position.z, 100.0, epsilon = 1e-4);
        assert_eq!(camera.target(), Vec3::ZERO);
    }

    #[test]
    fn look_from_roundtrips_position() {
        let mut camera = OrbitCamera::default();
        let target = Vec3::new(1.0, 2.0, 3.0);
        let position = Vec3::new(41.0, 22.0, 43.0);
        camera.look_from(position, target);
        assert_relative_eq!((camera.position() - position).length(), 0.0, epsilon = 1e-3);
        assert_eq!(camera.target(), target);
    }

    #[test]
    fn rotation_is_damped_over_frames() {
        let mut camera = OrbitCamera::default();
        camera.handle_rotate(Vec2::new(100.0, 0.0));

        let start = camera.yaw();
        camera.update();
        let first_step = (camera.yaw() - start).abs();
        let before = camera.yaw();
        camera.update();
        let second_step = (camera.yaw() - before).abs();

        // First frame applies damping_factor of the pending 0.5 rad; the next a decayed share.
        assert_relative_eq!(first_step, 0.5 * 0.05, epsilon = 1e-5);
        assert!(second_step < first_step);
        assert!(second_step > 0.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.handle_zoom(-1000.0);
        camera.update();
        assert_eq!(camera.distance(), camera.config.max_distance);

        camera.handle_zoom(10_000.0);
        camera.update();
        assert_eq!(camera.distance(), camera.config.min_distance);
    }

    #[test]
    fn pan_moves_target_in_view_plane() {
        let mut camera = OrbitCamera::default();
        camera.handle_pan(Vec2::new(100.0, 0.0));
        camera.update();

        // Dragging right slides the target left; looking down -Z, left is -X.
        let target = camera.target();
        assert!(target.x < 0.0);
        assert_relative_eq!(target.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(target.z, 0.0, epsilon = 1e-5);
        assert_eq!(camera.distance(), 100.0);

        camera.handle_pan(Vec2::new(0.0, 100.0));
        camera.update();
        assert!(camera.target().y > 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.look_from(Vec3::new(0.0, 100.0, 0.0), Vec3::ZERO);
        assert!(camera.pitch() <= 89.0_f32.to_radians() + 1e-4);
    }

    #[test]
    fn look_from_discards_pending_input() {
        let mut camera = OrbitCamera::default();
        camera.handle_rotate(Vec2::new(50.0, 50.0));
        camera.look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let before = camera.position();
        camera.update();
        assert_eq!(camera.position(), before);
    }
}
