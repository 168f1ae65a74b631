//! Per-frame draw data, the renderer seam, and the render loop driver

use std::thread;
use std::time::{Duration, Instant};

use depthify_assets::MeshAsset;
use depthify_core::{Color, FrameTime, TimeConfig};
use glam::{Mat4, Vec3};
use tracing::info;

use crate::viewer::ModelViewer;

/// Scene-wide uniforms for rendering
#[derive(Clone, Copy, Debug)]
pub struct SceneUniforms {
    /// View matrix (camera)
    pub view: Mat4,
    /// Projection matrix
    pub projection: Mat4,
    /// Direction the key light shines from (normalized)
    pub light_direction: Vec3,
    /// Key light intensity
    pub light_intensity: f32,
    /// Key light color
    pub light_color: Color,
    /// Ambient light color
    pub ambient_color: Color,
    /// Ambient light intensity
    pub ambient_intensity: f32,
    /// Clear color behind the model
    pub background: Color,
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            light_direction: Vec3::new(10.0, 10.0, 5.0).normalize(),
            light_intensity: 0.8,
            light_color: Color::WHITE,
            ambient_color: Color::from_hex(0x404040),
            ambient_intensity: 0.6,
            background: Color::from_hex(0xf0f0f0),
        }
    }
}

/// Push constants for one mesh draw
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawPushConstants {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_direction: [f32; 4], // xyz = direction, w = intensity
    pub light_color: [f32; 4],     // rgb = color, a = ambient intensity
    pub ambient_color: [f32; 4],   // rgb = color
    pub base_color: [f32; 4],      // rgba = material color
    pub params: [f32; 4],          // x = wireframe (0 or 1)
}

impl DrawPushConstants {
    pub fn new(model: Mat4, uniforms: &SceneUniforms, base_color: Color, wireframe: bool) -> Self {
        let d = uniforms.light_direction;
        let c = uniforms.light_color;
        Self {
            model: model.to_cols_array_2d(),
            view: uniforms.view.to_cols_array_2d(),
            projection: uniforms.projection.to_cols_array_2d(),
            light_direction: [d.x, d.y, d.z, uniforms.light_intensity],
            light_color: [c.r, c.g, c.b, uniforms.ambient_intensity],
            ambient_color: uniforms.ambient_color.to_array(),
            base_color: base_color.to_array(),
            params: [if wireframe { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// One mesh to draw this frame
#[derive(Debug)]
pub struct DrawCall<'a> {
    pub mesh: &'a MeshAsset,
    pub wireframe: bool,
    pub push_constants: DrawPushConstants,
}

/// Everything a renderer needs for one frame
#[derive(Debug)]
pub struct Frame<'a> {
    pub index: u64,
    pub uniforms: SceneUniforms,
    pub draws: Vec<DrawCall<'a>>,
    pub overlay: &'a crate::viewer::Overlay,
}

/// Drawing backend
pub trait Renderer {
    /// Viewport width / height
    fn aspect_ratio(&self) -> f32;

    /// Draw one frame
    fn render(&mut self, frame: &Frame<'_>);
}

/// Drives a [`ModelViewer`] at a fixed frame rate. Consumed by [`RenderLoop::run`],
/// so a loop can only ever be started once.
pub struct RenderLoop {
    time: FrameTime,
    max_frames: Option<u64>,
}

impl RenderLoop {
    pub fn new(config: TimeConfig) -> Self {
        Self {
            time: FrameTime::new(config),
            max_frames: None,
        }
    }

    /// Stop after `frames` frames instead of running for the process lifetime
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Run the loop: each frame polls pending loads, updates controls and
    /// auto-rotation, and draws. Returns the number of frames rendered.
    pub fn run(mut self, viewer: &mut ModelViewer, renderer: &mut impl Renderer) -> u64 {
        let interval = self.time.config.frame_interval();
        info!("Render loop started at {} fps", self.time.config.frame_rate);

        let mut last = Instant::now();
        loop {
            if self.max_frames.is_some_and(|max| self.time.frame_count >= max) {
                break;
            }

            let now = Instant::now();
            self.time.update(now - last);
            last = now;

            viewer.update();
            let frame = viewer.frame(self.time.frame_count, renderer.aspect_ratio());
            renderer.render(&frame);

            let spent = now.elapsed();
            if spent < interval {
                thread::sleep(interval - spent);
            }
        }

        info!("Render loop stopped after {} frames", self.time.frame_count);
        self.time.frame_count
    }

    /// Frame budget at the configured rate
    pub fn interval(&self) -> Duration {
        self.time.config.frame_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_constants_are_pod_sized() {
        assert_eq!(std::mem::size_of::<DrawPushConstants>(), 3 * 64 + 5 * 16);
        let push = DrawPushConstants::new(Mat4::IDENTITY, &SceneUniforms::default(), Color::WHITE, true);
        let bytes: &[u8] = bytemuck::bytes_of(&push);
        assert_eq!(bytes.len(), std::mem::size_of::<DrawPushConstants>());
        assert_eq!(push.params[0], 1.0);
    }

    #[test]
    fn default_lighting_matches_viewer_setup() {
        let uniforms = SceneUniforms::default();
        assert_eq!(uniforms.ambient_intensity, 0.6);
        assert_eq!(uniforms.light_intensity, 0.8);
        assert!((uniforms.light_direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn interval_follows_frame_rate() {
        let config = TimeConfig {
            frame_rate: 30,
            ..Default::default()
        };
        let render_loop = RenderLoop::new(config);
        assert!((render_loop.interval().as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    }
}
