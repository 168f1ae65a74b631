//! `depthify view`: load a GLB model and drive the viewer loop headlessly

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use depthify_assets::AssetSource;
use depthify_viewer::{Frame, ModelViewer, RenderLoop, Renderer};
use tracing::{debug, info};

use crate::settings::Settings;

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Model file, resolved against the viewer base directory
    pub model: String,

    /// Stop after this many frames; runs until interrupted otherwise
    #[arg(long)]
    pub frames: Option<u64>,

    /// Start in wireframe mode
    #[arg(long)]
    pub wireframe: bool,

    /// Start with auto-rotation on
    #[arg(long)]
    pub auto_rotate: bool,

    /// Directory model paths are resolved against
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

/// Renderer without a window: tallies what each frame would draw
struct HeadlessRenderer {
    width: u32,
    height: u32,
    log_every: u64,
    frames: u64,
    draws: u64,
    vertices: u64,
}

impl HeadlessRenderer {
    fn new(width: u32, height: u32, log_every: u64) -> Self {
        Self {
            width,
            height,
            log_every: log_every.max(1),
            frames: 0,
            draws: 0,
            vertices: 0,
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    fn render(&mut self, frame: &Frame<'_>) {
        self.frames += 1;
        self.draws += frame.draws.len() as u64;
        self.vertices += frame
            .draws
            .iter()
            .map(|d| d.mesh.vertex_count() as u64)
            .sum::<u64>();

        if frame.index % self.log_every == 0 {
            debug!(
                "Frame {}: {} draws, overlay '{}'",
                frame.index,
                frame.draws.len(),
                frame.overlay.title
            );
        }
    }
}

pub fn run(settings: &Settings, args: ViewArgs) -> Result<()> {
    let base_dir = args.base_dir.unwrap_or_else(|| settings.viewer.base_dir.clone());
    let mut viewer = ModelViewer::new(AssetSource::new(base_dir), settings.viewer.camera.clone());

    if args.wireframe {
        viewer.toggle_wireframe();
    }
    if args.auto_rotate {
        viewer.toggle_auto_rotate();
    }

    viewer.load_model(&args.model);
    viewer.finish_loading();

    let overlay = viewer.overlay().clone();
    if overlay.is_error {
        bail!("{}\n{}", overlay.title, overlay.lines.join("\n"));
    }
    viewer.reset_view();

    if let Some(scene) = viewer.scene() {
        let framing = scene.framing();
        println!("{}", overlay.title);
        println!("  Meshes: {}", scene.mesh_count());
        println!("  Scale:  {:.4}", framing.scale);
    }
    for line in &overlay.lines {
        println!("  {}", line);
    }

    let time_config = settings.time_config();
    let frame_rate = u64::from(time_config.frame_rate);
    let mut render_loop = RenderLoop::new(time_config);
    if let Some(frames) = args.frames {
        render_loop = render_loop.with_frame_limit(frames);
    }

    let mut renderer = HeadlessRenderer::new(args.width, args.height, frame_rate);
    let frames = render_loop.run(&mut viewer, &mut renderer);

    info!(
        "Rendered {} frames ({} draws, {} vertices submitted)",
        frames, renderer.draws, renderer.vertices
    );
    println!("Rendered {} frames", renderer.frames);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depthify_core::TimeConfig;
    use depthify_viewer::OrbitConfig;

    #[test]
    fn headless_renderer_counts_frames_without_a_model() {
        let mut viewer = ModelViewer::new(AssetSource::new("/nonexistent"), OrbitConfig::default());
        let mut renderer = HeadlessRenderer::new(800, 400, 60);
        let config = TimeConfig {
            frame_rate: 1000,
            ..Default::default()
        };

        let frames = RenderLoop::new(config).with_frame_limit(3).run(&mut viewer, &mut renderer);

        assert_eq!(frames, 3);
        assert_eq!(renderer.frames, 3);
        assert_eq!(renderer.draws, 0);
        assert_eq!(renderer.aspect_ratio(), 2.0);
    }
}
