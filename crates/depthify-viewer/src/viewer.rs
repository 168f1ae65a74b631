//! The model viewer: loading, framing, view controls, and per-frame state

use std::sync::mpsc;
use std::thread;

use depthify_assets::{AssetError, AssetSource, SceneAsset};
use glam::Vec3;
use tracing::{info, warn};

use crate::camera::{OrbitCamera, OrbitConfig};
use crate::render::{DrawCall, DrawPushConstants, Frame, SceneUniforms};
use crate::scene::ViewerScene;

/// Model rotation per frame while auto-rotate is on, in radians
pub const AUTO_ROTATE_STEP: f32 = 0.01;

/// Informational text shown over the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub title: String,
    pub lines: Vec<String>,
    pub is_error: bool,
}

impl Overlay {
    fn controls_help(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: vec![
                "Mouse: Rotate | Wheel: Zoom | Right: Pan".into(),
                "Model created with Depthify".into(),
            ],
            is_error: false,
        }
    }

    fn load_error(url: &str) -> Self {
        Self {
            title: "Error loading model".into(),
            lines: vec![
                format!("Could not load '{}'", url),
                "Make sure the GLB file is in the same folder as the viewer".into(),
            ],
            is_error: true,
        }
    }
}

/// A model load running on a background thread
struct PendingLoad {
    url: String,
    receiver: mpsc::Receiver<Result<SceneAsset, AssetError>>,
}

/// Loads one model and presents it with orbit controls, wireframe, and auto-rotate
pub struct ModelViewer {
    source: AssetSource,
    camera: OrbitCamera,
    scene: Option<ViewerScene>,
    pending: Option<PendingLoad>,
    overlay: Overlay,
    uniforms: SceneUniforms,
    wireframe: bool,
    auto_rotate: bool,
}

impl ModelViewer {
    pub fn new(source: AssetSource, camera: OrbitConfig) -> Self {
        Self {
            source,
            camera: OrbitCamera::new(camera),
            scene: None,
            pending: None,
            overlay: Overlay::controls_help("3D Model Viewer"),
            uniforms: SceneUniforms::default(),
            wireframe: false,
            auto_rotate: false,
        }
    }

    /// Start loading a model. The result is picked up by [`ModelViewer::update`].
    /// A later call supersedes an earlier load that has not finished.
    pub fn load_model(&mut self, url: &str) {
        let (tx, rx) = mpsc::channel();
        let source = self.source.clone();
        let owned_url = url.to_string();

        thread::spawn(move || {
            let _ = tx.send(source.load(&owned_url));
        });

        info!("Loading model '{}'", url);
        self.pending = Some(PendingLoad {
            url: url.to_string(),
            receiver: rx,
        });
    }

    /// Whether a load is still in flight
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Block until the in-flight load (if any) finishes and apply it
    pub fn finish_loading(&mut self) {
        if let Some(pending) = self.pending.take() {
            let result = pending.receiver.recv().unwrap_or_else(|_| {
                Err(AssetError::GltfLoadFailed(self.source.resolve(&pending.url), "loader thread exited".into()))
            });
            self.apply_load(&pending.url, result);
        }
    }

    fn poll_load(&mut self) {
        let Some(pending) = &self.pending else {
            return;
        };
        let result = match pending.receiver.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return,
            Err(mpsc::TryRecvError::Disconnected) => Err(AssetError::GltfLoadFailed(
                self.source.resolve(&pending.url),
                "loader thread exited".into(),
            )),
        };
        let url = pending.url.clone();
        self.pending = None;
        self.apply_load(&url, result);
    }

    fn apply_load(&mut self, url: &str, result: Result<SceneAsset, AssetError>) {
        match result {
            Ok(asset) => self.set_model(asset),
            Err(err) => {
                warn!("Error loading model: {}", err);
                self.overlay = Overlay::load_error(url);
            }
        }
    }

    /// Install a loaded asset: frame it, carry over the wireframe flag, and
    /// aim the controls at it.
    pub fn set_model(&mut self, asset: SceneAsset) {
        let mut scene = ViewerScene::from_asset(asset);
        scene.apply_wireframe(self.wireframe);

        let framing = scene.framing();
        info!(
            "Model '{}' framed: {} meshes, scale {:.4}",
            scene.name,
            scene.mesh_count(),
            framing.scale
        );

        if let Some(bounds) = scene.bounds() {
            self.camera.set_target(bounds.center());
        }
        self.overlay = Overlay::controls_help(scene.name.clone());
        self.scene = Some(scene);
    }

    /// Place the camera at twice the model's largest dimension along the
    /// (1, 0.5, 1) diagonal and aim it at the model's center.
    pub fn reset_view(&mut self) {
        let Some(bounds) = self.scene.as_ref().and_then(ViewerScene::bounds) else {
            return;
        };
        let center = bounds.center();
        let distance = bounds.max_dimension() * 2.0;
        let position = center + Vec3::new(distance, distance * 0.5, distance);
        self.camera.look_from(position, center);
    }

    /// Flip wireframe rendering for every surface of the model
    pub fn toggle_wireframe(&mut self) -> bool {
        self.wireframe = !self.wireframe;
        if let Some(scene) = &mut self.scene {
            scene.apply_wireframe(self.wireframe);
        }
        self.wireframe
    }

    /// Flip continuous rotation of the model around its vertical axis
    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_rotate = !self.auto_rotate;
        self.auto_rotate
    }

    /// Per-frame update: pick up finished loads, apply damped controls, and
    /// advance auto-rotation.
    pub fn update(&mut self) {
        self.poll_load();
        self.camera.update();
        if self.auto_rotate {
            if let Some(scene) = &mut self.scene {
                scene.transform.rotate_y(AUTO_ROTATE_STEP);
            }
        }
    }

    /// Collect the draw data for the current state
    pub fn frame(&self, index: u64, aspect_ratio: f32) -> Frame<'_> {
        let uniforms = SceneUniforms {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(aspect_ratio),
            ..self.uniforms
        };

        let mut draws = Vec::new();
        if let Some(scene) = &self.scene {
            scene.for_each_mesh(|render_mesh, world| {
                draws.push(DrawCall {
                    mesh: &render_mesh.mesh,
                    wireframe: render_mesh.material.wireframe,
                    push_constants: DrawPushConstants::new(
                        world,
                        &uniforms,
                        render_mesh.material.color,
                        render_mesh.material.wireframe,
                    ),
                });
            });
        }

        Frame {
            index,
            uniforms,
            draws,
            overlay: &self.overlay,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Mutable camera access for input handling
    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn scene(&self) -> Option<&ViewerScene> {
        self.scene.as_ref()
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tests::{box_node, nested_asset};
    use approx::assert_relative_eq;
    use depthify_assets::SceneAsset;
    use glam::Vec2;

    fn viewer() -> ModelViewer {
        ModelViewer::new(AssetSource::new("/nonexistent"), OrbitConfig::default())
    }

    fn wireframe_flags(viewer: &ModelViewer) -> Vec<bool> {
        let mut flags = Vec::new();
        viewer
            .scene()
            .unwrap()
            .for_each_mesh(|mesh, _| flags.push(mesh.material.wireframe));
        flags
    }

    #[test]
    fn missing_model_replaces_overlay_with_error() {
        let mut viewer = viewer();
        viewer.load_model("model.glb");
        viewer.finish_loading();

        let overlay = viewer.overlay();
        assert!(overlay.is_error);
        assert_eq!(overlay.title, "Error loading model");
        assert!(overlay.lines.iter().any(|l| l.contains("same folder")));
        assert!(viewer.scene().is_none());
        assert!(!viewer.is_loading());
    }

    #[test]
    fn reset_view_is_idempotent() {
        let mut viewer = viewer();
        viewer.set_model(nested_asset());

        viewer.reset_view();
        let first = viewer.camera().position();
        viewer.reset_view();
        let second = viewer.camera().position();

        assert_eq!(first, second);
        // Framed model: 50 units wide, centered at the origin.
        assert_relative_eq!(first.x, 100.0, epsilon = 1e-2);
        assert_relative_eq!(first.y, 50.0, epsilon = 1e-2);
        assert_relative_eq!(first.z, 100.0, epsilon = 1e-2);
        assert_relative_eq!(viewer.camera().target().length(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn reset_view_without_model_keeps_camera() {
        let mut viewer = viewer();
        let before = viewer.camera().position();
        viewer.reset_view();
        assert_eq!(viewer.camera().position(), before);
    }

    #[test]
    fn wireframe_toggled_twice_restores_every_mesh() {
        let mut viewer = viewer();
        viewer.set_model(nested_asset());
        assert_eq!(wireframe_flags(&viewer), vec![false, false]);

        assert!(viewer.toggle_wireframe());
        assert_eq!(wireframe_flags(&viewer), vec![true, true]);

        assert!(!viewer.toggle_wireframe());
        assert_eq!(wireframe_flags(&viewer), vec![false, false]);
    }

    #[test]
    fn wireframe_flag_carries_over_to_next_model() {
        let mut viewer = viewer();
        viewer.toggle_wireframe();
        viewer.set_model(SceneAsset {
            name: "cube".into(),
            roots: vec![box_node("cube", Vec3::ZERO, Vec3::ONE)],
        });
        assert_eq!(wireframe_flags(&viewer), vec![true]);
    }

    #[test]
    fn auto_rotate_turns_model_but_not_camera() {
        let mut viewer = viewer();
        viewer.set_model(nested_asset());
        viewer.toggle_auto_rotate();

        let camera_yaw = viewer.camera().yaw();
        for _ in 0..10 {
            viewer.update();
        }

        let model_yaw = viewer.scene().unwrap().transform.yaw();
        assert_relative_eq!(model_yaw, 10.0 * AUTO_ROTATE_STEP, epsilon = 1e-4);
        assert_eq!(viewer.camera().yaw(), camera_yaw);
    }

    #[test]
    fn user_orbit_input_applies_while_auto_rotating() {
        let mut viewer = viewer();
        viewer.set_model(nested_asset());
        viewer.toggle_auto_rotate();

        let camera_yaw = viewer.camera().yaw();
        viewer.camera_mut().handle_rotate(Vec2::new(40.0, 0.0));
        viewer.update();

        assert_relative_eq!(viewer.camera().yaw(), camera_yaw - 40.0 * 0.005 * 0.05, epsilon = 1e-5);
        assert_relative_eq!(viewer.scene().unwrap().transform.yaw(), AUTO_ROTATE_STEP, epsilon = 1e-5);
    }

    #[test]
    fn frame_draws_every_mesh() {
        let mut viewer = viewer();
        viewer.set_model(nested_asset());
        viewer.toggle_wireframe();
        let frame = viewer.frame(1, 16.0 / 9.0);
        assert_eq!(frame.draws.len(), 2);
        assert!(frame.draws.iter().all(|d| d.wireframe && d.push_constants.params[0] == 1.0));
        assert!(!frame.overlay.is_error);
    }
}
