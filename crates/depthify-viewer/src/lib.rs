//! Depthify Viewer - Interactive model viewer
//!
//! Loads one model, frames it into a fixed footprint, and presents it with
//! orbit/zoom controls, wireframe and auto-rotate toggles. Drawing is delegated
//! to a [`Renderer`] implementation driven by [`RenderLoop`].

pub mod bounds;
pub mod camera;
pub mod framing;
pub mod render;
pub mod scene;
pub mod viewer;

pub use bounds::Aabb;
pub use camera::{OrbitCamera, OrbitConfig};
pub use framing::{Framing, MAX_MODEL_DIMENSION};
pub use render::{DrawCall, DrawPushConstants, Frame, RenderLoop, Renderer, SceneUniforms};
pub use scene::{Material, RenderMesh, SceneNode, ViewerScene};
pub use viewer::{ModelViewer, Overlay, AUTO_ROTATE_STEP};
