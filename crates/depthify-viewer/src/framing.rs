//! Framing policy applied to a freshly loaded model

use depthify_core::Transform;
use glam::Vec3;

use crate::bounds::Aabb;

/// Largest extent a loaded model may occupy, in scene units
pub const MAX_MODEL_DIMENSION: f32 = 50.0;

/// How a model is moved into the viewport: a uniform scale and the offset
/// that puts its bounding-box center at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    /// Translation applied after scaling
    pub offset: Vec3,
    /// Uniform scale factor (1.0 when the model already fits)
    pub scale: f32,
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl Framing {
    /// Framing for a model whose unframed bounds are `bounds`
    pub fn for_bounds(bounds: &Aabb) -> Self {
        let max_dimension = bounds.max_dimension();
        let scale = if max_dimension > MAX_MODEL_DIMENSION {
            MAX_MODEL_DIMENSION / max_dimension
        } else {
            1.0
        };
        Self {
            offset: -bounds.center() * scale,
            scale,
        }
    }

    /// The model transform realising this framing
    pub fn transform(&self) -> Transform {
        let mut transform = Transform::from_position(self.offset);
        transform.set_uniform_scale(self.scale);
        transform
    }
}
