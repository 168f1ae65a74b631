//! Depthify Core - Shared types and utilities for the Depthify client
//!
//! This crate provides the primitives used by both the job client and the viewer:
//! - Mathematical primitives (re-exported from glam)
//! - Transform for positioning loaded models
//! - Frame timing for cooperative, frame-paced loops

pub mod time;
pub mod types;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use time::{FrameTime, TimeConfig};
pub use types::{Color, Transform};
