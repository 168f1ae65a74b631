//! Depthify Assets - Model loading
//!
//! Loads binary glTF (`.glb`) and `.gltf` files into a renderer-agnostic node
//! hierarchy for the Depthify viewer.

mod error;
mod gltf_loader;
mod mesh;
mod source;

pub use error::AssetError;
pub use gltf_loader::{load_gltf, load_gltf_slice};
pub use mesh::{MeshAsset, MeshPrimitive, NodeAsset, SceneAsset};
pub use source::AssetSource;
