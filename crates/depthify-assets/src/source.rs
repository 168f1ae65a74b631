use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AssetError;
use crate::gltf_loader;
use crate::mesh::SceneAsset;

/// Resolves model URLs against the viewer's base directory and loads them.
#[derive(Debug, Clone)]
pub struct AssetSource {
    base_path: PathBuf,
}

impl AssetSource {
    /// Create a source rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        info!("AssetSource created with base path: {}", base_path.display());
        Self { base_path }
    }

    /// Resolve a relative model URL against the base path.
    pub fn resolve(&self, url: &str) -> PathBuf {
        let trimmed = url.strip_prefix("file://").unwrap_or(url);
        let path = Path::new(trimmed);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path.strip_prefix("./").unwrap_or(path))
        }
    }

    /// Resolve and load a model.
    pub fn load(&self, url: &str) -> Result<SceneAsset, AssetError> {
        gltf_loader::load_gltf(&self.resolve(url))
    }
}
