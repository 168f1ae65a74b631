use depthify_core::Transform;

/// A loaded mesh asset (renderer-agnostic). Contains raw vertex data extracted
/// from a glTF file.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    pub name: String,
    pub primitives: Vec<MeshPrimitive>,
}

impl MeshAsset {
    /// Total vertex count over all primitives
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.positions.len()).sum()
    }

    /// Base color of the first primitive's material, white if there is none
    pub fn base_color(&self) -> [f32; 4] {
        self.primitives.first().map_or([1.0; 4], |p| p.base_color)
    }
}

/// A single draw primitive within a mesh.
#[derive(Debug, Clone)]
pub struct MeshPrimitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Option<Vec<[f32; 4]>>,
    pub indices: Option<Vec<u32>>,
    /// PBR base color factor of the primitive's material (linear RGBA)
    pub base_color: [f32; 4],
}

impl Default for MeshPrimitive {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            colors: None,
            indices: None,
            base_color: [1.0; 4],
        }
    }
}

/// A node of the loaded scene graph: a local transform, an optional mesh,
/// and child nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeAsset {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<MeshAsset>,
    pub children: Vec<NodeAsset>,
}

impl NodeAsset {
    /// Number of meshes in this subtree
    pub fn mesh_count(&self) -> usize {
        usize::from(self.mesh.is_some()) + self.children.iter().map(NodeAsset::mesh_count).sum::<usize>()
    }
}

/// The root nodes of one glTF scene
#[derive(Debug, Clone, Default)]
pub struct SceneAsset {
    pub name: String,
    pub roots: Vec<NodeAsset>,
}

impl SceneAsset {
    pub fn mesh_count(&self) -> usize {
        self.roots.iter().map(NodeAsset::mesh_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        fn count(node: &NodeAsset) -> usize {
            node.mesh.as_ref().map_or(0, MeshAsset::vertex_count) + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }
}
