use std::path::{Path, PathBuf};

use depthify_core::Transform;
use glam::Mat4;
use tracing::debug;

use crate::error::AssetError;
use crate::mesh::{MeshAsset, MeshPrimitive, NodeAsset, SceneAsset};

/// Load a glTF 2.0 file (.gltf or .glb) and extract its default scene.
pub fn load_gltf(path: &Path) -> Result<SceneAsset, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }

    let (document, buffers, _images) = gltf::import(path)
        .map_err(|e| AssetError::GltfLoadFailed(path.to_path_buf(), e.to_string()))?;

    build_scene(path, &document, &buffers)
}

/// Load an in-memory GLB (or self-contained .gltf) payload.
pub fn load_gltf_slice(bytes: &[u8]) -> Result<SceneAsset, AssetError> {
    let label = PathBuf::from("<memory>");
    let (document, buffers, _images) = gltf::import_slice(bytes)
        .map_err(|e| AssetError::GltfLoadFailed(label.clone(), e.to_string()))?;

    build_scene(&label, &document, &buffers)
}

fn build_scene(
    path: &Path,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<SceneAsset, AssetError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::Empty(path.to_path_buf()))?;

    let roots: Vec<NodeAsset> = scene.nodes().map(|node| build_node(node, buffers)).collect();
    let asset = SceneAsset {
        name: scene.name().unwrap_or("scene").to_string(),
        roots,
    };

    if asset.mesh_count() == 0 {
        return Err(AssetError::Empty(path.to_path_buf()));
    }

    debug!(
        "glTF '{}': {} meshes, {} vertices",
        path.display(),
        asset.mesh_count(),
        asset.vertex_count()
    );

    Ok(asset)
}

fn build_node(node: gltf::Node<'_>, buffers: &[gltf::buffer::Data]) -> NodeAsset {
    let transform = Transform::from_matrix(Mat4::from_cols_array_2d(&node.transform().matrix()));
    let mesh = node.mesh().map(|mesh| read_mesh(&mesh, buffers));
    let children = node.children().map(|child| build_node(child, buffers)).collect();

    NodeAsset {
        name: node.name().unwrap_or("node").to_string(),
        transform,
        mesh,
        children,
    }
}

fn read_mesh(mesh: &gltf::Mesh<'_>, buffers: &[gltf::buffer::Data]) -> MeshAsset {
    let name = mesh.name().unwrap_or("unnamed").to_string();

    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .map(|iter| iter.collect())
            .unwrap_or_default();

        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .unwrap_or_default();

        let colors: Option<Vec<[f32; 4]>> = reader
            .read_colors(0)
            .map(|c| c.into_rgba_f32().collect());

        let indices: Option<Vec<u32>> = reader
            .read_indices()
            .map(|idx| idx.into_u32().collect());

        // Primitives without a material get the glTF default, opaque white.
        let base_color = primitive.material().pbr_metallic_roughness().base_color_factor();

        primitives.push(MeshPrimitive {
            positions,
            normals,
            colors,
            indices,
            base_color,
        });
    }

    debug!("Loaded mesh '{}' with {} primitives", name, primitives.len());
    MeshAsset { name, primitives }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let result = load_gltf(Path::new("/nonexistent/model.glb"));
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let result = load_gltf_slice(b"definitely not a glb");
        assert!(matches!(result, Err(AssetError::GltfLoadFailed(_, _))));
    }

    #[test]
    fn gltf_without_meshes_is_empty() {
        let json = br#"{"asset": {"version": "2.0"}, "scenes": [{"nodes": [0]}], "scene": 0, "nodes": [{"name": "empty"}]}"#;
        let result = load_gltf_slice(json);
        assert!(matches!(result, Err(AssetError::Empty(_))));
    }

    #[test]
    fn nested_nodes_keep_hierarchy_and_transforms() {
        // One triangle, base64-embedded: 3 positions of 12 bytes each.
        let json = br#"{
            "asset": {"version": "2.0"},
            "scene": 0,
            "scenes": [{"nodes": [0]}],
            "nodes": [
                {"name": "root", "translation": [1.0, 2.0, 3.0], "children": [1]},
                {"name": "leaf", "mesh": 0}
            ],
            "meshes": [{"name": "tri", "primitives": [{"attributes": {"POSITION": 0}}]}],
            "buffers": [{"byteLength": 36, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"}],
            "bufferViews": [{"buffer": 0, "byteLength": 36}],
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                           "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}]
        }"#;
        let scene = load_gltf_slice(json).unwrap();
        assert_eq!(scene.roots.len(), 1);
        let root = &scene.roots[0];
        assert_eq!(root.transform.position, glam::Vec3::new(1.0, 2.0, 3.0));
        assert!(root.mesh.is_none());
        assert_eq!(root.children[0].name, "leaf");
        assert_eq!(scene.vertex_count(), 3);

        let mesh = root.children[0].mesh.as_ref().unwrap();
        assert_eq!(mesh.base_color(), [1.0; 4]);
    }

    #[test]
    fn material_base_color_is_read() {
        let json = br#"{
            "asset": {"version": "2.0"},
            "scene": 0,
            "scenes": [{"nodes": [0]}],
            "nodes": [{"name": "apple", "mesh": 0}],
            "materials": [{"pbrMetallicRoughness": {"baseColorFactor": [0.8, 0.1, 0.1, 1.0]}}],
            "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "material": 0}]}],
            "buffers": [{"byteLength": 36, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"}],
            "bufferViews": [{"buffer": 0, "byteLength": 36}],
            "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                           "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}]
        }"#;
        let scene = load_gltf_slice(json).unwrap();
        let mesh = scene.roots[0].mesh.as_ref().unwrap();
        assert_eq!(mesh.primitives[0].base_color, [0.8, 0.1, 0.1, 1.0]);
    }
}
