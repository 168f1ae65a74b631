//! The loaded model as a node tree, with its framing and surface state

use depthify_assets::{MeshAsset, NodeAsset, SceneAsset};
use depthify_core::{Color, Transform};
use glam::Mat4;

use crate::bounds::Aabb;
use crate::framing::Framing;

/// Surface state of one renderable mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub wireframe: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            wireframe: false,
        }
    }
}

/// A mesh together with the material it is drawn with
#[derive(Debug, Clone)]
pub struct RenderMesh {
    pub mesh: MeshAsset,
    pub material: Material,
}

/// One node of the model's hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub local: Transform,
    pub mesh: Option<RenderMesh>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    fn from_asset(node: NodeAsset) -> Self {
        Self {
            name: node.name,
            local: node.transform,
            mesh: node.mesh.map(|mesh| RenderMesh {
                material: Material {
                    color: Color::from_array(mesh.base_color()),
                    ..Material::default()
                },
                mesh,
            }),
            children: node.children.into_iter().map(SceneNode::from_asset).collect(),
        }
    }

    fn visit<'a>(&'a self, parent: Mat4, f: &mut impl FnMut(&'a RenderMesh, Mat4)) {
        let world = parent * self.local.matrix();
        if let Some(mesh) = &self.mesh {
            f(mesh, world);
        }
        for child in &self.children {
            child.visit(world, f);
        }
    }

    fn visit_mut(&mut self, f: &mut impl FnMut(&mut RenderMesh)) {
        if let Some(mesh) = &mut self.mesh {
            f(mesh);
        }
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }
}

/// The model currently shown by the viewer. Recreated on every load.
#[derive(Debug, Clone)]
pub struct ViewerScene {
    pub name: String,
    /// Model transform: framing plus any auto-rotation
    pub transform: Transform,
    framing: Framing,
    roots: Vec<SceneNode>,
}

impl ViewerScene {
    /// Build a scene from a loaded asset and frame it into the viewport
    pub fn from_asset(asset: SceneAsset) -> Self {
        let mut scene = Self {
            name: asset.name,
            transform: Transform::default(),
            framing: Framing::default(),
            roots: asset.roots.into_iter().map(SceneNode::from_asset).collect(),
        };
        if let Some(bounds) = scene.bounds() {
            scene.framing = Framing::for_bounds(&bounds);
            scene.transform = scene.framing.transform();
        }
        scene
    }

    /// The framing applied at load time
    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn roots(&self) -> &[SceneNode] {
        &self.roots
    }

    /// Visit every mesh with its world matrix, nested nodes included
    pub fn for_each_mesh<'a>(&'a self, mut f: impl FnMut(&'a RenderMesh, Mat4)) {
        let model = self.transform.matrix();
        for root in &self.roots {
            root.visit(model, &mut f);
        }
    }

    /// Visit every mesh mutably, nested nodes included
    pub fn for_each_mesh_mut(&mut self, mut f: impl FnMut(&mut RenderMesh)) {
        for root in &mut self.roots {
            root.visit_mut(&mut f);
        }
    }

    /// World-space bounds of the model under its current transform
    pub fn bounds(&self) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        self.for_each_mesh(|render_mesh, world| {
            for primitive in &render_mesh.mesh.primitives {
                if let Some(b) = Aabb::from_transformed(&primitive.positions, world) {
                    bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
                }
            }
        });
        bounds
    }

    /// Apply the wireframe flag to every surface
    pub fn apply_wireframe(&mut self, wireframe: bool) {
        self.for_each_mesh_mut(|mesh| mesh.material.wireframe = wireframe);
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.for_each_mesh(|_, _| count += 1);
        count
    }
}
