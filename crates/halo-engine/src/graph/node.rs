use crate::dispose::ReleaseReport;
use crate::render::{RenderCtx, RenderTarget};

use super::{GpuResource, ResourceKind};

/// A node in a render graph.
///
/// Every node type states explicitly which GPU resources it owns; the disposal
/// engine walks the graph through [`for_each_child`](Self::for_each_child) and
/// calls [`release_gpu_resources`](Self::release_gpu_resources) once per node.
pub trait SceneNode {
    fn name(&self) -> &str;

    /// Hands every owned GPU resource to `report`. Called once per disposal.
    fn release_gpu_resources(&mut self, report: &mut ReleaseReport);

    /// Visits direct children. Leaves keep the default.
    fn for_each_child(&mut self, _visit: &mut dyn FnMut(&mut dyn SceneNode)) {}

    /// Records draw commands for the current frame.
    fn encode(&self, _ctx: &RenderCtx<'_>, _target: &mut RenderTarget<'_>) {}
}

/// Material slot of a mesh: nothing, one material, or an ordered list.
#[derive(Default)]
pub enum Materials {
    #[default]
    None,
    Single(Box<dyn GpuResource>),
    List(Vec<Box<dyn GpuResource>>),
}

impl Materials {
    pub fn len(&self) -> usize {
        match self {
            Materials::None => 0,
            Materials::Single(_) => 1,
            Materials::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves every material out, leaving `None` behind.
    pub fn take(&mut self) -> Vec<Box<dyn GpuResource>> {
        match std::mem::take(self) {
            Materials::None => Vec::new(),
            Materials::Single(m) => vec![m],
            Materials::List(list) => list,
        }
    }
}

type EncodeFn = Box<dyn Fn(&RenderCtx<'_>, &mut RenderTarget<'_>)>;

/// Drawable leaf: optional geometry plus its materials.
///
/// How the mesh is drawn is up to the caller's encode hook.
pub struct Mesh {
    name: String,
    geometry: Option<Box<dyn GpuResource>>,
    materials: Materials,
    encode: Option<EncodeFn>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry: None,
            materials: Materials::None,
            encode: None,
        }
    }

    pub fn with_geometry(mut self, geometry: impl GpuResource + 'static) -> Self {
        self.geometry = Some(Box::new(geometry));
        self
    }

    /// Adds a material. A second call turns the slot into an ordered list.
    pub fn with_material(mut self, material: impl GpuResource + 'static) -> Self {
        let material: Box<dyn GpuResource> = Box::new(material);
        self.materials = match std::mem::take(&mut self.materials) {
            Materials::None => Materials::Single(material),
            Materials::Single(first) => Materials::List(vec![first, material]),
            Materials::List(mut list) => {
                list.push(material);
                Materials::List(list)
            }
        };
        self
    }

    pub fn with_encode(
        mut self,
        encode: impl Fn(&RenderCtx<'_>, &mut RenderTarget<'_>) + 'static,
    ) -> Self {
        self.encode = Some(Box::new(encode));
        self
    }

    pub fn materials(&self) -> &Materials {
        &self.materials
    }

    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    /// True once the disposal engine has taken this mesh's resources.
    pub fn is_released(&self) -> bool {
        self.geometry.is_none() && self.materials.is_empty()
    }
}

impl SceneNode for Mesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn release_gpu_resources(&mut self, report: &mut ReleaseReport) {
        if let Some(mut geometry) = self.geometry.take() {
            report.release(&self.name, ResourceKind::Geometry, geometry.as_mut());
        }
        for mut material in self.materials.take() {
            report.release(&self.name, ResourceKind::Material, material.as_mut());
        }
    }

    fn encode(&self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if let Some(encode) = &self.encode {
            encode(ctx, target);
        }
    }
}

/// Interior node grouping children. Owns no GPU resources itself.
pub struct Group {
    name: String,
    children: Vec<Box<dyn SceneNode>>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), children: Vec::new() }
    }

    pub fn with_child(mut self, child: impl SceneNode + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn push(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl SceneNode for Group {
    fn name(&self) -> &str {
        &self.name
    }

    fn release_gpu_resources(&mut self, _report: &mut ReleaseReport) {}

    fn for_each_child(&mut self, visit: &mut dyn FnMut(&mut dyn SceneNode)) {
        for child in &mut self.children {
            visit(child.as_mut());
        }
    }

    fn encode(&self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        for child in &self.children {
            child.encode(ctx, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingResource;

    #[test]
    fn with_material_grows_into_a_list() {
        let mesh = Mesh::new("m").with_material(CountingResource::default());
        assert!(matches!(mesh.materials(), Materials::Single(_)));

        let mesh = mesh.with_material(CountingResource::default());
        assert!(matches!(mesh.materials(), Materials::List(l) if l.len() == 2));
    }

    #[test]
    fn take_empties_the_slot() {
        let mut materials = Materials::Single(Box::new(CountingResource::default()));
        assert_eq!(materials.take().len(), 1);
        assert!(materials.is_empty());
        assert!(materials.take().is_empty());
    }

    #[test]
    fn group_visits_direct_children_only() {
        let mut group = Group::new("outer")
            .with_child(Mesh::new("a"))
            .with_child(Group::new("inner").with_child(Mesh::new("deep")));

        let mut names = Vec::new();
        group.for_each_child(&mut |child| names.push(child.name().to_string()));
        assert_eq!(names, vec!["a", "inner"]);
    }
}
