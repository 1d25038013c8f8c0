use super::{PerspectiveCamera, SceneNode};

/// Root list of scene nodes.
#[derive(Default)]
pub struct Scene {
    nodes: Vec<Box<dyn SceneNode>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its index.
    pub fn add(&mut self, node: impl SceneNode + 'static) -> usize {
        self.add_boxed(Box::new(node))
    }

    pub fn add_boxed(&mut self, node: Box<dyn SceneNode>) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Box<dyn SceneNode>] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Box<dyn SceneNode>] {
        &mut self.nodes
    }
}

/// Scene + camera pair driven by one rendering context.
pub struct RenderGraph {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
}

impl RenderGraph {
    pub fn new(scene: Scene, camera: PerspectiveCamera) -> Self {
        Self { scene, camera }
    }

    /// Empty scene viewed through `camera`.
    pub fn empty(camera: PerspectiveCamera) -> Self {
        Self::new(Scene::new(), camera)
    }
}
