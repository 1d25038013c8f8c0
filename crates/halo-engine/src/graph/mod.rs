//! Render graphs.
//!
//! A render graph is the scene/camera pair one context draws. The pool treats
//! its contents as opaque apart from the [`SceneNode`] capability used to
//! release GPU resources deterministically.

mod camera;
mod node;
mod resource;
mod scene;

pub use camera::{CameraUniform, PerspectiveCamera};
pub use node::{Group, Materials, Mesh, SceneNode};
pub use resource::{GpuResource, ResourceKind};
pub use scene::{RenderGraph, Scene};
