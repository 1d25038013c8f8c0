use anyhow::Result;

/// A GPU-resident allocation a scene node owns.
///
/// Nodes hold resources as `Box<dyn GpuResource>` and hand them to the
/// disposal engine exactly once; implementors need not guard against a second
/// call.
pub trait GpuResource {
    fn release(&mut self) -> Result<()>;
}

impl GpuResource for wgpu::Buffer {
    fn release(&mut self) -> Result<()> {
        self.destroy();
        Ok(())
    }
}

impl GpuResource for wgpu::Texture {
    fn release(&mut self) -> Result<()> {
        self.destroy();
        Ok(())
    }
}

/// Which part of a node a resource belongs to. Used in diagnostics.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceKind {
    Geometry,
    Material,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ResourceKind::Geometry => "geometry",
            ResourceKind::Material => "material",
        })
    }
}
