use winit::dpi::PhysicalSize;

/// Viewport size in logical pixels.
///
/// Hosts report this on resize; the background slot derives its camera aspect
/// and drawing-buffer size from it.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height. Returns `1.0` for degenerate viewports.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 1.0 }
    }

    /// Drawing-buffer size for this viewport at the given scale factor.
    pub fn physical_size(self, scale_factor: f32) -> PhysicalSize<u32> {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 { scale_factor } else { 1.0 };
        PhysicalSize::new(
            (self.width.max(0.0) * scale).round() as u32,
            (self.height.max(0.0) * scale).round() as u32,
        )
    }
}
