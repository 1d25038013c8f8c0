use crate::paint::Color;

/// Capability flags a rendering context is created with.
///
/// Two presets exist, [`CapabilityProfile::background`] and
/// [`CapabilityProfile::beacon`]; hosts may tweak a copy of either through
/// `PoolConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityProfile {
    /// Multisampled color target (4 samples) resolved into the drawing buffer.
    pub antialias: bool,

    /// Drawing buffer carries alpha; the clear color's alpha is honored.
    pub alpha: bool,

    /// Adapter selection hint.
    pub power_preference: wgpu::PowerPreference,

    /// Keep the previous frame's contents instead of clearing each frame.
    pub preserve_drawing_buffer: bool,

    /// Refuse software/fallback adapters.
    pub fail_if_major_performance_caveat: bool,

    /// Clear color for every frame when the buffer is not preserved.
    pub clear_color: Color,
}

impl CapabilityProfile {
    /// Full-screen shared context: antialiased, high-performance, opaque black clear.
    pub fn background() -> Self {
        Self {
            antialias: true,
            alpha: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            preserve_drawing_buffer: false,
            fail_if_major_performance_caveat: false,
            clear_color: Color::opaque_black(),
        }
    }

    /// Small per-widget context: no antialiasing, low power, transparent clear.
    pub fn beacon() -> Self {
        Self {
            antialias: false,
            alpha: true,
            power_preference: wgpu::PowerPreference::LowPower,
            preserve_drawing_buffer: false,
            fail_if_major_performance_caveat: false,
            clear_color: Color::transparent(),
        }
    }

    #[inline]
    pub fn sample_count(&self) -> u32 {
        if self.antialias { 4 } else { 1 }
    }

    /// Clear color as it will be written to the drawing buffer.
    #[inline]
    pub fn effective_clear_color(&self) -> Color {
        if self.alpha { self.clear_color } else { self.clear_color.opaque() }
    }
}
