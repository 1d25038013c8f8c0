use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::coords::Viewport;
use crate::graph::{CameraUniform, RenderGraph};
use crate::render::{RenderCtx, RenderTarget};

use super::{CapabilityProfile, ContextFactory, DrawingSurface, RenderContext};

/// Format of every drawing buffer created by [`WgpuContextFactory`].
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Context factory backed by wgpu.
///
/// Every context gets its own adapter/device pair; that device is the native
/// slot the platform counts against its limit.
pub struct WgpuContextFactory {
    /// wgpu instance shared by all contexts created here.
    instance: wgpu::Instance,
}

impl WgpuContextFactory {
    pub fn new() -> Self {
        // Use all backends to allow wgpu to select the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        Self { instance }
    }
}

impl Default for WgpuContextFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextFactory for WgpuContextFactory {
    fn create_context(
        &mut self,
        surface: &DrawingSurface,
        profile: &CapabilityProfile,
    ) -> Result<Box<dyn RenderContext>> {
        // Adapter/device acquisition is asynchronous under wgpu.
        let context = pollster::block_on(WgpuContext::new(&self.instance, surface, profile))
            .with_context(|| {
                format!("failed to create rendering context for `{}`", surface.label())
            })?;
        Ok(Box::new(context))
    }
}

/// Set from wgpu's device-lost callback, which may run on any thread.
#[derive(Debug, Clone, Default)]
pub struct DeviceLossFlag(Arc<AtomicBool>);

impl DeviceLossFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Callback for `Device::set_device_lost_callback`.
    pub fn callback(
        &self,
        label: &str,
    ) -> impl Fn(wgpu::DeviceLostReason, String) + Send + 'static {
        let flag = self.clone();
        let label = label.to_string();
        move |reason, message| {
            flag.set();
            log::warn!("device for `{label}` lost ({reason:?}): {message}");
        }
    }
}

/// Offscreen wgpu rendering context.
///
/// Owns:
/// - the logical device + queue (one per context)
/// - the drawing buffer, plus a multisampled target when antialiasing
/// - a camera uniform buffer refreshed on every render
pub struct WgpuContext {
    label: String,
    device: wgpu::Device,
    queue: wgpu::Queue,
    profile: CapabilityProfile,
    size: PhysicalSize<u32>,
    target: Option<FrameTargets>,
    camera: wgpu::Buffer,
    lost: DeviceLossFlag,
}

struct FrameTargets {
    color: wgpu::Texture,
    msaa: Option<wgpu::Texture>,
}

impl FrameTargets {
    fn destroy(&self) {
        self.color.destroy();
        if let Some(msaa) = &self.msaa {
            msaa.destroy();
        }
    }
}

impl WgpuContext {
    async fn new(
        instance: &wgpu::Instance,
        surface: &DrawingSurface,
        profile: &CapabilityProfile,
    ) -> Result<Self> {
        let size = surface.size();
        anyhow::ensure!(
            size.width > 0 && size.height > 0,
            "surface `{}` has zero size",
            surface.label()
        );

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: profile.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        if profile.fail_if_major_performance_caveat {
            let info = adapter.get_info();
            anyhow::ensure!(
                info.device_type != wgpu::DeviceType::Cpu,
                "only a software adapter is available ({})",
                info.name
            );
        }

        let label = surface.label().to_string();
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(&label),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let lost = DeviceLossFlag::default();
        device.set_device_lost_callback(lost.callback(&label));

        let camera = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("halo camera uniform"),
            size: std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let target = Some(create_targets(&device, &label, size, profile.sample_count()));

        log::debug!(
            "context `{label}` bound to {} ({:?}), {}x{}",
            adapter.get_info().name,
            profile.power_preference,
            size.width,
            size.height
        );

        Ok(Self {
            label,
            device,
            queue,
            profile: profile.clone(),
            size,
            target,
            camera,
            lost,
        })
    }
}

fn create_targets(
    device: &wgpu::Device,
    label: &str,
    size: PhysicalSize<u32>,
    sample_count: u32,
) -> FrameTargets {
    let extent = wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    };

    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    let msaa = (sample_count > 1).then(|| {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("halo msaa target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    });

    FrameTargets { color, msaa }
}

impl RenderContext for WgpuContext {
    fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn set_size(&mut self, size: PhysicalSize<u32>) {
        // wgpu cannot create 0x0 textures; keep the old buffer until a real size arrives.
        if size == self.size || size.width == 0 || size.height == 0 || self.lost.is_set() {
            self.size = size;
            return;
        }

        if let Some(old) = self.target.take() {
            old.destroy();
        }
        let sample_count = self.profile.sample_count();
        self.target = Some(create_targets(&self.device, &self.label, size, sample_count));
        self.size = size;
    }

    fn render(&mut self, graph: &RenderGraph) -> Result<()> {
        anyhow::ensure!(!self.lost.is_set(), "context `{}` is lost", self.label);
        let targets = self
            .target
            .as_ref()
            .with_context(|| format!("context `{}` has no drawing buffer", self.label))?;

        let uniform = CameraUniform::from_camera(&graph.camera);
        self.queue.write_buffer(&self.camera, 0, bytemuck::bytes_of(&uniform));

        let color_view = targets.color.create_view(&wgpu::TextureViewDescriptor::default());
        let msaa_view = targets
            .msaa
            .as_ref()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()));

        let (attachment, resolve_target) = match &msaa_view {
            Some(msaa) => (msaa, Some(&color_view)),
            None => (&color_view, None),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("halo frame encoder"),
            });

        let load = if self.profile.preserve_drawing_buffer {
            wgpu::LoadOp::Load
        } else {
            wgpu::LoadOp::Clear(self.profile.effective_clear_color().to_wgpu())
        };

        // Clear pass, dropped before nodes record their own passes.
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("halo clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment,
                    resolve_target,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let rctx = RenderCtx::new(
            &self.device,
            &self.queue,
            TARGET_FORMAT,
            Viewport::new(self.size.width as f32, self.size.height as f32),
            &self.camera,
            self.profile.sample_count(),
        );

        {
            let mut target = RenderTarget::new(&mut encoder, attachment, resolve_target);
            for node in graph.scene.nodes() {
                node.encode(&rctx, &mut target);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        if let Some(targets) = self.target.take() {
            targets.destroy();
        }
        self.camera.destroy();
        Ok(())
    }

    fn force_context_loss(&mut self) -> Result<()> {
        if !self.lost.is_set() {
            self.lost.set();
            self.device.destroy();
        }
        Ok(())
    }

    fn is_context_lost(&self) -> bool {
        self.lost.is_set()
    }
}
