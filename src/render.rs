use crate::camera;
use crate::core::{CameraPose, PlanePose};
use fnv::FnvHashMap;
use web_sys as web;

mod helpers;
mod planes;
pub mod texture;

use planes::{create_plane_resources, PlaneResources, PlaneSlot, PlaneUniforms};
pub use texture::ImagePixels;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("WebGPU is not available in this browser")]
    Unsupported,
    #[error("no WebGPU adapter")]
    NoAdapter,
    #[error("create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}

/// WebGPU renderer for the showcase plane stack.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    planes: PlaneResources,
    slots: Vec<PlaneSlot>,
    placeholder: wgpu::TextureView,
    // Decoded textures by image URL; a URL is uploaded once.
    textures: FnvHashMap<String, wgpu::TextureView>,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

fn webgpu_available() -> bool {
    web::window()
        .map(|w| js_sys::Reflect::has(&w.navigator(), &"gpu".into()).unwrap_or(false))
        .unwrap_or(false)
}

impl GpuState {
    pub async fn new(
        canvas: &web::HtmlCanvasElement,
        plane_count: usize,
    ) -> Result<Self, RenderError> {
        if !webgpu_available() {
            return Err(RenderError::Unsupported);
        }
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("showcase_device"),
                },
                None,
            )
            .await?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::NoAdapter)?;
        // The canvas floats over the page background, so keep it translucent.
        let alpha_mode = caps
            .alpha_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::CompositeAlphaMode::PreMultiplied)
            .or_else(|| caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let planes = create_plane_resources(&device, format);
        let placeholder = texture::upload_rgba(
            &device,
            &queue,
            "placeholder_tex",
            &ImagePixels::placeholder(),
        );
        let slots = (0..plane_count)
            .map(|_| PlaneSlot::new(&device, &planes, &placeholder))
            .collect();
        log::info!(
            "[gpu] webgpu ready format={:?} alpha={:?} planes={}",
            format,
            alpha_mode,
            plane_count
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            planes,
            slots,
            placeholder,
            textures: FnvHashMap::default(),
            width,
            height,
            clear_color: wgpu::Color::TRANSPARENT,
        })
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload decoded pixels for `url` unless they were uploaded before.
    pub fn insert_texture(&mut self, url: &str, pixels: &ImagePixels) {
        if self.textures.contains_key(url) {
            return;
        }
        let view = texture::upload_rgba(&self.device, &self.queue, url, pixels);
        self.textures.insert(url.to_string(), view);
    }

    /// Bind the texture cached for `url` to a plane; a failed load binds
    /// the grey placeholder instead and keeps the plane dim.
    pub fn assign_texture(&mut self, slot: usize, url: &str) {
        let Some(s) = self.slots.get_mut(slot) else {
            return;
        };
        match self.textures.get(url) {
            Some(view) => s.bind_texture(&self.device, &self.planes, view, true),
            None => s.bind_texture(&self.device, &self.planes, &self.placeholder, false),
        }
    }

    /// Draw the planes back to front along `order`.
    pub fn render(
        &mut self,
        poses: &[PlanePose],
        order: &[usize],
        camera: &CameraPose,
        plane_size: [f32; 2],
    ) -> Result<(), RenderError> {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        let view_proj = camera::projection(aspect) * camera.view_matrix();
        for (i, pose) in poses.iter().enumerate() {
            let Some(slot) = self.slots.get(i) else {
                break;
            };
            let u = PlaneUniforms::new(view_proj * pose.model_matrix(plane_size), pose, slot);
            self.queue
                .write_buffer(&slot.uniform_buffer, 0, bytemuck::bytes_of(&u));
        }

        let frame = match self.surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("showcase_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("planes_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.planes.pipeline);
            for &i in order {
                if let Some(slot) = self.slots.get(i) {
                    rpass.set_bind_group(0, &slot.bind_group, &[]);
                    rpass.draw(0..6, 0..1);
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
