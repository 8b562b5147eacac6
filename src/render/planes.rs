use super::helpers::make_plane_pipeline;
use crate::core::{PlanePose, PLACEHOLDER_OPACITY};
use glam::Mat4;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct PlaneUniforms {
    pub(crate) mvp: [[f32; 4]; 4],
    // opacity, emissive, has_texture, unused
    pub(crate) params: [f32; 4],
}

impl PlaneUniforms {
    pub(crate) fn new(mvp: Mat4, pose: &PlanePose, slot: &PlaneSlot) -> Self {
        let opacity = if slot.has_texture {
            pose.opacity
        } else {
            pose.opacity.min(PLACEHOLDER_OPACITY)
        };
        Self {
            mvp: mvp.to_cols_array_2d(),
            params: [
                opacity.clamp(0.0, 1.0),
                pose.emissive,
                if slot.has_texture { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

pub(crate) struct PlaneResources {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) bgl: wgpu::BindGroupLayout,
    pub(crate) sampler: wgpu::Sampler,
}

pub(crate) fn create_plane_resources(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
) -> PlaneResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("planes_shader"),
        source: wgpu::ShaderSource::Wgsl(crate::core::PLANES_WGSL.into()),
    });
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("planes_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("planes_pl"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let pipeline = make_plane_pipeline(
        device,
        &pl,
        &shader,
        color_format,
        Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
    );
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("planes_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });
    PlaneResources {
        pipeline,
        bgl,
        sampler,
    }
}

/// Per-plane uniform buffer and bind group.
pub(crate) struct PlaneSlot {
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    pub(crate) has_texture: bool,
}

impl PlaneSlot {
    pub(crate) fn new(
        device: &wgpu::Device,
        res: &PlaneResources,
        placeholder: &wgpu::TextureView,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("plane_uniforms"),
            size: std::mem::size_of::<PlaneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = make_bind_group(device, res, &uniform_buffer, placeholder);
        Self {
            uniform_buffer,
            bind_group,
            has_texture: false,
        }
    }

    pub(crate) fn bind_texture(
        &mut self,
        device: &wgpu::Device,
        res: &PlaneResources,
        view: &wgpu::TextureView,
        has_texture: bool,
    ) {
        self.bind_group = make_bind_group(device, res, &self.uniform_buffer, view);
        self.has_texture = has_texture;
    }
}

fn make_bind_group(
    device: &wgpu::Device,
    res: &PlaneResources,
    uniform_buffer: &wgpu::Buffer,
    view: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("plane_bg"),
        layout: &res.bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&res.sampler),
            },
        ],
    })
}
