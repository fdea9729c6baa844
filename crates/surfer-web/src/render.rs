//! WebGPU renderer: scene into an HDR target, then the bloom chain
//! (bright pass, five blur stages, composite) and a final pass that adds
//! bloom and speed lines and tonemaps to the surface.

use glam::{Mat4, Quat, Vec2, Vec3};
use web_sys as web;
use wgpu::util::DeviceExt;

use surfer_core::{
    Camera, SceneModel, AMBIENT_LIGHT, BLOOM_FACTORS, BLOOM_KERNEL_RADII, BLOOM_MIP_COUNT,
    BLOOM_RADIUS, BLOOM_SMOOTH_WIDTH, BLOOM_STRENGTH, BLOOM_THRESHOLD, DIRECTIONAL_LIGHT,
    DIRECTIONAL_LIGHT_DIR, ENV_REFLECTION_STRENGTH, FALLBACK_BACKGROUND, FOG_COLOR, FOG_FAR,
    FOG_NEAR, MAX_TRAIL_PARTICLES, SHIP_SCALE, WORMHOLE1_EMISSIVE, WORMHOLE1_MATERIAL_NAME,
    WORMHOLE2_EMISSIVE, WORMHOLE2_MATERIAL_NAME, WORMHOLE_POSITION, WORMHOLE_SCALE,
};

pub mod helpers;
pub mod targets;

use targets::{RenderTargets, HDR_FORMAT};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    inv_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],   // xyz eye, w time
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    sun: [f32; 4],          // xyz travel direction, w intensity
    fog_color: [f32; 4],    // rgb fog, w ambient
    params: [f32; 4],       // fog near, fog far, env strength
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshUniforms {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    emissive: [f32; 4],  // rgb factor, w intensity
    uv_params: [f32; 4], // xy scrolling offset
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PostUniforms {
    tex_size: [f32; 2],
    direction: [f32; 2],
    kernel_radius: f32,
    sigma: f32,
    threshold: f32,
    smooth_width: f32,
    time: f32,
    scroll_active: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CompositeUniforms {
    params: [f32; 4],       // x strength, y radius
    stages: [[f32; 4]; 5],  // rgb tint, w factor
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

/// One billboard, written straight from the trail arena each frame.
#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialRole {
    /// Ship material carrying an emissive map; intensity tracks scroll state.
    ShipEmissive,
    /// Ship material without a glow; factors pass through unchanged.
    ShipPlain,
    Wormhole1,
    Wormhole2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    Ship,
    Wormhole,
}

struct GpuMesh {
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    index_count: u32,
    uniform_buf: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    role: MaterialRole,
    base_color: [f32; 4],
    emissive_rgb: [f32; 3],
    // textures are only referenced by the bind group; hold them alive
    #[allow(dead_code)]
    textures: Vec<wgpu::Texture>,
}

/// Everything the renderer needs from the frame driver for one frame.
pub struct FrameInputs<'a> {
    pub fov_deg: f32,
    pub time: f32,
    /// Normalized acceleration intensity in [0, 1]; drives the speed lines.
    pub scroll_active: f32,
    pub ship_position: Vec3,
    pub ship_rotation: Quat,
    pub ship_emissive: f32,
    pub wormhole_uv: [Vec2; 2],
    pub particles: &'a [ParticleInstance],
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    width: u32,
    height: u32,

    targets: RenderTargets,
    linear_sampler: wgpu::Sampler,
    repeat_sampler: wgpu::Sampler,

    scene_bgl: wgpu::BindGroupLayout,
    mesh_bgl: wgpu::BindGroupLayout,
    post_bgl0: wgpu::BindGroupLayout,
    post_bgl1: wgpu::BindGroupLayout,
    composite_bgl: wgpu::BindGroupLayout,

    globals_buf: wgpu::Buffer,
    scene_bg: wgpu::BindGroup,
    #[allow(dead_code)]
    env_tex: wgpu::Texture,
    env_view: wgpu::TextureView,

    sky_pipeline: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    final_pipeline: wgpu::RenderPipeline,

    bright_uniform: wgpu::Buffer,
    /// One buffer per blur stage and direction, indexed `stage * 2 + dir`.
    /// Written only at init and resize so no pass sees another's values.
    blur_uniforms: Vec<wgpu::Buffer>,
    final_uniform: wgpu::Buffer,
    composite_buf: wgpu::Buffer,

    bright_bg: wgpu::BindGroup,
    blur_bgs: Vec<wgpu::BindGroup>,
    final_bg0: wgpu::BindGroup,
    final_bg1: wgpu::BindGroup,
    composite_bg: wgpu::BindGroup,

    particle_vb: wgpu::Buffer,
    ship_meshes: Vec<GpuMesh>,
    wormhole_meshes: Vec<GpuMesh>,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width();
        let height = canvas.height();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits keep older WebGPU implementations happy
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

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
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, width, height);

        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        // Repeat for scrolling wormhole textures and the equirect wrap seam
        let repeat_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("repeat_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // ---------------- Scene resources ----------------

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(surfer_core::SCENE_WGSL.into()),
        });
        let scene_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
        let mesh_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let globals_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Flat dark backdrop doubling as the reflection source until the
        // HDR environment arrives.
        let (env_tex, env_view) = helpers::solid_equirect_texture(
            &device,
            &queue,
            "env_fallback",
            FALLBACK_BACKGROUND,
        );
        let scene_bg = make_scene_bind_group(
            &device,
            &scene_bgl,
            &globals_buf,
            &env_view,
            &repeat_sampler,
        );

        let scene_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&scene_bgl],
            push_constant_ranges: &[],
        });
        let mesh_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pl"),
            bind_group_layouts: &[&scene_bgl, &mesh_bgl],
            push_constant_ranges: &[],
        });

        let depth_write = |write: bool, compare: wgpu::CompareFunction| wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: write,
            depth_compare: compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let sky_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky_pipeline"),
            layout: Some(&scene_pl),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_sky"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(depth_write(false, wgpu::CompareFunction::Always)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_sky"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let mesh_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 24,
                    shader_location: 2,
                },
            ],
        };
        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&mesh_pl),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_mesh"),
                buffers: &[mesh_vertex_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(depth_write(true, wgpu::CompareFunction::Less)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_mesh"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let particle_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 12,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 16,
                    shader_location: 2,
                },
            ],
        };
        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particle_pipeline"),
            layout: Some(&scene_pl),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_particle"),
                buffers: &[particle_layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(depth_write(false, wgpu::CompareFunction::Less)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_particle"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    // premultiplied additive
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        // ---------------- Post chain ----------------

        let post_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(surfer_core::POST_WGSL.into()),
        });
        let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom_composite_shader"),
            source: wgpu::ShaderSource::Wgsl(surfer_core::BLOOM_COMPOSITE_WGSL.into()),
        });

        let post_bgl0 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl0"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let post_bgl1 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl1"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let mut composite_entries = Vec::new();
        for binding in 0..BLOOM_MIP_COUNT as u32 {
            composite_entries.push(wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            });
        }
        composite_entries.push(wgpu::BindGroupLayoutEntry {
            binding: 5,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        composite_entries.push(wgpu::BindGroupLayoutEntry {
            binding: 6,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        let composite_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite_bgl"),
            entries: &composite_entries,
        });

        let post_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post_pl"),
            bind_group_layouts: &[&post_bgl0],
            push_constant_ranges: &[],
        });
        let final_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("final_pl"),
            bind_group_layouts: &[&post_bgl0, &post_bgl1],
            push_constant_ranges: &[],
        });
        let composite_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("composite_pl"),
            bind_group_layouts: &[&composite_bgl],
            push_constant_ranges: &[],
        });

        let bright_pipeline = helpers::make_post_pipeline(
            &device,
            "bright_pipeline",
            &post_pl,
            &post_shader,
            "fs_bright",
            HDR_FORMAT,
            None,
        );
        let blur_pipeline = helpers::make_post_pipeline(
            &device,
            "blur_pipeline",
            &post_pl,
            &post_shader,
            "fs_blur",
            HDR_FORMAT,
            None,
        );
        let composite_pipeline = helpers::make_post_pipeline(
            &device,
            "composite_pipeline",
            &composite_pl,
            &composite_shader,
            "fs_composite",
            HDR_FORMAT,
            None,
        );
        let final_pipeline = helpers::make_post_pipeline(
            &device,
            "final_pipeline",
            &final_pl,
            &post_shader,
            "fs_final",
            format,
            Some(wgpu::BlendState::REPLACE),
        );

        let make_uniform = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<PostUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let bright_uniform = make_uniform("bright_uniform");
        let final_uniform = make_uniform("final_uniform");
        let blur_uniforms: Vec<wgpu::Buffer> = (0..BLOOM_MIP_COUNT * 2)
            .map(|i| make_uniform(&format!("blur_uniform_{i}")))
            .collect();

        let composite = CompositeUniforms {
            params: [BLOOM_STRENGTH, BLOOM_RADIUS, 0.0, 0.0],
            stages: BLOOM_FACTORS.map(|f| [1.0, 1.0, 1.0, f]),
        };
        let composite_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("composite_uniform"),
            contents: bytemuck::bytes_of(&composite),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let particle_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_instances"),
            size: (MAX_TRAIL_PARTICLES * std::mem::size_of::<ParticleInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let post_bgs = build_post_bind_groups(
            &device,
            &post_bgl0,
            &post_bgl1,
            &composite_bgl,
            &targets,
            &linear_sampler,
            &bright_uniform,
            &blur_uniforms,
            &final_uniform,
            &composite_buf,
        );

        let state = Self {
            surface,
            device,
            queue,
            config,
            width: width.max(1),
            height: height.max(1),
            targets,
            linear_sampler,
            repeat_sampler,
            scene_bgl,
            mesh_bgl,
            post_bgl0,
            post_bgl1,
            composite_bgl,
            globals_buf,
            scene_bg,
            env_tex,
            env_view,
            sky_pipeline,
            mesh_pipeline,
            particle_pipeline,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            final_pipeline,
            bright_uniform,
            blur_uniforms,
            final_uniform,
            composite_buf,
            bright_bg: post_bgs.bright,
            blur_bgs: post_bgs.blur,
            final_bg0: post_bgs.final0,
            final_bg1: post_bgs.final1,
            composite_bg: post_bgs.composite,
            particle_vb,
            ship_meshes: Vec::new(),
            wormhole_meshes: Vec::new(),
        };
        state.write_static_post_uniforms();
        Ok(state)
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
            self.targets = RenderTargets::new(&self.device, width, height);
            self.write_static_post_uniforms();
            self.rebuild_post_bind_groups();
        }
    }

    /// Upload a parsed model. Ship materials with an emissive map glow with
    /// scroll intensity; wormhole materials are matched by name and get their
    /// fixed intensities and scrolling UVs.
    pub fn install_model(&mut self, model: &SceneModel, kind: ModelKind) {
        let mut meshes = Vec::with_capacity(model.meshes.len());
        for (i, mesh) in model.meshes.iter().enumerate() {
            if mesh.indices.is_empty() || mesh.positions.is_empty() {
                continue;
            }
            let role = match kind {
                ModelKind::Wormhole => {
                    if mesh.material_name == WORMHOLE2_MATERIAL_NAME {
                        MaterialRole::Wormhole2
                    } else if mesh.material_name == WORMHOLE1_MATERIAL_NAME {
                        MaterialRole::Wormhole1
                    } else {
                        log::warn!(
                            "[render] unmatched wormhole material {:?}, treating as layer 1",
                            mesh.material_name
                        );
                        MaterialRole::Wormhole1
                    }
                }
                ModelKind::Ship => {
                    if mesh.has_emissive_map() {
                        MaterialRole::ShipEmissive
                    } else {
                        MaterialRole::ShipPlain
                    }
                }
            };

            let vertices: Vec<MeshVertex> = mesh
                .positions
                .iter()
                .enumerate()
                .map(|(v, &position)| MeshVertex {
                    position,
                    normal: mesh.normals.get(v).copied().unwrap_or([0.0, 1.0, 0.0]),
                    uv: mesh.uvs.get(v).copied().unwrap_or([0.0, 0.0]),
                })
                .collect();
            let vertex_buf = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("mesh_vb_{i}")),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buf = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("mesh_ib_{i}")),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

            let white = surfer_core::TextureData::white_1x1();
            let base_data = mesh
                .base_color_image
                .and_then(|idx| model.images.get(idx))
                .unwrap_or(&white);
            let emissive_data = mesh
                .emissive_image
                .and_then(|idx| model.images.get(idx))
                .unwrap_or(&white);
            let (base_tex, base_view) = helpers::upload_rgba8_texture(
                &self.device,
                &self.queue,
                &format!("mesh_base_{i}"),
                base_data,
            );
            let (emissive_tex, emissive_view) = helpers::upload_rgba8_texture(
                &self.device,
                &self.queue,
                &format!("mesh_emissive_{i}"),
                emissive_data,
            );

            let uniform_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("mesh_uniforms_{i}")),
                size: std::mem::size_of::<MeshUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("mesh_bg_{i}")),
                layout: &self.mesh_bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buf.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&base_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&emissive_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&self.repeat_sampler),
                    },
                ],
            });

            // Exporters often leave the factor black when a map carries the
            // emissive color; treat that as white so the map shows through.
            let emissive_rgb = if mesh.has_emissive_map() && mesh.emissive_factor == [0.0; 3] {
                [1.0, 1.0, 1.0]
            } else {
                mesh.emissive_factor
            };

            meshes.push(GpuMesh {
                vertex_buf,
                index_buf,
                index_count: mesh.indices.len() as u32,
                uniform_buf,
                bind_group,
                role,
                base_color: mesh.base_color_factor,
                emissive_rgb,
                textures: vec![base_tex, emissive_tex],
            });
        }
        match kind {
            ModelKind::Ship => self.ship_meshes = meshes,
            ModelKind::Wormhole => self.wormhole_meshes = meshes,
        }
    }

    /// Swap the fallback environment for the decoded HDR.
    pub fn install_env(&mut self, image: &surfer_core::EquirectImage) {
        let (tex, view) =
            helpers::upload_equirect_texture(&self.device, &self.queue, "env_hdr", image);
        self.env_tex = tex;
        self.env_view = view;
        self.scene_bg = make_scene_bind_group(
            &self.device,
            &self.scene_bgl,
            &self.globals_buf,
            &self.env_view,
            &self.repeat_sampler,
        );
    }

    pub fn render(&mut self, inputs: &FrameInputs) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // All uniform writes land before submit; nothing below is written
        // twice, so every pass sees exactly the value meant for it.
        self.write_globals(inputs);
        self.write_mesh_uniforms(inputs);
        let final_post = PostUniforms {
            tex_size: [self.width as f32, self.height as f32],
            time: inputs.time,
            scroll_active: inputs.scroll_active.clamp(0.0, 1.0),
            ..zero_post()
        };
        self.queue
            .write_buffer(&self.final_uniform, 0, bytemuck::bytes_of(&final_post));
        let particle_count = inputs.particles.len().min(MAX_TRAIL_PARTICLES);
        if particle_count > 0 {
            self.queue.write_buffer(
                &self.particle_vb,
                0,
                bytemuck::cast_slice(&inputs.particles[..particle_count]),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.hdr.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rpass.set_pipeline(&self.sky_pipeline);
            rpass.set_bind_group(0, &self.scene_bg, &[]);
            rpass.draw(0..3, 0..1);

            rpass.set_pipeline(&self.mesh_pipeline);
            for mesh in self.wormhole_meshes.iter().chain(self.ship_meshes.iter()) {
                rpass.set_bind_group(1, &mesh.bind_group, &[]);
                rpass.set_vertex_buffer(0, mesh.vertex_buf.slice(..));
                rpass.set_index_buffer(mesh.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if particle_count > 0 {
                rpass.set_pipeline(&self.particle_pipeline);
                rpass.set_vertex_buffer(0, self.particle_vb.slice(..));
                rpass.draw(0..6, 0..particle_count as u32);
            }
        }

        // Bright pass: HDR scene -> bright
        self.blit(
            &mut encoder,
            "bright_pass",
            &self.targets.bright.view,
            &self.bright_pipeline,
            &self.bright_bg,
            None,
        );

        // Five chained blur stages; stage i reads the previous stage's
        // vertical result (stage 0 reads the bright target).
        for stage in 0..BLOOM_MIP_COUNT {
            self.blit(
                &mut encoder,
                "blur_h",
                &self.targets.ping.view,
                &self.blur_pipeline,
                &self.blur_bgs[stage * 2],
                None,
            );
            self.blit(
                &mut encoder,
                "blur_v",
                &self.targets.blur[stage].view,
                &self.blur_pipeline,
                &self.blur_bgs[stage * 2 + 1],
                None,
            );
        }

        // Composite the five stages into the bright target (free again by now)
        self.blit(
            &mut encoder,
            "bloom_composite",
            &self.targets.bright.view,
            &self.composite_pipeline,
            &self.composite_bg,
            None,
        );

        // Final pass: bloom add + speed lines + tonemap to the surface
        self.blit(
            &mut encoder,
            "final_pass",
            &surface_view,
            &self.final_pipeline,
            &self.final_bg0,
            Some(&self.final_bg1),
        );

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn write_globals(&self, inputs: &FrameInputs) {
        let aspect = self.width as f32 / self.height.max(1) as f32;
        let mut camera = Camera::new(aspect);
        camera.fov_deg = inputs.fov_deg;
        let view_proj = camera.view_proj();
        let sun_dir = -Vec3::from_array(DIRECTIONAL_LIGHT_DIR).normalize();
        let globals = Globals {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_pos: [
                camera.position.x,
                camera.position.y,
                camera.position.z,
                inputs.time,
            ],
            camera_right: camera.right().extend(0.0).to_array(),
            camera_up: camera.up().extend(0.0).to_array(),
            sun: [sun_dir.x, sun_dir.y, sun_dir.z, DIRECTIONAL_LIGHT],
            fog_color: [FOG_COLOR[0], FOG_COLOR[1], FOG_COLOR[2], AMBIENT_LIGHT],
            params: [FOG_NEAR, FOG_FAR, ENV_REFLECTION_STRENGTH, 0.0],
        };
        self.queue
            .write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&globals));
    }

    fn write_mesh_uniforms(&self, inputs: &FrameInputs) {
        let ship_model = Mat4::from_scale_rotation_translation(
            Vec3::splat(SHIP_SCALE),
            inputs.ship_rotation,
            inputs.ship_position,
        );
        let wormhole_model = Mat4::from_scale_rotation_translation(
            Vec3::splat(WORMHOLE_SCALE),
            Quat::IDENTITY,
            Vec3::from_array(WORMHOLE_POSITION),
        );
        for mesh in self.ship_meshes.iter().chain(self.wormhole_meshes.iter()) {
            let (model, intensity, uv_offset) = match mesh.role {
                MaterialRole::ShipEmissive => (ship_model, inputs.ship_emissive, Vec2::ZERO),
                MaterialRole::ShipPlain => (ship_model, 1.0, Vec2::ZERO),
                MaterialRole::Wormhole1 => {
                    (wormhole_model, WORMHOLE1_EMISSIVE, inputs.wormhole_uv[0])
                }
                MaterialRole::Wormhole2 => {
                    (wormhole_model, WORMHOLE2_EMISSIVE, inputs.wormhole_uv[1])
                }
            };
            let u = MeshUniforms {
                model: model.to_cols_array_2d(),
                base_color: mesh.base_color,
                emissive: [
                    mesh.emissive_rgb[0],
                    mesh.emissive_rgb[1],
                    mesh.emissive_rgb[2],
                    intensity,
                ],
                uv_params: [uv_offset.x, uv_offset.y, 0.0, 0.0],
            };
            self.queue
                .write_buffer(&mesh.uniform_buf, 0, bytemuck::bytes_of(&u));
        }
    }

    /// Bright and blur parameters only depend on target size; write them
    /// once here instead of between passes.
    fn write_static_post_uniforms(&self) {
        let tex_size = [self.width as f32, self.height as f32];
        let bright = PostUniforms {
            tex_size,
            threshold: BLOOM_THRESHOLD,
            smooth_width: BLOOM_SMOOTH_WIDTH,
            ..zero_post()
        };
        self.queue
            .write_buffer(&self.bright_uniform, 0, bytemuck::bytes_of(&bright));
        for stage in 0..BLOOM_MIP_COUNT {
            let radius = BLOOM_KERNEL_RADII[stage] as f32;
            for dir in 0..2 {
                let blur = PostUniforms {
                    tex_size,
                    direction: if dir == 0 { [1.0, 0.0] } else { [0.0, 1.0] },
                    kernel_radius: radius,
                    sigma: radius,
                    ..zero_post()
                };
                self.queue.write_buffer(
                    &self.blur_uniforms[stage * 2 + dir],
                    0,
                    bytemuck::bytes_of(&blur),
                );
            }
        }
    }

    fn rebuild_post_bind_groups(&mut self) {
        let bgs = build_post_bind_groups(
            &self.device,
            &self.post_bgl0,
            &self.post_bgl1,
            &self.composite_bgl,
            &self.targets,
            &self.linear_sampler,
            &self.bright_uniform,
            &self.blur_uniforms,
            &self.final_uniform,
            &self.composite_buf,
        );
        self.bright_bg = bgs.bright;
        self.blur_bgs = bgs.blur;
        self.final_bg0 = bgs.final0;
        self.final_bg1 = bgs.final1;
        self.composite_bg = bgs.composite;
    }

    fn blit(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        target: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        bg0: &wgpu::BindGroup,
        bg1: Option<&wgpu::BindGroup>,
    ) {
        let mut r = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        r.set_pipeline(pipeline);
        r.set_bind_group(0, bg0, &[]);
        if let Some(g1) = bg1 {
            r.set_bind_group(1, g1, &[]);
        }
        r.draw(0..3, 0..1);
    }
}

struct PostBindGroups {
    bright: wgpu::BindGroup,
    blur: Vec<wgpu::BindGroup>,
    final0: wgpu::BindGroup,
    final1: wgpu::BindGroup,
    composite: wgpu::BindGroup,
}

#[allow(clippy::too_many_arguments)]
fn build_post_bind_groups(
    device: &wgpu::Device,
    post_bgl0: &wgpu::BindGroupLayout,
    post_bgl1: &wgpu::BindGroupLayout,
    composite_bgl: &wgpu::BindGroupLayout,
    targets: &RenderTargets,
    sampler: &wgpu::Sampler,
    bright_uniform: &wgpu::Buffer,
    blur_uniforms: &[wgpu::Buffer],
    final_uniform: &wgpu::Buffer,
    composite_buf: &wgpu::Buffer,
) -> PostBindGroups {
    let bg0 = |view: &wgpu::TextureView, uniform: &wgpu::Buffer, label: &str| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: post_bgl0,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
            ],
        })
    };

    let bright = bg0(&targets.hdr.view, bright_uniform, "bright_bg");
    let mut blur = Vec::with_capacity(BLOOM_MIP_COUNT * 2);
    for stage in 0..BLOOM_MIP_COUNT {
        let h_input = if stage == 0 {
            &targets.bright.view
        } else {
            &targets.blur[stage - 1].view
        };
        blur.push(bg0(h_input, &blur_uniforms[stage * 2], "blur_h_bg"));
        blur.push(bg0(
            &targets.ping.view,
            &blur_uniforms[stage * 2 + 1],
            "blur_v_bg",
        ));
    }
    let final0 = bg0(&targets.hdr.view, final_uniform, "final_bg0");
    let final1 = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("final_bg1"),
        layout: post_bgl1,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&targets.bright.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    let mut entries = Vec::new();
    for (binding, target) in targets.blur.iter().enumerate() {
        entries.push(wgpu::BindGroupEntry {
            binding: binding as u32,
            resource: wgpu::BindingResource::TextureView(&target.view),
        });
    }
    entries.push(wgpu::BindGroupEntry {
        binding: 5,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    entries.push(wgpu::BindGroupEntry {
        binding: 6,
        resource: composite_buf.as_entire_binding(),
    });
    let composite = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("composite_bg"),
        layout: composite_bgl,
        entries: &entries,
    });

    PostBindGroups {
        bright,
        blur,
        final0,
        final1,
        composite,
    }
}

fn make_scene_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    globals: &wgpu::Buffer,
    env_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("scene_bg"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: globals.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(env_view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn zero_post() -> PostUniforms {
    PostUniforms {
        tex_size: [0.0, 0.0],
        direction: [0.0, 0.0],
        kernel_radius: 0.0,
        sigma: 1.0,
        threshold: 0.0,
        smooth_width: 0.0,
        time: 0.0,
        scroll_active: 0.0,
        _pad: [0.0, 0.0],
    }
}
