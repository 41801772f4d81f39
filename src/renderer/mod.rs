//! GPU rendering pipeline using wgpu.
//!
//! This module provides the [`Renderer`] struct which handles:
//! - wgpu device and surface initialization
//! - Shader compilation and pipeline setup
//! - Lazy upload of cached meshes and placeholder textures
//! - Per-draw uniforms through a dynamic-offset buffer

pub mod camera;

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::geometry::{GeometryError, MeshCache, MeshKey, Vertex};
use crate::scene::graph::DrawCommand;
use crate::scene::textures::{procedural_texels, TextureName, TEXTURE_SIZE};
use crate::scene::{Frame, SceneState};
use crate::ui::Ui;
pub use camera::{Camera, Projection};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Surface(#[from] wgpu::SurfaceError),
    #[error("Failed to compose frame: {0}")]
    Geometry(#[from] GeometryError),
}

/// Lighting configuration: a directional sun plus a positional fill light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingConfig {
    /// Sun direction (normalized, pointing toward light)
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    /// World-space position of the fill light
    pub fill_position: Vec3,
    pub fill_color: Vec3,
    /// Sun ambient plus global ambient
    pub ambient: Vec3,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            sun_direction: Vec3::new(100.0, 200.0, 100.0).normalize(),
            sun_color: Vec3::new(1.0, 0.95, 0.8),
            fill_position: Vec3::new(-50.0, 50.0, 50.0),
            fill_color: Vec3::new(0.4, 0.4, 0.5),
            ambient: Vec3::new(0.5, 0.5, 0.7),
        }
    }
}

/// Per-frame uniform data, shared by the sky and scene shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    sun_direction: [f32; 3],
    /// 1.0 when lit, 0.0 for flat texture colour
    lighting_enabled: f32,
    sun_color: [f32; 3],
    _pad0: f32,
    fill_position: [f32; 3],
    _pad1: f32,
    fill_color: [f32; 3],
    _pad2: f32,
    ambient: [f32; 3],
    _pad3: f32,
    sky_color: [f32; 4],
}

impl FrameUniforms {
    fn new(view_proj: Mat4, lighting: &LightingConfig, frame: &Frame) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            sun_direction: lighting.sun_direction.to_array(),
            lighting_enabled: if frame.lighting_enabled { 1.0 } else { 0.0 },
            sun_color: lighting.sun_color.to_array(),
            _pad0: 0.0,
            fill_position: lighting.fill_position.to_array(),
            _pad1: 0.0,
            fill_color: lighting.fill_color.to_array(),
            _pad2: 0.0,
            ambient: lighting.ambient.to_array(),
            _pad3: 0.0,
            sky_color: frame.sky_color,
        }
    }
}

/// Per-draw uniform data, one slot per [`DrawCommand`].
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    tint: [f32; 4],
}

impl DrawUniforms {
    fn new(draw: &DrawCommand) -> Self {
        let [r, g, b] = draw.tint;
        Self {
            model: draw.model.to_cols_array_2d(),
            tint: [r, g, b, 1.0],
        }
    }
}

/// Round `size` up to a multiple of `alignment`.
fn aligned_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// Pack per-draw uniforms at `stride` byte intervals.
fn pack_draw_uniforms(draws: &[DrawCommand], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; draws.len() * stride];
    for (k, draw) in draws.iter().enumerate() {
        let uniforms = DrawUniforms::new(draw);
        let src = bytemuck::bytes_of(&uniforms);
        bytes[k * stride..k * stride + src.len()].copy_from_slice(src);
    }
    bytes
}

/// Uploaded vertex and index buffers for one cached mesh.
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Dynamic-offset uniform buffer holding one [`DrawUniforms`] slot per draw.
struct DrawBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl DrawBuffer {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            capacity,
        }
    }
}

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Initial number of per-draw uniform slots; grows on demand.
const INITIAL_DRAW_CAPACITY: usize = 256;

fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Upload RGBA8 texels and bind them with the shared sampler.
fn create_texture_bind_group(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    size: u32,
    texels: &[u8],
) -> wgpu::BindGroup {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        texels,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn uniform_layout_entry(has_dynamic_offset: bool, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size: NonZeroU64::new(size),
        },
        count: None,
    }
}

/// GPU renderer managing wgpu state and rendering.
///
/// Holds no scene state of its own: each call to [`Renderer::render`] composes
/// a [`Frame`] from the [`SceneState`] and draws it.
pub struct Renderer {
    // Core wgpu objects
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    /// Current window size (for aspect ratio and resize handling)
    pub size: winit::dpi::PhysicalSize<u32>,

    // Depth buffer
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    // Pipelines
    scene_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,

    // Uniforms
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_stride: u64,
    draws: DrawBuffer,

    // Textures, plus a white texel for untextured parts
    texture_bind_groups: HashMap<TextureName, wgpu::BindGroup>,
    white_bind_group: wgpu::BindGroup,

    /// GPU copies of cached meshes
    meshes: HashMap<MeshKey, GpuMesh>,

    /// Lighting configuration
    pub lighting: LightingConfig,

    // egui
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    /// UI state
    pub ui: Ui,

    /// Frame_time for FPS calculation
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl Renderer {
    /// Create a new renderer for the given window.
    ///
    /// # Arguments
    ///
    /// * `window` - The window to render to
    /// * `texture_seed` - Seed for the placeholder textures
    ///
    /// # Errors
    ///
    /// Returns an error if GPU initialization fails.
    pub async fn new(window: Arc<Window>, texture_seed: u64) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface for the window
        let surface = instance.create_surface(window.clone())?;

        // Request GPU adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        // Create device and queue
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Init egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx,
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: Some(DEPTH_FORMAT),
                ..Default::default()
            },
        );
        let ui = Ui::new();

        // Create depth texture
        let (depth_texture, depth_view) =
            create_depth_texture(&device, config.width, config.height);

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/scene.wgsl").into()),
        });
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sky Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sky.wgsl").into()),
        });

        // Frame uniforms (group 0)
        let frame_uniform_size = std::mem::size_of::<FrameUniforms>() as u64;
        let frame_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: frame_uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[uniform_layout_entry(false, frame_uniform_size)],
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        // Per-draw uniforms (group 1), addressed by dynamic offset
        let draw_uniform_size = std::mem::size_of::<DrawUniforms>() as u64;
        let draw_stride = aligned_stride(
            draw_uniform_size,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[uniform_layout_entry(true, draw_uniform_size)],
        });
        let draws = DrawBuffer::new(&device, &draw_layout, draw_stride, INITIAL_DRAW_CAPACITY);

        // Textures (group 2)
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
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
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let texture_bind_groups: HashMap<TextureName, wgpu::BindGroup> = TextureName::ALL
            .iter()
            .map(|&name| {
                let texels = procedural_texels(name, TEXTURE_SIZE, texture_seed);
                let bind_group = create_texture_bind_group(
                    &device,
                    &queue,
                    &texture_layout,
                    &sampler,
                    name.label(),
                    TEXTURE_SIZE,
                    &texels,
                );
                (name, bind_group)
            })
            .collect();
        let white_bind_group = create_texture_bind_group(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            "white",
            1,
            &[255, 255, 255, 255],
        );
        log::debug!(
            "Generated {} textures of {}x{}",
            texture_bind_groups.len(),
            TEXTURE_SIZE,
            TEXTURE_SIZE
        );

        // Scene pipeline: every part is drawn double-sided
        let scene_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let scene_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&scene_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        // Sky pipeline: full-screen quad, depth test disabled
        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sky Pipeline Layout"),
            bind_group_layouts: &[&frame_layout],
            push_constant_ranges: &[],
        });

        let sky_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sky Pipeline"),
            layout: Some(&sky_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &sky_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &sky_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            depth_view,
            scene_pipeline,
            sky_pipeline,
            frame_uniform_buffer,
            frame_bind_group,
            draw_layout,
            draw_stride,
            draws,
            texture_bind_groups,
            white_bind_group,
            meshes: HashMap::new(),
            lighting: LightingConfig::default(),
            egui_state,
            egui_renderer,
            ui,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    /// Handle window event
    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Whether egui currently wants keyboard input (e.g. a focused text field).
    pub fn wants_keyboard_input(&self) -> bool {
        self.egui_state.egui_ctx().wants_keyboard_input()
    }

    /// Handle window resize.
    ///
    /// Reconfigures the surface and depth buffer for the new size.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            // Recreate depth texture for new size
            let (depth_texture, depth_view) =
                create_depth_texture(&self.device, new_size.width, new_size.height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;
        }
    }

    /// Upload any mesh referenced by `draws` that is not on the GPU yet.
    fn upload_meshes(&mut self, draws: &[DrawCommand], cache: &MeshCache) {
        for draw in draws {
            if self.meshes.contains_key(&draw.mesh) {
                continue;
            }
            let Some(mesh) = cache.get(&draw.mesh) else {
                log::warn!("Draw references unknown mesh {:?}", draw.mesh);
                continue;
            };
            let (vertices, indices) = mesh.to_indexed();
            if indices.is_empty() {
                continue;
            }

            let vertex_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            log::debug!(
                "Uploaded mesh {:?}: {} vertices, {} indices",
                draw.mesh,
                vertices.len(),
                indices.len()
            );

            self.meshes.insert(
                draw.mesh,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: indices.len() as u32,
                },
            );
        }
    }

    /// Write per-draw uniforms, growing the buffer when the draw count exceeds it.
    fn write_draw_uniforms(&mut self, draws: &[DrawCommand]) {
        if draws.len() > self.draws.capacity {
            let capacity = draws.len().next_power_of_two();
            log::debug!("Growing draw uniform buffer to {} slots", capacity);
            self.draws = DrawBuffer::new(&self.device, &self.draw_layout, self.draw_stride, capacity);
        }
        if !draws.is_empty() {
            let bytes = pack_draw_uniforms(draws, self.draw_stride);
            self.queue.write_buffer(&self.draws.buffer, 0, &bytes);
        }
    }

    /// Render a frame.
    ///
    /// Runs the UI (which may mutate `scene`), composes the frame, then draws the
    /// sky, every scene part and the UI overlay.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if surface acquisition fails and
    /// [`RenderError::Geometry`] if the scene cannot be composed.
    pub fn render(
        &mut self,
        window: &Window,
        scene: &mut SceneState,
        cache: &mut MeshCache,
    ) -> Result<(), RenderError> {
        // Update FPS counter
        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.last_frame = now;
        }

        // Begin egui frame
        let raw_input = self.egui_state.take_egui_input(window);
        let egui_ctx = self.egui_state.egui_ctx().clone();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            let response = self.ui.render(ctx, scene, &mut self.lighting, self.fps);
            if response.reset_camera {
                scene.camera.reset();
            }
        });

        // Handle egui platform output (cursor changes, etc.)
        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let aspect = self.size.width as f32 / self.size.height.max(1) as f32;
        let frame = scene.compose(cache, aspect)?;
        self.upload_meshes(&frame.draws, cache);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Update uniforms
        let frame_uniforms =
            FrameUniforms::new(frame.view_projection(), &self.lighting, &frame);
        self.queue.write_buffer(
            &self.frame_uniform_buffer,
            0,
            bytemuck::bytes_of(&frame_uniforms),
        );
        self.write_draw_uniforms(&frame.draws);

        // Prepare egui for rendering
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.size.width, self.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        // Update egui textures
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        // Create command encoder
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Upload egui buffers
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        let [r, g, b, a] = frame.clear_color.map(f64::from);

        // Begin render pass
        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // Convert to 'static lifetime for egui compatibility
            let mut render_pass = render_pass.forget_lifetime();

            // Background first
            render_pass.set_pipeline(&self.sky_pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            render_pass.draw(0..6, 0..1);

            render_pass.set_pipeline(&self.scene_pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (k, draw) in frame.draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(&draw.mesh) else {
                    continue;
                };
                let texture = draw
                    .texture
                    .and_then(|name| self.texture_bind_groups.get(&name))
                    .unwrap_or(&self.white_bind_group);

                let offset = (k as u64 * self.draw_stride) as u32;
                render_pass.set_bind_group(1, &self.draws.bind_group, &[offset]);
                render_pass.set_bind_group(2, texture, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            // Render egui UI
            self.egui_renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        // Submit commands and present
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(x: f32, tint: [f32; 3]) -> DrawCommand {
        DrawCommand {
            mesh: MeshKey::Static("test"),
            model: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            texture: None,
            tint,
        }
    }

    #[test]
    fn test_uniform_sizes_match_shader_layout() {
        // WGSL struct sizes are rounded to 16 bytes
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 160);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 80);
    }

    #[test]
    fn test_aligned_stride() {
        assert_eq!(aligned_stride(80, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(80, 16), 80);
    }

    #[test]
    fn test_pack_draw_uniforms_places_each_slot_at_stride() {
        let draws = [draw(1.0, [1.0, 0.0, 0.0]), draw(2.0, [0.0, 1.0, 0.0])];
        let bytes = pack_draw_uniforms(&draws, 256);
        assert_eq!(bytes.len(), 512);

        let second: DrawUniforms =
            bytemuck::pod_read_unaligned(&bytes[256..256 + std::mem::size_of::<DrawUniforms>()]);
        assert_eq!(second.model[3][0], 2.0);
        assert_eq!(second.tint, [0.0, 1.0, 0.0, 1.0]);
        // Padding between slots stays zeroed
        assert!(bytes[80..256].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_frame_uniforms_follow_lighting_toggle() {
        let frame = Frame {
            clear_color: crate::scene::CLEAR_COLOR,
            sky_color: crate::scene::SKY_COLOR,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            projection: Projection::Perspective,
            lighting_enabled: false,
            draws: Vec::new(),
        };
        let lighting = LightingConfig::default();
        let uniforms = FrameUniforms::new(Mat4::IDENTITY, &lighting, &frame);
        assert_eq!(uniforms.lighting_enabled, 0.0);
        assert_eq!(uniforms.sky_color, crate::scene::SKY_COLOR);
        assert!((Vec3::from_array(uniforms.sun_direction).length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_scene_shader_uses_full_ambient() {
        let source = include_str!("../shaders/scene.wgsl");
        let lit = source
            .lines()
            .find(|line| line.contains("let light ="))
            .unwrap();
        assert!(lit.contains("frame.ambient + sun + fill"));
        assert!(!source.contains("frame.ambient *"));
        // Default ambient is uploaded unscaled
        let frame = Frame {
            clear_color: crate::scene::CLEAR_COLOR,
            sky_color: crate::scene::SKY_COLOR,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            projection: Projection::Perspective,
            lighting_enabled: true,
            draws: Vec::new(),
        };
        let uniforms = FrameUniforms::new(Mat4::IDENTITY, &LightingConfig::default(), &frame);
        assert_eq!(uniforms.ambient, [0.5, 0.5, 0.7]);
    }
}
