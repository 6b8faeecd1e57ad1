//! WebGPU render pipeline setup
//!
//! One lit triangle pipeline with a depth buffer. The track mesh is uploaded
//! once per level; ship and particles go through a per-frame buffer.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::RenderError;
use super::camera::FollowCamera;
use super::shapes::{TrackMesh, scene_mesh, track_mesh};
use super::vertex::{Vertex, colors};
use crate::settings::Settings;
use crate::sim::GameState;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Initial per-frame buffer size, in vertices
const DYNAMIC_CAPACITY: usize = 4096;

/// Uniforms (must match shader.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    eye: [f32; 4],
    fog: [f32; 4],
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn vertex_buffer(device: &wgpu::Device, label: &str, vertices: &[Vertex]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    track_buffer: wgpu::Buffer,
    track_vertices: u32,
    track_opaque: u32,
    /// Level the track buffer was built from
    track_level: Option<usize>,

    dynamic_buffer: wgpu::Buffer,
    dynamic_capacity: usize,

    pub camera: FollowCamera,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    /// Bring up WebGPU on a page canvas
    #[cfg(target_arch = "wasm32")]
    pub async fn from_canvas(
        canvas: web_sys::HtmlCanvasElement,
        width: u32,
        height: u32,
        settings: &Settings,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        Self::new(surface, &adapter, width, height, settings).await
    }

    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        settings: &Settings,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sky-racer-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let camera = FollowCamera::new(width, height, settings);
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Self::globals(&camera)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("render_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Tunnel shells are seen from both sides
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let depth_view = create_depth_view(&device, config.width, config.height);
        let track_buffer = vertex_buffer(&device, "track_buffer", &[Vertex::zeroed()]);
        let dynamic_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("dynamic_buffer"),
            size: (std::mem::size_of::<Vertex>() * DYNAMIC_CAPACITY) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            depth_view,
            globals_buffer,
            bind_group,
            track_buffer,
            track_vertices: 0,
            track_opaque: 0,
            track_level: None,
            dynamic_buffer,
            dynamic_capacity: DYNAMIC_CAPACITY,
            camera,
            size: (width, height),
        })
    }

    fn globals(camera: &FollowCamera) -> Globals {
        let bg = colors::BACKGROUND;
        Globals {
            view_proj: camera.view_proj().to_cols_array_2d(),
            light_dir: [0.3, 1.0, 0.5, 0.0],
            eye: camera.eye.extend(1.0).to_array(),
            fog: [bg[0], bg[1], bg[2], camera.far],
        }
    }

    /// Reconfigure the surface, depth buffer and projection for a new canvas size
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, new_width, new_height);
            self.camera.set_viewport(new_width, new_height);
        }
    }

    /// Upload the static track mesh
    pub fn load_track(&mut self, mesh: &TrackMesh, level_index: usize) {
        self.track_buffer = vertex_buffer(&self.device, "track_buffer", &mesh.vertices);
        self.track_vertices = mesh.vertices.len() as u32;
        self.track_opaque = mesh.opaque_count as u32;
        self.track_level = Some(level_index);
        log::info!(
            "Uploaded track mesh for level {}: {} vertices",
            level_index + 1,
            mesh.vertices.len()
        );
    }

    fn upload_dynamic(&mut self, vertices: &[Vertex]) {
        if vertices.len() > self.dynamic_capacity {
            self.dynamic_capacity = vertices.len().next_power_of_two();
            self.dynamic_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("dynamic_buffer"),
                size: (std::mem::size_of::<Vertex>() * self.dynamic_capacity) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        if !vertices.is_empty() {
            self.queue
                .write_buffer(&self.dynamic_buffer, 0, bytemuck::cast_slice(vertices));
        }
    }

    /// Draw one frame; `time` is the rAF timestamp in ms
    pub fn render(
        &mut self,
        state: &GameState,
        settings: &Settings,
        time: f64,
    ) -> Result<(), wgpu::SurfaceError> {
        if self.track_level != Some(state.level_index) {
            self.load_track(&track_mesh(&state.track, settings), state.level_index);
            self.camera.snap_to(&state.ship);
        }

        // Restarts put the ship back behind the camera
        if state.frame == 0 {
            self.camera.snap_to(&state.ship);
        }
        self.camera
            .follow(&state.ship, state.shake, (time / 1000.0) as f32, settings);
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Self::globals(&self.camera)),
        );

        let scene = scene_mesh(state, settings);
        self.upload_dynamic(&scene.vertices);
        let scene_opaque = scene.opaque_count as u32;
        let scene_vertices = scene.vertices.len() as u32;

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let bg = colors::BACKGROUND;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg[0] as f64,
                            g: bg[1] as f64,
                            b: bg[2] as f64,
                            a: 1.0,
                        }),
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
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);

            // Opaque track and ship, then translucent tunnels, then fading particles
            render_pass.set_vertex_buffer(0, self.track_buffer.slice(..));
            render_pass.draw(0..self.track_opaque, 0..1);

            if scene_opaque > 0 {
                render_pass.set_vertex_buffer(0, self.dynamic_buffer.slice(..));
                render_pass.draw(0..scene_opaque, 0..1);
            }

            if self.track_vertices > self.track_opaque {
                render_pass.set_vertex_buffer(0, self.track_buffer.slice(..));
                render_pass.draw(self.track_opaque..self.track_vertices, 0..1);
            }

            if scene_vertices > scene_opaque {
                render_pass.set_vertex_buffer(0, self.dynamic_buffer.slice(..));
                render_pass.draw(scene_opaque..scene_vertices, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
