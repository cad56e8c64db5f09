use std::sync::Arc;

use nalgebra_glm as glm;
use wgpu::util::DeviceExt;

use crate::camera::CameraPose;
use crate::error::ViewerError;
use crate::model::{Model, ModelBounds, PointLight, global_transforms};
use crate::renderer::line_vertex::LineVertex;
use crate::renderer::vertex::Vertex;
use crate::settings::LightingSettings;

pub(crate) const MAX_POINT_LIGHTS: usize = 4;

const GRID_MAJOR_COLOR: [f32; 3] = [0.28, 0.28, 0.28];
const GRID_MINOR_COLOR: [f32; 3] = [0.14, 0.14, 0.14];

/// Combined per-frame uniform: camera plus lights. Layout mirrors the
/// `SceneUniform` struct in shader.wgsl.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    sun_direction: [f32; 4],
    sun_color: [f32; 4],
    point_positions: [[f32; 4]; MAX_POINT_LIGHTS],
    /// rgb = color, w = intensity
    point_colors: [[f32; 4]; MAX_POINT_LIGHTS],
    /// x = active point light count
    point_count: [u32; 4],
}

/// Vertex range of one mesh inside the concatenated buffer, with the node
/// whose transform places it.
struct MeshRange {
    node_index: usize,
    vertex_start: usize,
    vertex_count: usize,
}

pub struct Renderer {
    pub(crate) surface: wgpu::Surface<'static>,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    pub(crate) config: wgpu::SurfaceConfiguration,
    pub(crate) mesh_pipeline: wgpu::RenderPipeline,
    pub(crate) line_pipeline: wgpu::RenderPipeline,
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) num_indices: u32,
    pub(crate) grid_vertex_buffer: wgpu::Buffer,
    pub(crate) num_grid_vertices: u32,
    pub(crate) bounding_box_vertex_buffer: wgpu::Buffer,
    pub(crate) num_bounding_box_vertices: u32,
    pub(crate) scene_buffer: wgpu::Buffer,
    pub(crate) scene_bind_group: wgpu::BindGroup,
    mesh_ranges: Vec<MeshRange>,
    /// Node-local vertices, the source for CPU re-transforms on animation.
    local_vertices: Vec<Vertex>,
    /// Node transforms at import time (the rest pose).
    rest_transforms: Vec<glm::Mat4>,
    ambient: [f32; 3],
    sun_direction: [f32; 3],
    sun_color: [f32; 3],
    point_lights: Vec<PointLight>,
}

impl Renderer {
    pub async fn new(window: &Arc<winit::window::Window>) -> Result<Self, ViewerError> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: wgpu::MemoryHints::default(),
                ..Default::default()
            })
            .await
            .unwrap();

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
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shader.wgsl").into()),
        });

        // Empty until a model arrives
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Vertex Buffer"),
            size: 0,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Index Buffer"),
            size: 0,
            usage: wgpu::BufferUsages::INDEX,
            mapped_at_creation: false,
        });

        let grid_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Grid Vertex Buffer"),
            size: 0,
            usage: wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });

        let bounding_box_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bounding Box Vertex Buffer"),
            size: 0,
            usage: wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: size_of::<SceneUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
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

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&scene_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                // glTF front faces are counter-clockwise
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
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

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_line"),
                buffers: &[LineVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_line"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
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

        Ok(Self {
            surface,
            device,
            queue,
            config,
            mesh_pipeline,
            line_pipeline,
            vertex_buffer,
            index_buffer,
            num_indices: 0,
            grid_vertex_buffer,
            num_grid_vertices: 0,
            bounding_box_vertex_buffer,
            num_bounding_box_vertices: 0,
            scene_buffer,
            scene_bind_group,
            mesh_ranges: Vec::new(),
            local_vertices: Vec::new(),
            rest_transforms: Vec::new(),
            ambient: [0.25, 0.25, 0.25],
            sun_direction: [1.0, 1.0, 1.0],
            sun_color: [1.0, 1.0, 1.0],
            point_lights: Vec::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload a freshly loaded model: concatenate every mesh into one
    /// vertex/index buffer pair, placed by the rest-pose node transforms.
    pub fn upload_model(&mut self, model: &Model) {
        if model.meshes.is_empty() {
            log::warn!("model '{}' has no meshes to upload", model.name);
            self.num_indices = 0;
            self.mesh_ranges.clear();
            self.local_vertices.clear();
            return;
        }

        self.rest_transforms = global_transforms(&model.nodes);
        self.local_vertices.clear();
        self.mesh_ranges.clear();

        let mut all_indices: Vec<u32> = Vec::new();
        for mesh in &model.meshes {
            let vertex_start = self.local_vertices.len();
            for vertex in &mesh.vertices {
                self.local_vertices.push(Vertex {
                    position: vertex.position,
                    normal: vertex.normal,
                    color: vertex.color,
                });
            }
            for &index in &mesh.indices {
                all_indices.push(vertex_start as u32 + index);
            }
            self.mesh_ranges.push(MeshRange {
                node_index: mesh.node_index,
                vertex_start,
                vertex_count: mesh.vertices.len(),
            });
        }

        let world = self.world_vertices(&self.rest_transforms);
        self.vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&world),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        self.index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&all_indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.num_indices = all_indices.len() as u32;

        log::info!(
            "uploaded {} vertices, {} indices across {} meshes",
            self.local_vertices.len(),
            self.num_indices,
            self.mesh_ranges.len()
        );
    }

    /// Rewrite the vertex buffer with animated node transforms. The buffer
    /// keeps its size; only contents change.
    pub fn update_animation(&mut self, globals: &[glm::Mat4]) {
        if self.local_vertices.is_empty() {
            return;
        }
        let world = self.world_vertices(globals);
        self.queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&world));
    }

    fn world_vertices(&self, globals: &[glm::Mat4]) -> Vec<Vertex> {
        let mut out = Vec::with_capacity(self.local_vertices.len());
        for range in &self.mesh_ranges {
            let matrix = globals
                .get(range.node_index)
                .copied()
                .unwrap_or_else(glm::Mat4::identity);
            let normal_matrix = glm::inverse_transpose(glm::mat4_to_mat3(&matrix));
            let vertices =
                &self.local_vertices[range.vertex_start..range.vertex_start + range.vertex_count];
            for vertex in vertices {
                let p = matrix
                    * glm::vec4(vertex.position[0], vertex.position[1], vertex.position[2], 1.0);
                let n = normal_matrix
                    * glm::vec3(vertex.normal[0], vertex.normal[1], vertex.normal[2]);
                let n = if glm::length(&n) > 1e-8 {
                    glm::normalize(&n)
                } else {
                    n
                };
                out.push(Vertex {
                    position: [p.x, p.y, p.z],
                    normal: [n.x, n.y, n.z],
                    color: vertex.color,
                });
            }
        }
        out
    }

    /// Refresh the light state fed into the scene uniform. Point lights
    /// beyond the uniform capacity are dropped with a warning.
    pub fn update_lighting(&mut self, lighting: &LightingSettings, lights: &[PointLight]) {
        self.ambient = lighting.ambient_color;
        self.sun_direction = lighting.sun_direction;
        self.sun_color = lighting.sun_color;
        if lights.len() > MAX_POINT_LIGHTS {
            log::warn!(
                "model carries {} point lights, only the first {} are used",
                lights.len(),
                MAX_POINT_LIGHTS
            );
        }
        self.point_lights = lights.iter().take(MAX_POINT_LIGHTS).copied().collect();
    }

    pub(crate) fn scene_uniform(&self, view_proj: &glm::Mat4, pose: &CameraPose) -> SceneUniform {
        let mut point_positions = [[0.0; 4]; MAX_POINT_LIGHTS];
        let mut point_colors = [[0.0; 4]; MAX_POINT_LIGHTS];
        for (i, light) in self.point_lights.iter().enumerate() {
            point_positions[i] = [light.position[0], light.position[1], light.position[2], 1.0];
            point_colors[i] = [
                light.color[0],
                light.color[1],
                light.color[2],
                light.intensity,
            ];
        }

        let mut view_proj_array = [[0.0_f32; 4]; 4];
        for column in 0..4 {
            for row in 0..4 {
                view_proj_array[column][row] = view_proj[(row, column)];
            }
        }

        SceneUniform {
            view_proj: view_proj_array,
            camera_pos: [pose.position.x, pose.position.y, pose.position.z, 1.0],
            ambient: [self.ambient[0], self.ambient[1], self.ambient[2], 0.0],
            sun_direction: [
                self.sun_direction[0],
                self.sun_direction[1],
                self.sun_direction[2],
                0.0,
            ],
            sun_color: [self.sun_color[0], self.sun_color[1], self.sun_color[2], 0.0],
            point_positions,
            point_colors,
            point_count: [self.point_lights.len() as u32, 0, 0, 0],
        }
    }

    /// Floor grid under the model, sized to its bounds. Every fifth line is
    /// drawn in the brighter major color.
    pub fn regenerate_grid(&mut self, bounds: &ModelBounds) {
        let half = (bounds.view_distance()).max(1.0);
        let step = half / 10.0;
        let base_y = bounds.min().y;

        let mut vertices = Vec::new();
        for i in -10_i32..=10 {
            let offset = i as f32 * step;
            let color = if i % 5 == 0 {
                GRID_MAJOR_COLOR
            } else {
                GRID_MINOR_COLOR
            };
            vertices.push(LineVertex {
                position: [bounds.center.x - half, base_y, bounds.center.z + offset],
                color,
            });
            vertices.push(LineVertex {
                position: [bounds.center.x + half, base_y, bounds.center.z + offset],
                color,
            });
            vertices.push(LineVertex {
                position: [bounds.center.x + offset, base_y, bounds.center.z - half],
                color,
            });
            vertices.push(LineVertex {
                position: [bounds.center.x + offset, base_y, bounds.center.z + half],
                color,
            });
        }

        self.grid_vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Grid Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.num_grid_vertices = vertices.len() as u32;
    }
}
