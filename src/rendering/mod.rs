//! wgpu rendering backend: pipelines, GPU buffers and frame submission.
//!
//! The animation core treats this module as opaque; it consumes the
//! displaced positions from the scene's wave fields each frame and owns
//! every GPU resource.

use std::sync::Arc;

use thiserror::Error;
use winit::window::Window;

use crate::scene::SceneState;

/// Fatal construction-time failures. Rendering itself surfaces
/// `wgpu::SurfaceError` per frame and is handled by the driver.
#[derive(Debug, Error)]
pub enum RenderInitError {
    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    AdapterUnavailable,

    #[error("failed to acquire graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Static per-vertex sphere attributes, interleaved in one buffer;
/// positions live in their own buffer because they change every frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshAttributes {
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

/// sRGB to linear conversion for the clear color; surface formats are
/// sRGB so `wgpu::Color` expects linear components.
fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn clear_color(srgb: [f32; 3]) -> wgpu::Color {
    wgpu::Color {
        r: srgb_to_linear(srgb[0] as f64),
        g: srgb_to_linear(srgb[1] as f64),
        b: srgb_to_linear(srgb[2] as f64),
        a: 1.0,
    }
}

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
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
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

pub fn create_camera_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Camera Bind Group Layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

pub fn create_camera_binding(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Camera Buffer"),
        size: std::mem::size_of::<CameraUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Camera Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });

    (buffer, bind_group)
}

const POSITION_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: 12,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    }],
};

const MESH_ATTRIBUTE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<MeshAttributes>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 1,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 12,
            shader_location: 2,
        },
    ],
};

const COLOR_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: 12,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 1,
    }],
};

fn depth_state(write_enabled: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write_enabled,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Lit, alpha-blended triangle pipeline for the sphere surface
pub fn create_mesh_pipeline(
    device: &wgpu::Device,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Sphere Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sphere.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sphere Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Sphere Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[POSITION_LAYOUT, MESH_ATTRIBUTE_LAYOUT],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            // the displaced surface is not convex, so both faces stay visible
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth_state(true)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Point-list pipeline for the particle cloud
pub fn create_particle_pipeline(
    device: &wgpu::Device,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Particle Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("particles.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Particle Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Particle Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[POSITION_LAYOUT, COLOR_LAYOUT],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::PointList,
            ..Default::default()
        },
        depth_stencil: Some(depth_state(true)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// GPU-side scene geometry. Position buffers are rewritten every frame
/// from the wave fields; attribute and index buffers are written once.
pub struct SceneBuffers {
    sphere_positions: wgpu::Buffer,
    sphere_attributes: wgpu::Buffer,
    sphere_indices: wgpu::Buffer,
    sphere_index_count: u32,
    particle_positions: wgpu::Buffer,
    particle_colors: wgpu::Buffer,
    particle_count: u32,
}

impl SceneBuffers {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, scene: &SceneState) -> Self {
        let sphere = &scene.sphere;
        let particles = &scene.particles;

        let sphere_positions = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sphere Position Buffer"),
            size: (sphere.vertex_count() * 12) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let attributes: Vec<MeshAttributes> = sphere
            .normals()
            .iter()
            .zip(sphere.colors())
            .map(|(normal, color)| MeshAttributes {
                normal: *normal,
                color: *color,
            })
            .collect();

        let sphere_attributes = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sphere Attribute Buffer"),
            size: (attributes.len() * std::mem::size_of::<MeshAttributes>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&sphere_attributes, 0, bytemuck::cast_slice(&attributes));

        let sphere_indices = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sphere Index Buffer"),
            size: (sphere.indices().len() * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&sphere_indices, 0, bytemuck::cast_slice(sphere.indices()));

        let particle_positions = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Position Buffer"),
            size: (particles.count() * 12) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let particle_colors = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Color Buffer"),
            size: (particles.count() * 12) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&particle_colors, 0, bytemuck::cast_slice(particles.colors()));

        let buffers = Self {
            sphere_positions,
            sphere_attributes,
            sphere_indices,
            sphere_index_count: sphere.indices().len() as u32,
            particle_positions,
            particle_colors,
            particle_count: particles.count() as u32,
        };
        buffers.upload_positions(queue, scene);
        buffers
    }

    /// Push the current displaced positions of both wave fields.
    pub fn upload_positions(&self, queue: &wgpu::Queue, scene: &SceneState) {
        queue.write_buffer(
            &self.sphere_positions,
            0,
            bytemuck::cast_slice(scene.sphere.field.positions()),
        );
        queue.write_buffer(
            &self.particle_positions,
            0,
            bytemuck::cast_slice(scene.particles.field.positions()),
        );
    }

    /// Record both draws. Particles sit far behind the sphere, so they
    /// go first and the translucent sphere blends over them.
    pub fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        particle_pipeline: &'a wgpu::RenderPipeline,
        mesh_pipeline: &'a wgpu::RenderPipeline,
        camera_bind_group: &'a wgpu::BindGroup,
    ) {
        pass.set_bind_group(0, camera_bind_group, &[]);

        pass.set_pipeline(particle_pipeline);
        pass.set_vertex_buffer(0, self.particle_positions.slice(..));
        pass.set_vertex_buffer(1, self.particle_colors.slice(..));
        pass.draw(0..self.particle_count, 0..1);

        pass.set_pipeline(mesh_pipeline);
        pass.set_vertex_buffer(0, self.sphere_positions.slice(..));
        pass.set_vertex_buffer(1, self.sphere_attributes.slice(..));
        pass.set_index_buffer(self.sphere_indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.sphere_index_count, 0, 0..1);
    }
}

/// Windowed renderer owning the surface and all GPU resources.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    mesh_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    buffers: SceneBuffers,
    clear: wgpu::Color,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        scene: &SceneState,
        background: [f32; 3],
    ) -> Result<Self, RenderInitError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderInitError::AdapterUnavailable)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, size.width, size.height);

        let camera_bind_group_layout = create_camera_bind_group_layout(&device);
        let (camera_buffer, camera_bind_group) =
            create_camera_binding(&device, &camera_bind_group_layout);

        let mesh_pipeline = create_mesh_pipeline(&device, &camera_bind_group_layout, surface_format);
        let particle_pipeline =
            create_particle_pipeline(&device, &camera_bind_group_layout, surface_format);

        let buffers = SceneBuffers::new(&device, &queue, scene);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            mesh_pipeline,
            particle_pipeline,
            camera_buffer,
            camera_bind_group,
            buffers,
            clear: clear_color(background),
        })
    }

    /// Reconfigure the output surface. Zero dimensions (minimize) are
    /// ignored; repeated identical sizes are harmless.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, width, height);
        }
    }

    /// Submit one frame from the current scene state.
    pub fn render(&mut self, scene: &SceneState) -> Result<(), wgpu::SurfaceError> {
        let uniforms = CameraUniforms {
            view_proj: scene.camera.view_proj().to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniforms));

        self.buffers.upload_positions(&self.queue, scene);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
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

            self.buffers.draw(
                &mut pass,
                &self.particle_pipeline,
                &self.mesh_pipeline,
                &self.camera_bind_group,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_color_endpoints() {
        let black = clear_color([0.0, 0.0, 0.0]);
        assert_eq!(black.r, 0.0);
        assert_eq!(black.a, 1.0);

        let white = clear_color([1.0, 1.0, 1.0]);
        assert!((white.r - 1.0).abs() < 1e-9);
        assert!((white.g - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_color_is_monotonic() {
        let dim = clear_color([0.2, 0.2, 0.2]);
        let bright = clear_color([0.8, 0.8, 0.8]);
        assert!(dim.r < bright.r);
        // linear values sit below their sRGB encodings
        assert!(dim.r < 0.2);
    }

    #[test]
    fn test_gpu_struct_sizes() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 64);
        assert_eq!(std::mem::size_of::<MeshAttributes>(), 24);
    }
}
