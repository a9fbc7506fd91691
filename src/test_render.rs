// Headless rendering check: advances the scene a number of frames and
// saves one frame to a PNG, without opening a window.

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use wavesphere::params::{RenderConfig, SceneParams};
use wavesphere::rendering::{
    self, create_camera_bind_group_layout, create_camera_binding, create_depth_view,
    create_mesh_pipeline, create_particle_pipeline, CameraUniforms, SceneBuffers,
};
use wavesphere::scene::SceneState;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

#[derive(Parser, Debug)]
#[command(name = "test_render", about = "Render a wavesphere frame off-screen to PNG")]
struct Options {
    /// Seed for scene generation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Frames to advance before capturing
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Output PNG path
    #[arg(long, default_value = "screenshots/wavesphere.png")]
    out: String,
}

fn main() {
    env_logger::init();
    let options = Options::parse();

    println!(
        "Rendering frame {} at {}x{} (seed {})",
        options.frames, WIDTH, HEIGHT, options.seed
    );

    pollster::block_on(render_frame(&options));
}

async fn render_frame(options: &Options) {
    if let Some(parent) = std::path::Path::new(&options.out).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).expect("failed to create output directory");
        }
    }

    let params = SceneParams::default();
    let config = RenderConfig {
        width: WIDTH,
        height: HEIGHT,
        ..Default::default()
    };

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut scene = SceneState::new(&params, &config, &mut rng);
    for _ in 0..options.frames {
        scene.advance_frame();
    }

    // Headless wgpu setup
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .expect("no compatible graphics adapter found");

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
        .await
        .expect("failed to acquire graphics device");

    // Render target
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Render Target"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let depth_view = create_depth_view(&device, WIDTH, HEIGHT);

    // Pipelines and scene resources from the shared library
    let camera_bind_group_layout = create_camera_bind_group_layout(&device);
    let (camera_buffer, camera_bind_group) =
        create_camera_binding(&device, &camera_bind_group_layout);

    let uniforms = CameraUniforms {
        view_proj: scene.camera.view_proj().to_cols_array_2d(),
    };
    queue.write_buffer(&camera_buffer, 0, bytemuck::bytes_of(&uniforms));

    let mesh_pipeline = create_mesh_pipeline(&device, &camera_bind_group_layout, TARGET_FORMAT);
    let particle_pipeline =
        create_particle_pipeline(&device, &camera_bind_group_layout, TARGET_FORMAT);

    let buffers = SceneBuffers::new(&device, &queue, &scene);

    // Render one frame
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Render Encoder"),
    });

    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(rendering::clear_color(params.background.color)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        buffers.draw(
            &mut pass,
            &particle_pipeline,
            &mesh_pipeline,
            &camera_bind_group,
        );
    }

    queue.submit(std::iter::once(encoder.finish()));

    // Read back pixels
    let bytes_per_row = WIDTH * 4;

    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Output Buffer"),
        size: (bytes_per_row * HEIGHT) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Copy Encoder"),
    });

    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &output_buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(HEIGHT),
            },
        },
        wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
    );

    queue.submit(std::iter::once(encoder.finish()));

    // Save to file
    let buffer_slice = output_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, |_| {});
    device.poll(wgpu::Maintain::Wait);

    let data = buffer_slice.get_mapped_range();
    image::save_buffer(&options.out, &data, WIDTH, HEIGHT, image::ColorType::Rgba8)
        .expect("failed to save PNG");

    println!("Saved: {}", options.out);
}
