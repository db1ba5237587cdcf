use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use wgpu::{
    vertex_attr_array, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, Buffer, BufferBindingType, BufferUsages,
    ColorTargetState, ColorWrites, CommandEncoder, CommandEncoderDescriptor, CompositeAlphaMode,
    DeviceDescriptor, FragmentState, Instance, LoadOp, MultisampleState, Operations,
    PipelineLayoutDescriptor, PresentMode, PrimitiveState, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions,
    ShaderModuleDescriptor, ShaderSource, SurfaceConfiguration, TextureFormat, TextureUsages,
    TextureView, TextureViewDescriptor, VertexState,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    color::Color,
    error::StartupError,
    math::{Rect, Viewport},
};

/// Queued rectangle draw, resolved when the frame ends.
struct RectDrawCommand {
    uniform_offset: u64,
}

/// Wrapper around wgpu surface/device setup and simple frame management.
pub struct Renderer {
    backend: WgpuBackend,
}

impl Renderer {
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, StartupError> {
        let backend = WgpuBackend::new(window, vsync)?;
        Ok(Self { backend })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.backend.resize(new_size);
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.backend.scale_factor = scale_factor;
    }

    /// Begin a frame, or return `None` when the surface cannot be drawn
    /// to right now (minimized, occluded, or still outdated).
    pub fn begin_frame(&mut self) -> Result<Option<Frame>> {
        self.backend.begin_frame()
    }

    pub fn clear(&mut self, frame: &mut Frame, color: Color) -> Result<()> {
        self.backend.clear(frame, color)
    }

    pub fn draw_rect(&mut self, frame: &mut Frame, rect: Rect, color: Color) -> Result<()> {
        self.backend.draw_rect(frame, rect, color)
    }

    pub fn end_frame(&mut self, frame: Frame) -> Result<()> {
        self.backend.end_frame(frame)
    }

    /// Drawable area in logical pixels.
    pub fn viewport(&self) -> Viewport {
        self.backend.viewport()
    }
}

/// One frame in flight: the acquired surface texture plus queued draws.
pub struct Frame {
    surface_texture: Option<wgpu::SurfaceTexture>,
    view: TextureView,
    encoder: Option<CommandEncoder>,
    clear_color: Option<Color>,
    rect_draws: Vec<RectDrawCommand>,
}

impl Drop for Frame {
    fn drop(&mut self) {
        // An abandoned frame must still hand its texture back to the surface.
        if let Some(surface_texture) = self.surface_texture.take() {
            surface_texture.present();
        }
    }
}

struct RectPipeline {
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
    uniform_stride: u64,
}

const MAX_RECTS_PER_FRAME: u64 = 1024;

struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: SurfaceConfiguration,
    present_mode: PresentMode,
    srgb_surface: bool,
    scale_factor: f64,
    minimized: bool,
    rect_pipeline: RectPipeline,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct RectVertex {
    position: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct RectUniforms {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
}

// Unit quad, two triangles; scaled and translated per rect by the MVP.
const QUAD_VERTICES: [RectVertex; 6] = [
    RectVertex { position: [0.0, 0.0] },
    RectVertex { position: [1.0, 0.0] },
    RectVertex { position: [1.0, 1.0] },
    RectVertex { position: [0.0, 0.0] },
    RectVertex { position: [1.0, 1.0] },
    RectVertex { position: [0.0, 1.0] },
];

impl WgpuBackend {
    fn new(window: Arc<Window>, vsync: bool) -> Result<Self, StartupError> {
        let size = window.inner_size();
        let scale_factor = window.scale_factor();

        let instance = Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        log::info!("Using graphics adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&DeviceDescriptor {
            label: Some("boxloop-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        }))?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or(StartupError::NoSurfaceFormat)?;

        let present_mode = choose_present_mode(&capabilities.present_modes, vsync);
        let alpha_mode = choose_alpha_mode(&capabilities.alpha_modes);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::debug!(
            "Surface configured: {}x{} {:?} {:?}",
            surface_config.width,
            surface_config.height,
            format,
            present_mode
        );

        let rect_pipeline = create_rect_pipeline(&device, format);

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            present_mode,
            srgb_surface: format.is_srgb(),
            scale_factor,
            minimized: false,
            rect_pipeline,
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        // Zero-sized surfaces cannot be configured; draw nothing until restored.
        self.minimized = new_size.width == 0 || new_size.height == 0;
        if self.minimized {
            return;
        }

        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface_config.present_mode = self.present_mode;
        self.surface.configure(&self.device, &self.surface_config);
    }

    fn viewport(&self) -> Viewport {
        let scale = if self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        };
        Viewport::new(
            (self.surface_config.width as f64 / scale).round() as u32,
            (self.surface_config.height as f64 / scale).round() as u32,
        )
    }

    fn gpu_color(&self, color: Color) -> [f32; 4] {
        if self.srgb_surface {
            color.to_linear_f32()
        } else {
            color.to_srgb_f32()
        }
    }

    /// Acquire the next surface texture, or `None` to skip this frame.
    ///
    /// A lost or outdated surface is reconfigured once; anything still
    /// failing after that skips the frame so the caller gets back to its
    /// event loop.
    fn begin_frame(&mut self) -> Result<Option<Frame>> {
        if self.minimized {
            return Ok(None);
        }

        let mut reconfigured = false;
        loop {
            match self.surface.get_current_texture() {
                Ok(surface_texture) => {
                    let view = surface_texture
                        .texture
                        .create_view(&TextureViewDescriptor::default());
                    let encoder = self
                        .device
                        .create_command_encoder(&CommandEncoderDescriptor {
                            label: Some("frame-encoder"),
                        });

                    return Ok(Some(Frame {
                        surface_texture: Some(surface_texture),
                        view,
                        encoder: Some(encoder),
                        clear_color: None,
                        rect_draws: Vec::new(),
                    }));
                }
                Err(e) => match surface_recovery(&e, reconfigured) {
                    SurfaceRecovery::Reconfigure => {
                        log::debug!("Surface {e:?}, reconfiguring");
                        self.surface.configure(&self.device, &self.surface_config);
                        reconfigured = true;
                    }
                    SurfaceRecovery::SkipFrame => {
                        log::debug!("Surface {e:?}, skipping frame");
                        return Ok(None);
                    }
                    SurfaceRecovery::Fail => {
                        return Err(anyhow!("Surface error: {e}"));
                    }
                },
            }
        }
    }

    fn clear(&mut self, frame: &mut Frame, color: Color) -> Result<()> {
        if frame.encoder.is_none() {
            bail!("Frame already ended");
        }
        // Clearing discards anything queued before it.
        frame.rect_draws.clear();
        frame.clear_color = Some(color);
        Ok(())
    }

    fn draw_rect(&mut self, frame: &mut Frame, rect: Rect, color: Color) -> Result<()> {
        if frame.encoder.is_none() {
            bail!("Frame already ended");
        }

        let viewport = self.viewport();
        if !viewport.intersects(&rect) {
            return Ok(());
        }

        let index = frame.rect_draws.len() as u64;
        if index >= MAX_RECTS_PER_FRAME {
            bail!("More than {MAX_RECTS_PER_FRAME} rects in one frame");
        }

        let mvp = viewport.projection() * rect.to_matrix();
        let uniforms = RectUniforms {
            mvp: mvp.to_cols_array_2d(),
            color: self.gpu_color(color),
        };

        let uniform_offset = index * self.rect_pipeline.uniform_stride;
        self.queue.write_buffer(
            &self.rect_pipeline.uniform_buffer,
            uniform_offset,
            bytemuck::bytes_of(&uniforms),
        );
        frame.rect_draws.push(RectDrawCommand { uniform_offset });

        Ok(())
    }

    fn end_frame(&mut self, mut frame: Frame) -> Result<()> {
        let mut encoder = frame
            .encoder
            .take()
            .ok_or_else(|| anyhow!("Frame already ended"))?;

        let load = match frame.clear_color {
            Some(color) => {
                let [r, g, b, a] = self.gpu_color(color);
                LoadOp::Clear(wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: a as f64,
                })
            }
            None => LoadOp::Load,
        };

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("rect-pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                multiview_mask: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if !frame.rect_draws.is_empty() {
                pass.set_pipeline(&self.rect_pipeline.pipeline);
                pass.set_vertex_buffer(0, self.rect_pipeline.vertex_buffer.slice(..));
                for draw in &frame.rect_draws {
                    pass.set_bind_group(
                        0,
                        &self.rect_pipeline.bind_group,
                        &[draw.uniform_offset as u32],
                    );
                    pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));

        let surface_texture = frame
            .surface_texture
            .take()
            .ok_or_else(|| anyhow!("Frame already ended"))?;
        surface_texture.present();
        Ok(())
    }
}

/// How `begin_frame` reacts to a failed texture acquire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SurfaceRecovery {
    Reconfigure,
    SkipFrame,
    Fail,
}

fn surface_recovery(error: &wgpu::SurfaceError, reconfigured: bool) -> SurfaceRecovery {
    match error {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated if !reconfigured => {
            SurfaceRecovery::Reconfigure
        }
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Timeout => {
            SurfaceRecovery::SkipFrame
        }
        wgpu::SurfaceError::OutOfMemory | wgpu::SurfaceError::Other => SurfaceRecovery::Fail,
    }
}

fn create_rect_pipeline(device: &wgpu::Device, surface_format: TextureFormat) -> RectPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("rect-shader"),
        source: ShaderSource::Wgsl(include_str!("rect.wgsl").into()),
    });

    let uniform_size = std::mem::size_of::<RectUniforms>() as u64;

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("rect-bind-group-layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: std::num::NonZeroU64::new(uniform_size),
            },
            count: None,
        }],
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("rect-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("rect-vertices"),
        contents: bytemuck::cast_slice(&QUAD_VERTICES),
        usage: BufferUsages::VERTEX,
    });

    let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
    let uniform_stride = align_up(uniform_size, uniform_alignment);

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("rect-uniform-buffer"),
        size: uniform_stride * MAX_RECTS_PER_FRAME,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    // The buffer never changes, so a single bind group serves every draw
    // through its dynamic offset.
    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("rect-bind-group"),
        layout: &bind_group_layout,
        entries: &[BindGroupEntry {
            binding: 0,
            resource: BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &uniform_buffer,
                offset: 0,
                size: std::num::NonZeroU64::new(uniform_size),
            }),
        }],
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("rect-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<RectVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &vertex_attr_array![0 => Float32x2],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState::default(),
        depth_stencil: None,
        multisample: MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    RectPipeline {
        pipeline,
        vertex_buffer,
        uniform_buffer,
        bind_group,
        uniform_stride,
    }
}

fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

fn choose_present_mode(modes: &[PresentMode], vsync: bool) -> PresentMode {
    if vsync {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Fifo | PresentMode::FifoRelaxed))
            .unwrap_or(PresentMode::Fifo)
    } else {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Immediate | PresentMode::Mailbox))
            .unwrap_or(PresentMode::Fifo)
    }
}

fn choose_alpha_mode(modes: &[CompositeAlphaMode]) -> CompositeAlphaMode {
    modes
        .iter()
        .copied()
        .find(|mode| matches!(mode, CompositeAlphaMode::Opaque))
        .unwrap_or_else(|| modes.first().copied().unwrap_or(CompositeAlphaMode::Auto))
}
