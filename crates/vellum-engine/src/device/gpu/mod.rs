//! wgpu implementation of [`GraphicsDevice`].
//!
//! State calls and draws are captured by a [`FrameRecorder`]; nothing reaches
//! the GPU until [`WgpuDevice::encode`] replays the pending batches into one
//! render pass over a caller-provided target.

mod frame;
mod init;
mod pipeline;

pub use frame::{scissor_to_target, Batch, FrameRecorder};
pub use init::{headless_gpu, GpuInit};

use std::collections::HashMap;

use crate::assets::PixelBuffer;
use crate::coords::{Mat4, ScissorRect};
use crate::device::{
    BlendFactor, Capability, DeviceState, GraphicsDevice, SamplerDesc, TextureId, TransformSlot,
    VertexStream,
};
use crate::render::Vertex;

use pipeline::PipelineKey;

/// Construction parameters for [`WgpuDevice`].
#[derive(Debug, Clone)]
pub struct WgpuDeviceInit {
    /// Vertices the first vertex buffer can hold; it grows on demand.
    pub initial_vertex_capacity: usize,
    pub label: &'static str,
}

impl Default for WgpuDeviceInit {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 1024,
            label: "vellum",
        }
    }
}

/// Destination of [`WgpuDevice::encode`] (encoder + color view + its size).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        format: wgpu::TextureFormat,
        (width, height): (u32, u32),
    ) -> Self {
        Self { encoder, color_view, format, width, height }
    }
}

struct GpuTexture {
    // Kept alive for the view and bind group.
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// [`GraphicsDevice`] backed by a wgpu device and queue.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    label: &'static str,

    frame: FrameRecorder,

    textures: HashMap<TextureId, GpuTexture>,
    next_texture: u32,
    white: GpuTexture,

    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: usize,
}

impl WgpuDevice {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, init: WgpuDeviceInit) -> Self {
        let bind_group_layout = pipeline::bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vellum pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vellum draw-list shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/draw_list.wgsl").into()),
        });

        let white = upload(
            &device,
            &queue,
            &bind_group_layout,
            1,
            1,
            &[255; 4],
            SamplerDesc::default(),
        );

        let mut this = Self {
            device,
            queue,
            label: init.label,
            frame: FrameRecorder::new(),
            textures: HashMap::new(),
            next_texture: 0,
            white,
            bind_group_layout,
            pipeline_layout,
            shader,
            pipelines: HashMap::new(),
            vertex_buffer: None,
            vertex_capacity: 0,
        };
        this.ensure_vertex_capacity(init.initial_vertex_capacity);
        this
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Draws captured since the last [`encode`](Self::encode).
    #[inline]
    pub fn pending(&self) -> &[Batch] {
        self.frame.batches()
    }

    /// Replays pending draws into `target`, preserving its contents, and
    /// clears them. Batches whose scissor misses the target are skipped.
    pub fn encode(&mut self, target: &mut RenderTarget<'_>) {
        if self.frame.is_empty() {
            return;
        }

        self.ensure_vertex_capacity(self.frame.vertices().len());
        for batch in self.frame.batches() {
            let key = (target.format, batch.blend);
            if !self.pipelines.contains_key(&key) {
                let p = pipeline::create_pipeline(&self.device, &self.shader, &self.pipeline_layout, key);
                self.pipelines.insert(key, p);
            }
        }

        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else { return; };
        self.queue
            .write_buffer(vertex_buffer, 0, bytemuck::cast_slice(self.frame.vertices()));

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vellum draw-list pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));

        let size = (target.width, target.height);
        let mut drawn = 0usize;
        for batch in self.frame.batches() {
            let rect = match batch.scissor {
                Some(s) => scissor_to_target(s, size),
                None => Some((0, 0, size.0, size.1)).filter(|_| size.0 > 0 && size.1 > 0),
            };
            let Some((x, y, w, h)) = rect else { continue; };
            let Some(pipeline) = self.pipelines.get(&(target.format, batch.blend)) else { continue; };

            let texture = match batch.texture {
                Some(id) => self.textures.get(&id).unwrap_or_else(|| {
                    log::warn!("{}: draw with unknown texture {id:?}; using white", self.label);
                    &self.white
                }),
                None => &self.white,
            };

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &texture.bind_group, &[]);
            rpass.set_scissor_rect(x, y, w, h);
            rpass.draw(batch.first..batch.first + batch.count, 0..1);
            drawn += 1;
        }
        drop(rpass);

        log::trace!(
            "{}: encoded {drawn}/{} batches, {} vertices",
            self.label,
            self.frame.batches().len(),
            self.frame.vertices().len()
        );
        self.frame.clear();
    }

    fn ensure_vertex_capacity(&mut self, required: usize) {
        if required <= self.vertex_capacity && self.vertex_buffer.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        self.vertex_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vellum vertex buffer"),
            size: (new_cap * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vertex_capacity = new_cap;
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    width: u32,
    height: u32,
    rgba: &[u8],
    sampler: SamplerDesc,
) -> GpuTexture {
    let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("vellum texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&pipeline::sampler_descriptor(sampler));
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("vellum texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    });

    GpuTexture { _texture: texture, bind_group }
}

impl GraphicsDevice for WgpuDevice {
    fn create_texture(&mut self, pixels: &PixelBuffer, sampler: SamplerDesc) -> TextureId {
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        let texture = upload(
            &self.device,
            &self.queue,
            &self.bind_group_layout,
            pixels.width(),
            pixels.height(),
            pixels.as_bytes(),
            sampler,
        );
        self.textures.insert(id, texture);
        id
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_none() {
            log::warn!("{}: destroy of unknown texture {id:?}", self.label);
        }
    }

    fn state(&self) -> DeviceState {
        *self.frame.state()
    }

    fn restore_state(&mut self, state: &DeviceState) {
        *self.frame.state_mut() = *state;
    }

    fn set_capability(&mut self, cap: Capability, enabled: bool) {
        self.frame.state_mut().set_capability(cap, enabled);
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.frame.state_mut().blend_func = (src, dst);
    }

    fn set_transform(&mut self, slot: TransformSlot, matrix: Mat4) {
        self.frame.state_mut().set_transform(slot, matrix);
    }

    fn bind_vertices(&mut self, stream: VertexStream<'_>) {
        self.frame.bind(stream);
    }

    fn set_scissor(&mut self, rect: ScissorRect) {
        self.frame.state_mut().scissor = rect;
    }

    fn bind_texture(&mut self, id: TextureId) {
        self.frame.state_mut().bound_texture = Some(id);
    }

    fn draw_triangles(&mut self, first: u32, count: u32) {
        self.frame.draw(first, count);
    }
}
