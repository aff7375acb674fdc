use std::collections::BTreeMap;

use crate::assets::PixelBuffer;
use crate::coords::{Mat4, ScissorRect};
use crate::render::Vertex;

use super::{
    BlendFactor, Capability, DeviceState, GraphicsDevice, SamplerDesc, TextureId, TransformSlot,
    VertexStream,
};

/// One call made against a [`RecordingDevice`], in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateTexture {
        id: TextureId,
        width: u32,
        height: u32,
        sampler: SamplerDesc,
    },
    DestroyTexture(TextureId),
    RestoreState,
    SetCapability {
        cap: Capability,
        enabled: bool,
    },
    SetBlendFunc {
        src: BlendFactor,
        dst: BlendFactor,
    },
    SetTransform {
        slot: TransformSlot,
        matrix: Mat4,
    },
    BindVertices {
        base: u32,
        count: u32,
        stride: u32,
    },
    SetScissor(ScissorRect),
    BindTexture(TextureId),
    DrawTriangles {
        first: u32,
        count: u32,
    },
}

/// A texture held by a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTexture {
    pub pixels: PixelBuffer,
    pub sampler: SamplerDesc,
}

/// A triangle draw together with the state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub first: u32,
    pub count: u32,
    /// `None` when scissor testing was disabled.
    pub scissor: Option<ScissorRect>,
    /// `None` when 2D texturing was disabled or nothing was bound.
    pub texture: Option<TextureId>,
    pub blend: Option<(BlendFactor, BlendFactor)>,
    /// Vertices the draw consumed; empty if the range was not bound.
    pub vertices: Vec<Vertex>,
}

/// In-memory [`GraphicsDevice`].
///
/// Tracks state exactly as an immediate-mode context would, keeps uploaded
/// pixels, and records every call. Useful as a test double and for headless
/// inspection of render passes.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: DeviceState,
    calls: Vec<DeviceCall>,
    draws: Vec<RecordedDraw>,
    textures: BTreeMap<TextureId, RecordedTexture>,
    stream: Option<(u32, Vec<Vertex>)>,
    next_texture: u32,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded since creation (or the last [`clear_log`](Self::clear_log)).
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Forgets recorded calls and draws; textures and state are kept.
    pub fn clear_log(&mut self) {
        self.calls.clear();
        self.draws.clear();
    }

    pub fn texture(&self, id: TextureId) -> Option<&RecordedTexture> {
        self.textures.get(&id)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_texture(&mut self, pixels: &PixelBuffer, sampler: SamplerDesc) -> TextureId {
        // Id 0 stays reserved for "no texture".
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        self.calls.push(DeviceCall::CreateTexture {
            id,
            width: pixels.width(),
            height: pixels.height(),
            sampler,
        });
        self.textures.insert(id, RecordedTexture { pixels: pixels.clone(), sampler });
        id
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.calls.push(DeviceCall::DestroyTexture(id));
        if self.textures.remove(&id).is_none() {
            log::warn!("RecordingDevice: destroy of unknown texture {id:?}");
        }
    }

    fn state(&self) -> DeviceState {
        self.state
    }

    fn restore_state(&mut self, state: &DeviceState) {
        self.calls.push(DeviceCall::RestoreState);
        self.state = *state;
    }

    fn set_capability(&mut self, cap: Capability, enabled: bool) {
        self.calls.push(DeviceCall::SetCapability { cap, enabled });
        self.state.set_capability(cap, enabled);
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.calls.push(DeviceCall::SetBlendFunc { src, dst });
        self.state.blend_func = (src, dst);
    }

    fn set_transform(&mut self, slot: TransformSlot, matrix: Mat4) {
        self.calls.push(DeviceCall::SetTransform { slot, matrix });
        self.state.set_transform(slot, matrix);
    }

    fn bind_vertices(&mut self, stream: VertexStream<'_>) {
        self.calls.push(DeviceCall::BindVertices {
            base: stream.base,
            count: stream.vertices.len() as u32,
            stride: stream.layout.stride,
        });
        self.stream = Some((stream.base, stream.vertices.to_vec()));
    }

    fn set_scissor(&mut self, rect: ScissorRect) {
        self.calls.push(DeviceCall::SetScissor(rect));
        self.state.scissor = rect;
    }

    fn bind_texture(&mut self, id: TextureId) {
        self.calls.push(DeviceCall::BindTexture(id));
        self.state.bound_texture = Some(id);
    }

    fn draw_triangles(&mut self, first: u32, count: u32) {
        self.calls.push(DeviceCall::DrawTriangles { first, count });

        let vertices = self
            .stream
            .as_ref()
            .filter(|_| self.state.vertex_arrays)
            .and_then(|(base, verts)| VertexStream::new(*base, verts).slice(first, count))
            .map(<[Vertex]>::to_vec);
        if vertices.is_none() && count > 0 {
            log::warn!("RecordingDevice: draw {first}..+{count} outside the bound vertex stream");
        }

        self.draws.push(RecordedDraw {
            first,
            count,
            scissor: self.state.scissor_test.then_some(self.state.scissor),
            texture: self.state.bound_texture.filter(|_| self.state.texture_2d),
            blend: self.state.effective_blend(),
            vertices: vertices.unwrap_or_default(),
        });
    }
}
