use crate::coords::ScissorRect;
use crate::device::{BlendFactor, DeviceState, TextureId, VertexStream};
use crate::render::Vertex;

/// One draw captured for replay in a render pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Batch {
    /// Index of the first vertex in [`FrameRecorder::vertices`].
    pub first: u32,
    pub count: u32,
    /// Bottom-left-origin scissor, `None` when scissor testing was off.
    pub scissor: Option<ScissorRect>,
    /// `None` when texturing was off or nothing was bound.
    pub texture: Option<TextureId>,
    pub blend: Option<(BlendFactor, BlendFactor)>,
}

/// Device-independent half of the wgpu backend.
///
/// Tracks immediate-mode state and turns each draw into a [`Batch`] over a
/// frame-local vertex array. Positions are transformed to clip space here,
/// so the shader only passes them through.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    state: DeviceState,
    stream: Option<(u32, Vec<Vertex>)>,
    vertices: Vec<Vertex>,
    batches: Vec<Batch>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut DeviceState {
        &mut self.state
    }

    /// Copies the bound stream; the caller's slice need not outlive the call.
    pub fn bind(&mut self, stream: VertexStream<'_>) {
        self.stream = Some((stream.base, stream.vertices.to_vec()));
    }

    pub fn draw(&mut self, first: u32, count: u32) {
        if count == 0 {
            return;
        }
        if !self.state.vertex_arrays {
            log::warn!("draw {first}..+{count} with vertex arrays disabled; skipped");
            return;
        }
        let Some(source) = self
            .stream
            .as_ref()
            .and_then(|(base, verts)| VertexStream::new(*base, verts).slice(first, count))
        else {
            log::warn!("draw {first}..+{count} outside the bound vertex stream; skipped");
            return;
        };

        let mvp = self.state.mvp();
        let start = self.vertices.len() as u32;
        self.vertices.extend(source.iter().map(|v| Vertex {
            pos: mvp.transform_point(v.pos[0], v.pos[1]),
            ..*v
        }));

        self.batches.push(Batch {
            first: start,
            count,
            scissor: self.state.scissor_test.then_some(self.state.scissor),
            texture: self.state.bound_texture.filter(|_| self.state.texture_2d),
            blend: self.state.effective_blend(),
        });
    }

    /// Clip-space vertices of all pending batches.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Drops pending batches after they were encoded. State is kept.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.batches.clear();
    }
}

/// Converts a bottom-left-origin scissor to wgpu's top-left convention,
/// clamped to a `target` of `(width, height)`.
///
/// Returns `(x, y, w, h)`, or `None` when nothing of the box is visible.
pub fn scissor_to_target(rect: ScissorRect, target: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let (tw, th) = (i64::from(target.0), i64::from(target.1));

    let x0 = i64::from(rect.x).clamp(0, tw);
    let x1 = (i64::from(rect.x) + i64::from(rect.width)).clamp(0, tw);
    let top = (th - (i64::from(rect.y) + i64::from(rect.height))).clamp(0, th);
    let bottom = (th - i64::from(rect.y)).clamp(0, th);

    let (w, h) = (x1 - x0, bottom - top);
    if w <= 0 || h <= 0 {
        return None;
    }
    Some((x0 as u32, top as u32, w as u32, h as u32))
}
