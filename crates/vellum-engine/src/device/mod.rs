//! Graphics device boundary.
//!
//! The renderer and decoders talk to an immediate-mode 2D device through
//! [`GraphicsDevice`]. The device is a single mutable resource: state set by
//! one caller stays set until changed, so callers that must leave it as found
//! wrap their work in a [`StateGuard`].
//!
//! Implementations:
//! - [`RecordingDevice`]: in-memory state machine that logs every call
//! - [`gpu::WgpuDevice`]: wgpu backend that replays draws into a render pass

mod guard;
mod recording;
mod state;
mod texture;

pub mod gpu;

pub use guard::StateGuard;
pub use recording::{DeviceCall, RecordedDraw, RecordedTexture, RecordingDevice};
pub use state::{BlendFactor, Capability, DeviceState, TransformSlot};
pub use texture::{FilterMode, SamplerDesc, Texture, TextureId, WrapMode};

use crate::assets::PixelBuffer;
use crate::coords::{Mat4, ScissorRect};
use crate::render::{Vertex, VertexLayout};

/// Vertices bound for subsequent draws.
///
/// `base` is the global index of `vertices[0]`: a draw starting at `first`
/// reads `vertices[first - base..]`. Consecutive lists bound with growing
/// bases behave as one contiguous stream.
#[derive(Debug, Copy, Clone)]
pub struct VertexStream<'a> {
    pub base: u32,
    pub vertices: &'a [Vertex],
    pub layout: VertexLayout,
}

impl<'a> VertexStream<'a> {
    #[inline]
    pub fn new(base: u32, vertices: &'a [Vertex]) -> Self {
        Self { base, vertices, layout: Vertex::LAYOUT }
    }

    /// Resolves the global range `first..first + count` to local vertices.
    pub fn slice(&self, first: u32, count: u32) -> Option<&'a [Vertex]> {
        let start = first.checked_sub(self.base)? as usize;
        let end = start.checked_add(count as usize)?;
        self.vertices.get(start..end)
    }
}

/// Immediate-mode 2D graphics device.
///
/// All methods are infallible: like the devices they model, misuse is
/// reported through logging and otherwise ignored.
pub trait GraphicsDevice {
    /// Uploads canonical RGBA8 pixels as a new 2D texture.
    fn create_texture(&mut self, pixels: &PixelBuffer, sampler: SamplerDesc) -> TextureId;

    /// Releases a texture. Releasing an unknown id is ignored.
    fn destroy_texture(&mut self, id: TextureId);

    /// Returns a snapshot of the current state.
    fn state(&self) -> DeviceState;

    /// Replaces the current state with `state`.
    fn restore_state(&mut self, state: &DeviceState);

    fn set_capability(&mut self, cap: Capability, enabled: bool);

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    fn set_transform(&mut self, slot: TransformSlot, matrix: Mat4);

    fn bind_vertices(&mut self, stream: VertexStream<'_>);

    fn set_scissor(&mut self, rect: ScissorRect);

    fn bind_texture(&mut self, id: TextureId);

    /// Draws `count` vertices as a triangle list starting at global index `first`.
    fn draw_triangles(&mut self, first: u32, count: u32);
}
