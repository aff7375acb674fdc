use bytemuck::{Pod, Zeroable};

/// Interleaved UI vertex (20 bytes).
///
///  offset  0  pos    [f32; 2]   screen pixels
///  offset  8  uv     [f32; 2]   normalized texture coordinates
///  offset 16  color  [u8; 4]    RGBA
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

/// Byte stride and per-stream offsets of an interleaved vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    pub stride: u32,
    pub position_offset: u32,
    pub uv_offset: u32,
    pub color_offset: u32,
}

impl Vertex {
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: core::mem::size_of::<Vertex>() as u32,
        position_offset: core::mem::offset_of!(Vertex, pos) as u32,
        uv_offset: core::mem::offset_of!(Vertex, uv) as u32,
        color_offset: core::mem::offset_of!(Vertex, color) as u32,
    };

    #[inline]
    pub const fn new(pos: [f32; 2], uv: [f32; 2], color: [u8; 4]) -> Self {
        Self { pos, uv, color }
    }
}
