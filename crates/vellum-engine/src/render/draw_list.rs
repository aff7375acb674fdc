use crate::coords::{ClipRect, Vec2};
use crate::device::TextureId;

use super::Vertex;

/// One textured, clipped run of triangle-list vertices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCommand {
    pub clip_rect: ClipRect,
    pub texture: TextureId,
    pub vertex_count: u32,
}

/// Vertex buffer plus the ordered commands that consume it.
///
/// Commands address vertices implicitly: the first command draws
/// `vertices[0..n0]`, the next `vertices[n0..n0 + n1]`, and so on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawCallList {
    vertices: Vec<Vertex>,
    commands: Vec<DrawCommand>,
}

impl DrawCallList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps buffers produced elsewhere. Vertex counts are not checked
    /// against `vertices`.
    pub fn from_parts(vertices: Vec<Vertex>, commands: Vec<DrawCommand>) -> Self {
        Self { vertices, commands }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Clears vertices and commands, keeping capacity for the next frame.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.commands.clear();
    }

    /// Appends a command drawing `vertices` as a triangle list.
    pub fn push(&mut self, clip_rect: ClipRect, texture: TextureId, vertices: &[Vertex]) {
        self.vertices.extend_from_slice(vertices);
        self.commands.push(DrawCommand {
            clip_rect,
            texture,
            vertex_count: vertices.len() as u32,
        });
    }

    /// Appends an axis-aligned textured quad (two triangles).
    pub fn push_quad(
        &mut self,
        clip_rect: ClipRect,
        texture: TextureId,
        min: Vec2,
        max: Vec2,
        uv_min: Vec2,
        uv_max: Vec2,
        color: [u8; 4],
    ) {
        let tl = Vertex::new([min.x, min.y], [uv_min.x, uv_min.y], color);
        let tr = Vertex::new([max.x, min.y], [uv_max.x, uv_min.y], color);
        let br = Vertex::new([max.x, max.y], [uv_max.x, uv_max.y], color);
        let bl = Vertex::new([min.x, max.y], [uv_min.x, uv_max.y], color);
        self.push(clip_rect, texture, &[tl, tr, br, tl, br, bl]);
    }
}
