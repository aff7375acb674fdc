use crate::coords::{Mat4, ScissorRect};

use super::TextureId;

/// Toggleable device capabilities.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Capability {
    Blend,
    CullFace,
    DepthTest,
    ScissorTest,
    Texture2d,
    /// Position/UV/color vertex streams are read by draws.
    VertexArrays,
}

/// Blend factors understood by every backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

/// Transform slot addressed by [`GraphicsDevice::set_transform`].
///
/// [`GraphicsDevice::set_transform`]: super::GraphicsDevice::set_transform
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransformSlot {
    Projection,
    Model,
}

/// Snapshot of all device state the renderer touches.
///
/// Defaults match a freshly created immediate-mode context: every capability
/// off, blend function `(One, Zero)`, identity transforms, nothing bound.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DeviceState {
    pub blend: bool,
    pub blend_func: (BlendFactor, BlendFactor),
    pub cull_face: bool,
    pub depth_test: bool,
    pub scissor_test: bool,
    pub scissor: ScissorRect,
    pub texture_2d: bool,
    pub vertex_arrays: bool,
    pub bound_texture: Option<TextureId>,
    pub projection: Mat4,
    pub model: Mat4,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            blend: false,
            blend_func: (BlendFactor::One, BlendFactor::Zero),
            cull_face: false,
            depth_test: false,
            scissor_test: false,
            scissor: ScissorRect::default(),
            texture_2d: false,
            vertex_arrays: false,
            bound_texture: None,
            projection: Mat4::identity(),
            model: Mat4::identity(),
        }
    }
}

impl DeviceState {
    pub fn capability(&self, cap: Capability) -> bool {
        match cap {
            Capability::Blend => self.blend,
            Capability::CullFace => self.cull_face,
            Capability::DepthTest => self.depth_test,
            Capability::ScissorTest => self.scissor_test,
            Capability::Texture2d => self.texture_2d,
            Capability::VertexArrays => self.vertex_arrays,
        }
    }

    pub fn set_capability(&mut self, cap: Capability, enabled: bool) {
        let flag = match cap {
            Capability::Blend => &mut self.blend,
            Capability::CullFace => &mut self.cull_face,
            Capability::DepthTest => &mut self.depth_test,
            Capability::ScissorTest => &mut self.scissor_test,
            Capability::Texture2d => &mut self.texture_2d,
            Capability::VertexArrays => &mut self.vertex_arrays,
        };
        *flag = enabled;
    }

    pub fn set_transform(&mut self, slot: TransformSlot, matrix: Mat4) {
        match slot {
            TransformSlot::Projection => self.projection = matrix,
            TransformSlot::Model => self.model = matrix,
        }
    }

    /// Combined `projection · model` transform.
    #[inline]
    pub fn mvp(&self) -> Mat4 {
        self.projection.mul(&self.model)
    }

    /// Blend function in effect for draws, or `None` when blending is off.
    #[inline]
    pub fn effective_blend(&self) -> Option<(BlendFactor, BlendFactor)> {
        self.blend.then_some(self.blend_func)
    }
}
