/// Clip rectangle of a draw command, in screen pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClipRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl ClipRect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Converts to a device scissor box for a framebuffer `viewport_height`
    /// pixels tall.
    ///
    /// The vertical axis is flipped: `y = viewport_height - (clip.y + clip.h)`.
    /// Components are truncated toward zero, the bottom edge after summing.
    /// The flipped `y` saturates at the `i32` range.
    #[inline]
    pub fn to_scissor(self, viewport_height: u32) -> ScissorRect {
        let bottom = (self.y + self.h) as i32;
        let y = i64::from(viewport_height) - i64::from(bottom);
        ScissorRect {
            x: self.x as i32,
            y: y.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            width: self.w as i32,
            height: self.h as i32,
        }
    }
}

/// Device scissor box in pixels with a bottom-left origin.
///
/// Width/height may be negative when the source clip rect was malformed;
/// backends decide how to treat such boxes.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScissorRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}
