//! Coordinate and geometry types shared by the decoders, renderer and devices.
//!
//! Screen space:
//! - pixels, origin top-left
//! - +X right, +Y down
//!
//! Device scissor space is the one exception: its origin is bottom-left, as
//! immediate-mode 2D devices expect. [`ClipRect::to_scissor`] converts.

mod rect;
mod transform;
mod vec2;
mod viewport;

pub use rect::{ClipRect, ScissorRect};
pub use transform::Mat4;
pub use vec2::Vec2;
pub use viewport::Viewport;
