//! Draw-list rendering.
//!
//! The external UI core produces one or more [`DrawCallList`]s per frame;
//! [`render_draw_lists`] consumes them once, in order, against a
//! [`GraphicsDevice`](crate::device::GraphicsDevice).
//!
//! Convention:
//! - vertex positions are screen pixels (top-left origin, +Y down)
//! - commands consume vertices sequentially; nothing is indexed or revisited

mod draw_list;
mod renderer;
mod text;
mod vertex;

pub use draw_list::{DrawCallList, DrawCommand};
pub use renderer::{render_draw_lists, RenderStats};
pub use text::push_text;
pub use vertex::{Vertex, VertexLayout};
