use crate::assets::FontAtlas;
use crate::coords::{ClipRect, Vec2};

use super::DrawCallList;

/// Appends one textured quad per visible glyph of `text`, pen starting at
/// `origin` (top-left of the line), and returns the pen advance.
///
/// Glyph offsets, sizes and advances are multiplied by the atlas scale.
/// Missing code points use the atlas fallback; zero-sized glyphs only
/// advance the pen.
pub fn push_text(
    list: &mut DrawCallList,
    font: &FontAtlas,
    clip_rect: ClipRect,
    origin: Vec2,
    text: &str,
    color: [u8; 4],
) -> f32 {
    let scale = font.scale();
    let texture = font.texture().id;
    let mut pen_x = origin.x;

    for c in text.chars() {
        let g = font.glyph_or_fallback(c);
        if g.width > 0 && g.height > 0 {
            let min = Vec2::new(pen_x + g.x_offset * scale, origin.y + g.y_offset * scale);
            let size = Vec2::new(f32::from(g.width), f32::from(g.height)) * scale;
            list.push_quad(clip_rect, texture, min, min + size, g.uv_min, g.uv_max, color);
        }
        pen_x += g.x_advance * scale;
    }
    pen_x - origin.x
}
