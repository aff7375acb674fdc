//! Asset decoders.
//!
//! - [`bitmap`]: packed 32-bit bitmap images → canonical RGBA8 pixels → textures
//! - [`font_atlas`]: bitmap-font atlases (glyph metrics + embedded bitmap)
//!
//! On-disk structures are described in [`formats`] and read through
//! [`crate::layout`].

pub mod bitmap;
pub mod font_atlas;
pub mod formats;
mod glyph;
mod pixels;

pub use bitmap::{decode_bitmap, encode_bitmap, load_bitmap_file, upload_bitmap};
pub use font_atlas::{parse_font_atlas, AtlasHeader, FontAtlas, ParsedAtlas, FALLBACK_CODE};
pub use glyph::{Glyph, GlyphTable};
pub use pixels::PixelBuffer;
