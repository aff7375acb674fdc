//! Bitmap-font atlas decoding.
//!
//! An atlas file is an 8-byte header, `glyph_count` fixed-size glyph
//! records, and the atlas image itself as an embedded bitmap.

use std::path::Path;

use crate::coords::Vec2;
use crate::device::{GraphicsDevice, SamplerDesc, Texture};
use crate::error::DecodeError;

use super::formats::{atlas, glyph};
use super::{decode_bitmap, Glyph, GlyphTable, PixelBuffer};

/// Code point used for glyphs missing from the atlas.
pub const FALLBACK_CODE: u32 = '?' as u32;

/// Atlas header fields.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AtlasHeader {
    pub glyph_count: u16,
    pub max_index: u16,
    pub width: u16,
    pub height: u16,
}

/// Result of [`parse_font_atlas`]: everything in the file, nothing uploaded.
#[derive(Debug, Clone)]
pub struct ParsedAtlas {
    pub header: AtlasHeader,
    pub glyphs: GlyphTable,
    pub image: PixelBuffer,
}

/// Decodes an atlas file without touching a device.
pub fn parse_font_atlas(bytes: &[u8]) -> Result<ParsedAtlas, DecodeError> {
    let rec = atlas::HEADER.record(bytes, 0)?;
    let header = AtlasHeader {
        glyph_count: rec.get(&atlas::GLYPH_COUNT),
        max_index: rec.get(&atlas::MAX_INDEX),
        width: rec.get(&atlas::ATLAS_WIDTH),
        height: rec.get(&atlas::ATLAS_HEIGHT),
    };
    if header.width == 0 || header.height == 0 {
        return Err(DecodeError::InvalidDimensions {
            what: "font atlas",
            width: i64::from(header.width),
            height: i64::from(header.height),
        });
    }

    let mut glyphs = GlyphTable::with_max_index(header.max_index)?;
    let (atlas_w, atlas_h) = (f32::from(header.width), f32::from(header.height));

    let mut at = atlas::HEADER.size;
    for _ in 0..header.glyph_count {
        let rec = glyph::RECORD.record(bytes, at)?;
        at += glyph::RECORD.size;

        let code = u32::from(rec.get(&glyph::CODE));
        let (gx, gy) = (rec.get(&glyph::X), rec.get(&glyph::Y));
        let (width, height) = (rec.get(&glyph::WIDTH), rec.get(&glyph::HEIGHT));
        if u32::from(gx) + u32::from(width) > u32::from(header.width)
            || u32::from(gy) + u32::from(height) > u32::from(header.height)
        {
            return Err(DecodeError::GlyphOutsideAtlas {
                code,
                rect: (gx, gy, width, height),
                atlas: (header.width, header.height),
            });
        }

        let (x, y) = (f32::from(gx), f32::from(gy));
        glyphs.insert(Glyph {
            code,
            width,
            height,
            x_offset: rec.get(&glyph::X_OFFSET),
            y_offset: rec.get(&glyph::Y_OFFSET),
            x_advance: rec.get(&glyph::X_ADVANCE),
            uv_min: Vec2::new(x / atlas_w, y / atlas_h),
            uv_max: Vec2::new((x + f32::from(width)) / atlas_w, (y + f32::from(height)) / atlas_h),
        })?;
    }

    if glyphs.max_height() == 0 {
        return Err(DecodeError::EmptyAtlas);
    }

    let image = decode_bitmap(&bytes[at..])?;
    if image.width() != u32::from(header.width) || image.height() != u32::from(header.height) {
        log::warn!(
            "font atlas header says {}x{} but the embedded image is {}x{}",
            header.width,
            header.height,
            image.width(),
            image.height()
        );
    }

    Ok(ParsedAtlas { header, glyphs: glyphs.finish(), image })
}

/// A loaded bitmap font: glyph table plus its atlas texture.
///
/// Immutable once loaded. The texture is owned by the atlas and released
/// with [`FontAtlas::release`].
#[derive(Debug)]
pub struct FontAtlas {
    height: f32,
    scale: f32,
    texture: Texture,
    atlas_size: (u16, u16),
    glyphs: GlyphTable,
}

impl FontAtlas {
    /// Decodes `bytes` and uploads the atlas image, scaling glyphs so the
    /// tallest one is `height` pixels.
    pub fn load<D>(device: &mut D, bytes: &[u8], height: f32) -> Result<Self, DecodeError>
    where
        D: GraphicsDevice + ?Sized,
    {
        let parsed = parse_font_atlas(bytes)?;
        Self::from_parsed(device, parsed, height)
    }

    pub fn load_file<D>(device: &mut D, path: impl AsRef<Path>, height: f32) -> Result<Self, DecodeError>
    where
        D: GraphicsDevice + ?Sized,
    {
        let bytes = std::fs::read(path.as_ref())?;
        Self::load(device, &bytes, height)
    }

    /// Uploads an already parsed atlas.
    ///
    /// Fails with [`DecodeError::EmptyAtlas`] before touching the device when
    /// no glyph has a height.
    pub fn from_parsed<D>(device: &mut D, parsed: ParsedAtlas, height: f32) -> Result<Self, DecodeError>
    where
        D: GraphicsDevice + ?Sized,
    {
        let ParsedAtlas { header, glyphs, image } = parsed;
        if glyphs.max_height() == 0 {
            return Err(DecodeError::EmptyAtlas);
        }
        let id = device.create_texture(&image, SamplerDesc::default());
        let texture = Texture { id, width: image.width(), height: image.height() };
        let scale = height / f32::from(glyphs.max_height());

        log::debug!(
            "loaded font atlas: {} glyphs, {}x{} texture {:?}, scale {scale}",
            glyphs.present_count(),
            texture.width,
            texture.height,
            texture.id
        );

        Ok(Self {
            height,
            scale,
            texture,
            atlas_size: (header.width, header.height),
            glyphs,
        })
    }

    /// Requested line height in pixels.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// `height / tallest glyph height`.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn texture(&self) -> Texture {
        self.texture
    }

    /// Atlas dimensions as declared by the header.
    #[inline]
    pub fn atlas_size(&self) -> (u16, u16) {
        self.atlas_size
    }

    #[inline]
    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }

    pub fn glyph(&self, code: u32) -> Option<&Glyph> {
        self.glyphs.get(code)
    }

    pub fn glyph_or_fallback(&self, c: char) -> &Glyph {
        self.glyphs.get_or_fallback(c as u32)
    }

    /// Scaled advance width of `text`.
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| self.glyph_or_fallback(c).x_advance * self.scale)
            .sum()
    }

    /// Destroys the atlas texture.
    pub fn release<D>(self, device: &mut D)
    where
        D: GraphicsDevice + ?Sized,
    {
        device.destroy_texture(self.texture.id);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assets::bitmap::tests::synthetic_bitmap;
    use crate::device::{DeviceCall, RecordingDevice};

    /// `(code, x, y, w, h, x_offset, y_offset, x_advance)`
    pub(crate) type RawGlyph = (u16, u16, u16, u16, u16, f32, f32, f32);

    pub(crate) fn synthetic_atlas(max_index: u16, size: (u16, u16), records: &[RawGlyph]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(records.len() as u16).to_le_bytes());
        out.extend_from_slice(&max_index.to_le_bytes());
        out.extend_from_slice(&size.0.to_le_bytes());
        out.extend_from_slice(&size.1.to_le_bytes());
        for &(code, x, y, w, h, xo, yo, adv) in records {
            for v in [code, x, y, w, h] {
                out.extend_from_slice(&v.to_le_bytes());
            }
            for v in [xo, yo, adv] {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out.extend_from_slice(&synthetic_bitmap(u32::from(size.0), u32::from(size.1)));
        out
    }

    pub(crate) fn sample_records() -> Vec<RawGlyph> {
        vec![
            (65, 0, 0, 10, 20, 0.0, 1.0, 11.0),
            (63, 10, 0, 8, 16, 1.0, 2.0, 9.0),
            (32, 0, 20, 0, 0, 0.0, 0.0, 5.0),
        ]
    }

    #[test]
    fn table_has_max_index_plus_one_entries() {
        let parsed = parse_font_atlas(&synthetic_atlas(127, (32, 32), &sample_records())).unwrap();
        assert_eq!(parsed.glyphs.len(), 128);
        assert_eq!(parsed.glyphs.present_count(), 3);
        assert_eq!(
            parsed.header,
            AtlasHeader { glyph_count: 3, max_index: 127, width: 32, height: 32 }
        );
        assert_eq!((parsed.image.width(), parsed.image.height()), (32, 32));
    }

    #[test]
    fn uvs_are_normalized_by_atlas_size() {
        let parsed = parse_font_atlas(&synthetic_atlas(127, (32, 40), &sample_records())).unwrap();
        for g in parsed.glyphs.iter() {
            assert!(g.uv_min.is_normalized() && g.uv_max.is_normalized(), "{g:?}");
        }
        let q = parsed.glyphs.get('?' as u32).unwrap();
        assert_eq!(q.uv_min, Vec2::new(10.0 / 32.0, 0.0));
        assert_eq!(q.uv_max, Vec2::new(18.0 / 32.0, 16.0 / 40.0));
    }

    #[test]
    fn fallback_is_the_question_mark_record() {
        let mut device = RecordingDevice::new();
        let font = FontAtlas::load(&mut device, &synthetic_atlas(127, (32, 32), &sample_records()), 16.0)
            .unwrap();
        let q = *font.glyph('?' as u32).unwrap();
        assert_eq!(font.glyphs().fallback(), &q);
        assert_eq!(font.glyph_or_fallback('z'), &q);
        assert_eq!(font.glyph_or_fallback('\u{1F600}'), &q);
    }

    #[test]
    fn scale_is_height_over_tallest_glyph() {
        let mut device = RecordingDevice::new();
        let font = FontAtlas::load(&mut device, &synthetic_atlas(127, (32, 32), &sample_records()), 16.0)
            .unwrap();
        assert_eq!(font.scale(), 0.8);
        assert_eq!(font.height(), 16.0);
        assert_eq!(font.atlas_size(), (32, 32));
        let s = font.scale();
        assert_eq!(font.text_width("A?"), 11.0 * s + 9.0 * s);
        // Missing glyphs advance like '?'.
        assert_eq!(font.text_width("zz"), 9.0 * s + 9.0 * s);
    }

    #[test]
    fn records_may_arrive_in_any_order() {
        let mut reversed = sample_records();
        reversed.reverse();
        let a = parse_font_atlas(&synthetic_atlas(127, (32, 32), &sample_records())).unwrap();
        let b = parse_font_atlas(&synthetic_atlas(127, (32, 32), &reversed)).unwrap();
        assert_eq!(a.glyphs, b.glyphs);
    }

    #[test]
    fn absent_question_mark_synthesizes_fallback() {
        let records = [(65, 0, 0, 10, 20, 0.0, 0.0, 11.0)];
        let parsed = parse_font_atlas(&synthetic_atlas(127, (32, 32), &records)).unwrap();
        assert_eq!(parsed.glyphs.fallback(), &Glyph::placeholder(FALLBACK_CODE));
    }

    #[test]
    fn zero_glyphs_is_an_empty_atlas() {
        let err = parse_font_atlas(&synthetic_atlas(127, (32, 32), &[])).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyAtlas));
    }

    #[test]
    fn all_zero_height_glyphs_is_an_empty_atlas() {
        let records = [(32, 0, 0, 0, 0, 0.0, 0.0, 5.0)];
        let err = parse_font_atlas(&synthetic_atlas(127, (32, 32), &records)).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyAtlas));
    }

    #[test]
    fn out_of_range_code_is_rejected() {
        let records = [(200, 0, 0, 4, 4, 0.0, 0.0, 4.0)];
        match parse_font_atlas(&synthetic_atlas(127, (32, 32), &records)) {
            Err(DecodeError::GlyphOutOfRange { code, max_index }) => {
                assert_eq!((code, max_index), (200, 127));
            }
            other => panic!("expected GlyphOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn glyph_past_atlas_edge_is_rejected() {
        let records = [(63, 30, 0, 10, 20, 0.0, 0.0, 9.0)];
        match parse_font_atlas(&synthetic_atlas(127, (32, 32), &records)) {
            Err(DecodeError::GlyphOutsideAtlas { code, rect, atlas }) => {
                assert_eq!((code, rect, atlas), (63, (30, 0, 10, 20), (32, 32)));
            }
            other => panic!("expected GlyphOutsideAtlas, got {other:?}"),
        }

        let records = [(65, 0, 20, 4, 13, 0.0, 0.0, 4.0)];
        assert!(matches!(
            parse_font_atlas(&synthetic_atlas(127, (32, 32), &records)),
            Err(DecodeError::GlyphOutsideAtlas { code: 65, .. })
        ));
    }

    #[test]
    fn glyph_touching_atlas_edge_is_accepted() {
        let records = [(63, 22, 12, 10, 20, 0.0, 0.0, 9.0)];
        let parsed = parse_font_atlas(&synthetic_atlas(127, (32, 32), &records)).unwrap();
        let q = parsed.glyphs.get('?' as u32).unwrap();
        assert_eq!(q.uv_max, Vec2::new(1.0, 1.0));
        assert!(q.uv_min.is_normalized());
    }

    #[test]
    fn from_parsed_rejects_table_without_heights() {
        let parsed = ParsedAtlas {
            header: AtlasHeader { glyph_count: 0, max_index: 127, width: 4, height: 4 },
            glyphs: GlyphTable::with_max_index(127).unwrap(),
            image: decode_bitmap(&synthetic_bitmap(4, 4)).unwrap(),
        };
        let mut device = RecordingDevice::new();
        let err = FontAtlas::from_parsed(&mut device, parsed, 16.0).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyAtlas));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn zero_atlas_dimensions_are_rejected() {
        let mut bytes = synthetic_atlas(127, (32, 32), &sample_records());
        bytes[4..6].copy_from_slice(&0u16.to_le_bytes());
        assert!(matches!(
            parse_font_atlas(&bytes),
            Err(DecodeError::InvalidDimensions { what: "font atlas", width: 0, .. })
        ));
    }

    #[test]
    fn truncated_inputs_are_reported() {
        assert!(matches!(
            parse_font_atlas(&[3, 0, 127]),
            Err(DecodeError::Truncated { what: "font atlas header", .. })
        ));

        let bytes = synthetic_atlas(127, (32, 32), &sample_records());
        assert!(matches!(
            parse_font_atlas(&bytes[..8 + 22 + 10]),
            Err(DecodeError::Truncated { what: "glyph record", needed: 52, .. })
        ));
    }

    #[test]
    fn embedded_image_errors_propagate() {
        let mut bytes = synthetic_atlas(127, (32, 32), &sample_records());
        let image_start = 8 + 3 * 22;
        bytes[image_start] = b'X';
        assert!(matches!(
            parse_font_atlas(&bytes),
            Err(DecodeError::InvalidSignature { found: [b'X', b'M'] })
        ));
    }

    #[test]
    fn load_uploads_once_and_release_destroys() {
        let mut device = RecordingDevice::new();
        let font = FontAtlas::load(&mut device, &synthetic_atlas(127, (40, 24), &sample_records()), 10.0)
            .unwrap();
        let tex = font.texture();
        assert_eq!((tex.width, tex.height), (40, 24));
        assert_eq!(device.texture_count(), 1);

        font.release(&mut device);
        assert_eq!(device.texture_count(), 0);
        assert_eq!(device.calls().last(), Some(&DeviceCall::DestroyTexture(tex.id)));
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.atlas");
        std::fs::write(&path, synthetic_atlas(127, (32, 32), &sample_records())).unwrap();

        let mut device = RecordingDevice::new();
        let font = FontAtlas::load_file(&mut device, &path, 20.0).unwrap();
        assert_eq!(font.scale(), 1.0);
        assert!(font.glyph(65).is_some());

        let missing = FontAtlas::load_file(&mut device, dir.path().join("nope"), 20.0);
        assert!(matches!(missing, Err(DecodeError::Io(_))));
    }
}
