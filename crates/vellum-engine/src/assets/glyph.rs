use crate::coords::Vec2;
use crate::error::DecodeError;

use super::font_atlas::FALLBACK_CODE;

/// Metrics and atlas location of one glyph.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    pub code: u32,
    /// Pixel size of the glyph's cell in the atlas.
    pub width: u16,
    pub height: u16,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
    /// Normalized top-left corner in the atlas.
    pub uv_min: Vec2,
    /// Normalized bottom-right corner in the atlas.
    pub uv_max: Vec2,
}

impl Glyph {
    /// Zero-metric glyph that draws nothing and advances nothing.
    pub const fn placeholder(code: u32) -> Self {
        Self {
            code,
            width: 0,
            height: 0,
            x_offset: 0.0,
            y_offset: 0.0,
            x_advance: 0.0,
            uv_min: Vec2::zero(),
            uv_max: Vec2::zero(),
        }
    }
}

/// Sparse glyph table indexed by code point.
///
/// Holds `max_index + 1` slots; an empty slot is `None`, so a missing
/// glyph is never confused with a zero-sized one.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphTable {
    slots: Vec<Option<Glyph>>,
    fallback: Glyph,
    max_height: u16,
}

impl GlyphTable {
    /// Allocates an empty table with slots `0..=max_index`.
    pub fn with_max_index(max_index: u16) -> Result<Self, DecodeError> {
        let len = usize::from(max_index) + 1;
        let mut slots = Vec::new();
        slots.try_reserve_exact(len).map_err(|_| DecodeError::AllocationFailed {
            bytes: len * std::mem::size_of::<Option<Glyph>>(),
        })?;
        slots.resize(len, None);

        Ok(Self {
            slots,
            fallback: Glyph::placeholder(FALLBACK_CODE),
            max_height: 0,
        })
    }

    /// Stores `glyph` in its code point's slot, replacing any earlier entry.
    pub fn insert(&mut self, glyph: Glyph) -> Result<(), DecodeError> {
        let max_index = self.slots.len() as u32 - 1;
        let slot = self
            .slots
            .get_mut(glyph.code as usize)
            .ok_or(DecodeError::GlyphOutOfRange { code: glyph.code, max_index })?;

        if slot.is_some() {
            log::debug!("glyph {} appears more than once; keeping the later record", glyph.code);
        }
        *slot = Some(glyph);
        self.max_height = self.max_height.max(glyph.height);
        Ok(())
    }

    /// Resolves the fallback glyph once every record has been inserted.
    pub(crate) fn finish(mut self) -> Self {
        match self.get(FALLBACK_CODE) {
            Some(glyph) => self.fallback = *glyph,
            None => {
                log::warn!("font atlas has no '?' glyph; missing glyphs will render empty");
                self.fallback = Glyph::placeholder(FALLBACK_CODE);
            }
        }
        self
    }

    /// Number of slots (`max_index + 1`).
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` only for a table without slots; see [`present_count`](Self::present_count).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, code: u32) -> Option<&Glyph> {
        self.slots.get(code as usize)?.as_ref()
    }

    /// Glyph for `code`, or the fallback when the slot is empty or out of range.
    pub fn get_or_fallback(&self, code: u32) -> &Glyph {
        self.get(code).unwrap_or(&self.fallback)
    }

    #[inline]
    pub fn fallback(&self) -> &Glyph {
        &self.fallback
    }

    /// Present glyphs in code point order.
    pub fn iter(&self) -> impl Iterator<Item = &Glyph> + '_ {
        self.slots.iter().flatten()
    }

    pub fn present_count(&self) -> usize {
        self.iter().count()
    }

    /// Tallest glyph height seen so far.
    #[inline]
    pub fn max_height(&self) -> u16 {
        self.max_height
    }
}
