use std::fmt;

/// Error returned by the bitmap and font-atlas decoders.
///
/// Bitmap checks run in a fixed order: signature, header length,
/// dimensions, pixel data bounds, then buffer allocation.
#[derive(Debug)]
pub enum DecodeError {
    /// The buffer does not start with the `BM` signature.
    InvalidSignature { found: [u8; 2] },

    /// A width or height is zero or negative.
    InvalidDimensions {
        what: &'static str,
        width: i64,
        height: i64,
    },

    /// A decode buffer could not be allocated (or its size overflows).
    AllocationFailed { bytes: usize },

    /// The source bytes could not be read.
    Io(std::io::Error),

    /// The buffer ends before a structure it must contain.
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// A glyph record addresses a slot past the table's maximum index.
    GlyphOutOfRange { code: u32, max_index: u32 },

    /// A glyph rectangle extends past the atlas bounds declared in the header.
    GlyphOutsideAtlas {
        code: u32,
        rect: (u16, u16, u16, u16),
        atlas: (u16, u16),
    },

    /// The atlas has no glyph with a non-zero height, so no scale exists.
    EmptyAtlas,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidSignature { found } => write!(
                f,
                "invalid bitmap signature {:#04x} {:#04x} (expected 'B' 'M')",
                found[0], found[1]
            ),
            DecodeError::InvalidDimensions { what, width, height } => {
                write!(f, "invalid {what} size {width}x{height}")
            }
            DecodeError::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {bytes} bytes for decoding")
            }
            DecodeError::Io(err) => write!(f, "failed to read asset: {err}"),
            DecodeError::Truncated { what, needed, available } => write!(
                f,
                "truncated {what}: needed {needed} bytes, {available} available"
            ),
            DecodeError::GlyphOutOfRange { code, max_index } => write!(
                f,
                "glyph code point {code} exceeds the atlas maximum index {max_index}"
            ),
            DecodeError::GlyphOutsideAtlas { code, rect: (x, y, w, h), atlas: (aw, ah) } => write!(
                f,
                "glyph {code} at ({x}, {y}) size {w}x{h} lies outside the {aw}x{ah} atlas"
            ),
            DecodeError::EmptyAtlas => write!(f, "font atlas contains no glyph with a height"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_message_shows_found_bytes() {
        let err = DecodeError::InvalidSignature { found: [b'P', b'K'] };
        assert_eq!(
            err.to_string(),
            "invalid bitmap signature 0x50 0x4b (expected 'B' 'M')"
        );
    }

    #[test]
    fn io_error_is_exposed_as_source() {
        let err = DecodeError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(std::error::Error::source(&DecodeError::EmptyAtlas).is_none());
    }

    #[test]
    fn outside_atlas_message_names_the_rectangle() {
        let err = DecodeError::GlyphOutsideAtlas { code: 63, rect: (30, 0, 10, 20), atlas: (32, 32) };
        assert_eq!(
            err.to_string(),
            "glyph 63 at (30, 0) size 10x20 lies outside the 32x32 atlas"
        );
    }
}
