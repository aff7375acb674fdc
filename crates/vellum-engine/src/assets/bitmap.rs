//! Packed 32-bit bitmap decoding and encoding.
//!
//! Source pixels are 4 bytes in A, R, G, B order and rows are stored
//! bottom-up. Decoding remaps each pixel to canonical R, G, B, A and flips
//! rows so row 0 is the top of the image.

use std::path::Path;

use crate::device::{GraphicsDevice, SamplerDesc, Texture};
use crate::error::DecodeError;

use super::formats::bitmap::{
    BITS_PER_PIXEL, COMPRESSION, FILE_HEADER, FILE_SIZE, HEADER, HEIGHT, IMAGE_SIZE,
    INFO_HEADER_SIZE, INFO_SIZE, MAGIC, PIXEL_OFFSET, PLANES, WIDTH,
};
use super::pixels::alloc_zeroed;
use super::PixelBuffer;

/// File signature.
pub const SIGNATURE: [u8; 2] = *b"BM";

const BYTES_PER_PIXEL: usize = 4;

/// Decodes a packed bitmap into a canonical top-down RGBA8 buffer.
///
/// Checks run in order: signature, header length, dimensions, buffer size,
/// pixel data bounds, allocation. Nothing is allocated before the signature
/// and header have been accepted.
pub fn decode_bitmap(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let found = [
        bytes.first().copied().unwrap_or(0),
        bytes.get(1).copied().unwrap_or(0),
    ];
    if found != SIGNATURE {
        return Err(DecodeError::InvalidSignature { found });
    }

    let header = HEADER.record(bytes, 0)?;
    debug_assert_eq!(header.get(&MAGIC), SIGNATURE);

    let width = header.get(&WIDTH);
    let height = header.get(&HEIGHT);
    if width <= 0 || height <= 0 {
        return Err(DecodeError::InvalidDimensions {
            what: "bitmap",
            width: i64::from(width),
            height: i64::from(height),
        });
    }

    let (w, h) = (width as usize, height as usize);
    let row_bytes = w * BYTES_PER_PIXEL;
    let total = row_bytes
        .checked_mul(h)
        .ok_or(DecodeError::AllocationFailed { bytes: usize::MAX })?;

    let offset = header.get(&PIXEL_OFFSET) as usize;
    let source = offset
        .checked_add(total)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(DecodeError::Truncated {
            what: "bitmap pixel data",
            needed: offset.saturating_add(total),
            available: bytes.len(),
        })?;

    let mut target = alloc_zeroed(total)?;

    // Source row 0 is the bottom row; fill the target from its last row up.
    let dst_rows = target.chunks_exact_mut(row_bytes).rev();
    for (src_row, dst_row) in source.chunks_exact(row_bytes).zip(dst_rows) {
        let pixels = src_row
            .chunks_exact(BYTES_PER_PIXEL)
            .zip(dst_row.chunks_exact_mut(BYTES_PER_PIXEL));
        for (src, dst) in pixels {
            dst.copy_from_slice(&[src[1], src[2], src[3], src[0]]);
        }
    }

    log::debug!("decoded {w}x{h} bitmap ({total} bytes)");

    PixelBuffer::new(width as u32, height as u32, target)
        .ok_or(DecodeError::AllocationFailed { bytes: total })
}

/// Encodes canonical pixels in the packed bitmap format.
///
/// The output carries a 54-byte header, bottom-up rows and A, R, G, B
/// pixel order, so [`decode_bitmap`] reproduces `pixels` exactly.
pub fn encode_bitmap(pixels: &PixelBuffer) -> Vec<u8> {
    let row_bytes = pixels.width() as usize * BYTES_PER_PIXEL;
    let image_size = row_bytes * pixels.height() as usize;
    let header_size = FILE_HEADER.size;

    let mut out = vec![0u8; header_size + image_size];
    {
        let mut header = FILE_HEADER.record_mut(&mut out, 0);
        header.set(&MAGIC, SIGNATURE);
        header.set(&FILE_SIZE, (header_size + image_size) as u32);
        header.set(&PIXEL_OFFSET, header_size as u32);
        header.set(&INFO_SIZE, INFO_HEADER_SIZE);
        header.set(&WIDTH, pixels.width() as i32);
        header.set(&HEIGHT, pixels.height() as i32);
        header.set(&PLANES, 1);
        header.set(&BITS_PER_PIXEL, 32);
        header.set(&COMPRESSION, 0);
        header.set(&IMAGE_SIZE, image_size as u32);
    }

    let src_rows = pixels.as_bytes().chunks_exact(row_bytes).rev();
    for (dst_row, src_row) in out[header_size..].chunks_exact_mut(row_bytes).zip(src_rows) {
        let px = dst_row
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(src_row.chunks_exact(BYTES_PER_PIXEL));
        for (dst, src) in px {
            dst.copy_from_slice(&[src[3], src[0], src[1], src[2]]);
        }
    }
    out
}

/// Decodes `bytes` and uploads the result as a linear, repeat-wrapped 2D
/// texture. The canonical buffer is released once uploaded.
pub fn upload_bitmap<D>(device: &mut D, bytes: &[u8]) -> Result<Texture, DecodeError>
where
    D: GraphicsDevice + ?Sized,
{
    let pixels = decode_bitmap(bytes)?;
    let id = device.create_texture(&pixels, SamplerDesc::default());
    Ok(Texture {
        id,
        width: pixels.width(),
        height: pixels.height(),
    })
}

/// Reads a bitmap file and uploads it with [`upload_bitmap`].
pub fn load_bitmap_file<D>(device: &mut D, path: impl AsRef<Path>) -> Result<Texture, DecodeError>
where
    D: GraphicsDevice + ?Sized,
{
    let bytes = std::fs::read(path.as_ref())?;
    upload_bitmap(device, &bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::device::{DeviceCall, FilterMode, RecordingDevice, WrapMode};

    /// Source-order (A, R, G, B) pixel for position `(x, source_row)`.
    fn source_pixel(x: u32, row: u32) -> [u8; 4] {
        [200 + row as u8, x as u8, row as u8, 100 + x as u8]
    }

    /// Builds a bitmap of `w × h` with a distinctive per-pixel pattern and a
    /// pixel offset that is not 54, to make sure the offset field is honored.
    pub(crate) fn synthetic_bitmap(w: u32, h: u32) -> Vec<u8> {
        let offset = 0x40usize;
        let mut out = vec![0u8; offset + (w * h * 4) as usize];
        out[0] = b'B';
        out[1] = b'M';
        out[0x0A..0x0E].copy_from_slice(&(offset as u32).to_le_bytes());
        out[0x12..0x16].copy_from_slice(&(w as i32).to_le_bytes());
        out[0x16..0x1A].copy_from_slice(&(h as i32).to_le_bytes());
        for row in 0..h {
            for x in 0..w {
                let at = offset + ((row * w + x) * 4) as usize;
                out[at..at + 4].copy_from_slice(&source_pixel(x, row));
            }
        }
        out
    }

    #[test]
    fn decodes_to_canonical_top_down() {
        let (w, h) = (3, 4);
        let pixels = decode_bitmap(&synthetic_bitmap(w, h)).unwrap();

        assert_eq!(pixels.width(), w);
        assert_eq!(pixels.height(), h);
        assert_eq!(pixels.as_bytes().len(), (w * h * 4) as usize);

        for y in 0..h {
            let source_row = h - 1 - y;
            for x in 0..w {
                let [a, r, g, b] = source_pixel(x, source_row);
                assert_eq!(pixels.pixel(x, y), [r, g, b, a], "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn row_zero_is_last_source_row() {
        let pixels = decode_bitmap(&synthetic_bitmap(2, 5)).unwrap();
        // Green carries the source row index.
        assert_eq!(pixels.pixel(0, 0)[1], 4);
        assert_eq!(pixels.pixel(0, 4)[1], 0);
    }

    #[test]
    fn wrong_magic_fails_before_texture_creation() {
        let mut bytes = synthetic_bitmap(2, 2);
        bytes[0] = b'P';
        let mut device = RecordingDevice::new();

        match upload_bitmap(&mut device, &bytes) {
            Err(DecodeError::InvalidSignature { found }) => assert_eq!(found, [b'P', b'M']),
            other => panic!("expected InvalidSignature, got {other:?}"),
        }
        assert!(device.calls().is_empty());
    }

    #[test]
    fn short_buffers_report_signature_then_truncation() {
        assert!(matches!(
            decode_bitmap(b"B"),
            Err(DecodeError::InvalidSignature { found: [b'B', 0] })
        ));
        assert!(matches!(
            decode_bitmap(b"BM\0\0"),
            Err(DecodeError::Truncated { what: "bitmap header", .. })
        ));
    }

    #[test]
    fn zero_or_negative_dimensions_are_rejected() {
        let mut bytes = synthetic_bitmap(2, 2);
        bytes[0x12..0x16].copy_from_slice(&0i32.to_le_bytes());
        assert!(matches!(
            decode_bitmap(&bytes),
            Err(DecodeError::InvalidDimensions { width: 0, height: 2, .. })
        ));

        let mut bytes = synthetic_bitmap(2, 2);
        bytes[0x16..0x1A].copy_from_slice(&(-2i32).to_le_bytes());
        assert!(matches!(
            decode_bitmap(&bytes),
            Err(DecodeError::InvalidDimensions { width: 2, height: -2, .. })
        ));
    }

    #[test]
    fn missing_pixel_data_is_truncated() {
        let mut bytes = synthetic_bitmap(4, 4);
        bytes.truncate(bytes.len() - 1);
        match decode_bitmap(&bytes) {
            Err(DecodeError::Truncated { needed, available, .. }) => {
                assert_eq!(needed, available + 1);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn encode_then_decode_reproduces_pixels() {
        let decoded = decode_bitmap(&synthetic_bitmap(5, 3)).unwrap();
        let encoded = encode_bitmap(&decoded);
        assert_eq!(encoded.len(), 54 + 5 * 3 * 4);
        assert_eq!(decode_bitmap(&encoded).unwrap(), decoded);
    }

    #[test]
    fn upload_uses_linear_repeat_sampler() {
        let mut device = RecordingDevice::new();
        let tex = upload_bitmap(&mut device, &synthetic_bitmap(2, 3)).unwrap();

        assert_eq!((tex.width, tex.height), (2, 3));
        match &device.calls()[..] {
            [DeviceCall::CreateTexture { id, width: 2, height: 3, sampler }] => {
                assert_eq!(*id, tex.id);
                assert_eq!(sampler.filter, FilterMode::Linear);
                assert_eq!(sampler.wrap, WrapMode::Repeat);
            }
            other => panic!("unexpected calls {other:?}"),
        }
        let uploaded = &device.texture(tex.id).unwrap().pixels;
        assert_eq!(uploaded, &decode_bitmap(&synthetic_bitmap(2, 3)).unwrap());
    }

    #[test]
    fn load_file_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut device = RecordingDevice::new();
        let err = load_bitmap_file(&mut device, dir.path().join("missing.bmp")).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }

    #[test]
    fn load_file_uploads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.bmp");
        std::fs::write(&path, synthetic_bitmap(4, 2)).unwrap();

        let mut device = RecordingDevice::new();
        let tex = load_bitmap_file(&mut device, &path).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(device.texture_count(), 1);
    }
}
