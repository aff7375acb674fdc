use std::fmt;

use crate::error::DecodeError;

/// Canonical RGBA8 raster: row-major, top-down, 4 bytes per pixel in
/// R, G, B, A order.
///
/// Invariant: `data.len() == width * height * 4` and both dimensions are
/// non-zero.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps RGBA8 bytes, returning `None` if the length does not match or a
    /// dimension is zero.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (width > 0 && height > 0 && data.len() == expected).then_some(Self { width, height, data })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of row `y` (row 0 is the top row).
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Allocates a zeroed decode buffer, reporting allocation failure instead of
/// aborting.
pub(crate) fn alloc_zeroed(bytes: usize) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes)
        .map_err(|_| DecodeError::AllocationFailed { bytes })?;
    buf.resize(bytes, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checks_length_and_dimensions() {
        assert!(PixelBuffer::new(2, 2, vec![0; 16]).is_some());
        assert!(PixelBuffer::new(2, 2, vec![0; 15]).is_none());
        assert!(PixelBuffer::new(0, 2, Vec::new()).is_none());
    }

    #[test]
    fn pixel_and_row_address_top_down() {
        let data: Vec<u8> = (0..16).collect();
        let p = PixelBuffer::new(2, 2, data).unwrap();
        assert_eq!(p.pixel(1, 0), [4, 5, 6, 7]);
        assert_eq!(p.pixel(0, 1), [8, 9, 10, 11]);
        assert_eq!(p.row(1), &[8, 9, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn impossible_allocation_fails_cleanly() {
        match alloc_zeroed(usize::MAX) {
            Err(DecodeError::AllocationFailed { bytes }) => assert_eq!(bytes, usize::MAX),
            other => panic!("expected AllocationFailed, got {other:?}"),
        }
    }
}
