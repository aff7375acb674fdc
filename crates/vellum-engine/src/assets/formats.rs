//! On-disk structure layouts for bitmap and font-atlas assets.
//!
//! Every fixed offset the decoders use is declared here, once.

/// Packed 32-bit bitmap.
pub mod bitmap {
    use crate::layout::{Field, StructLayout};

    pub const MAGIC: Field<[u8; 2]> = Field::new("magic", 0x00);
    pub const FILE_SIZE: Field<u32> = Field::new("file_size", 0x02);
    pub const PIXEL_OFFSET: Field<u32> = Field::new("pixel_offset", 0x0A);
    pub const INFO_SIZE: Field<u32> = Field::new("info_size", 0x0E);
    pub const WIDTH: Field<i32> = Field::new("width", 0x12);
    pub const HEIGHT: Field<i32> = Field::new("height", 0x16);
    pub const PLANES: Field<u16> = Field::new("planes", 0x1A);
    pub const BITS_PER_PIXEL: Field<u16> = Field::new("bits_per_pixel", 0x1C);
    pub const COMPRESSION: Field<u32> = Field::new("compression", 0x1E);
    pub const IMAGE_SIZE: Field<u32> = Field::new("image_size", 0x22);

    /// Fields the decoder reads.
    pub static HEADER: StructLayout = StructLayout {
        name: "bitmap header",
        version: 1,
        size: 0x1A,
        fields: &[MAGIC.spec(), PIXEL_OFFSET.spec(), WIDTH.spec(), HEIGHT.spec()],
    };

    /// Full file + info header written by the encoder.
    pub static FILE_HEADER: StructLayout = StructLayout {
        name: "bitmap file header",
        version: 1,
        size: 0x36,
        fields: &[
            MAGIC.spec(),
            FILE_SIZE.spec(),
            PIXEL_OFFSET.spec(),
            INFO_SIZE.spec(),
            WIDTH.spec(),
            HEIGHT.spec(),
            PLANES.spec(),
            BITS_PER_PIXEL.spec(),
            COMPRESSION.spec(),
            IMAGE_SIZE.spec(),
        ],
    };

    /// Size of the info header that follows the 14-byte file header.
    pub const INFO_HEADER_SIZE: u32 = 40;
}

/// Bitmap-font atlas header.
pub mod atlas {
    use crate::layout::{Field, StructLayout};

    pub const GLYPH_COUNT: Field<u16> = Field::new("glyph_count", 0x00);
    pub const MAX_INDEX: Field<u16> = Field::new("max_index", 0x02);
    pub const ATLAS_WIDTH: Field<u16> = Field::new("atlas_width", 0x04);
    pub const ATLAS_HEIGHT: Field<u16> = Field::new("atlas_height", 0x06);

    pub static HEADER: StructLayout = StructLayout {
        name: "font atlas header",
        version: 1,
        size: 8,
        fields: &[
            GLYPH_COUNT.spec(),
            MAX_INDEX.spec(),
            ATLAS_WIDTH.spec(),
            ATLAS_HEIGHT.spec(),
        ],
    };
}

/// One glyph record inside a font atlas.
pub mod glyph {
    use crate::layout::{Field, StructLayout};

    pub const CODE: Field<u16> = Field::new("code", 0);
    pub const X: Field<u16> = Field::new("x", 2);
    pub const Y: Field<u16> = Field::new("y", 4);
    pub const WIDTH: Field<u16> = Field::new("width", 6);
    pub const HEIGHT: Field<u16> = Field::new("height", 8);
    pub const X_OFFSET: Field<f32> = Field::new("x_offset", 10);
    pub const Y_OFFSET: Field<f32> = Field::new("y_offset", 14);
    pub const X_ADVANCE: Field<f32> = Field::new("x_advance", 18);

    pub static RECORD: StructLayout = StructLayout {
        name: "glyph record",
        version: 1,
        size: 22,
        fields: &[
            CODE.spec(),
            X.spec(),
            Y.spec(),
            WIDTH.spec(),
            HEIGHT.spec(),
            X_OFFSET.spec(),
            Y_OFFSET.spec(),
            X_ADVANCE.spec(),
        ],
    };
}
