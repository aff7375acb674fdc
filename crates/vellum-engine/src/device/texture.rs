/// Opaque device-resident texture identifier.
///
/// Ids are assigned by the device and never reused while the texture lives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TextureId(pub u32);

/// A texture handle together with its pixel dimensions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Sampling parameters fixed at texture creation.
///
/// The default (linear filtering, repeat addressing) is what decoded
/// bitmaps are uploaded with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SamplerDesc {
    pub filter: FilterMode,
    pub wrap: WrapMode,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            filter: FilterMode::Linear,
            wrap: WrapMode::Repeat,
        }
    }
}
