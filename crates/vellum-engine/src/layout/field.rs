use core::marker::PhantomData;

/// A plain value that can be read from (and written to) a little-endian field.
pub trait FieldValue: Copy {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Decodes the value from exactly `WIDTH` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encodes the value into exactly `WIDTH` bytes.
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_field_value {
    ($($ty:ty),*) => {$(
        impl FieldValue for $ty {
            const WIDTH: usize = core::mem::size_of::<$ty>();

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; core::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }

            #[inline]
            fn write_le(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }
        }
    )*};
}

impl_field_value!(u16, u32, i32, f32);

/// Raw two-byte tags (signatures).
impl FieldValue for [u8; 2] {
    const WIDTH: usize = 2;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        [bytes[0], bytes[1]]
    }

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out.copy_from_slice(&self);
    }
}

/// Untyped field description used for layout validation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl FieldSpec {
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.width
    }
}

/// Typed handle to a field at a fixed offset within a [`StructLayout`].
///
/// [`StructLayout`]: super::StructLayout
#[derive(Debug)]
pub struct Field<T> {
    pub name: &'static str,
    pub offset: usize,
    _ty: PhantomData<fn() -> T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T: FieldValue> Field<T> {
    #[inline]
    pub const fn new(name: &'static str, offset: usize) -> Self {
        Self { name, offset, _ty: PhantomData }
    }

    #[inline]
    pub const fn spec(&self) -> FieldSpec {
        FieldSpec { name: self.name, offset: self.offset, width: T::WIDTH }
    }
}
