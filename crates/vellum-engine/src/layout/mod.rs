//! Declarative binary struct layouts.
//!
//! Each on-disk structure is described once as a [`StructLayout`]: a name,
//! a format version, a total size, and typed [`Field`] handles at fixed byte
//! offsets. Decoders never index raw offsets themselves; they obtain a
//! [`Record`] view of exactly `size` bytes and read fields through it.
//!
//! All multi-byte fields are little-endian.

mod field;
mod schema;

pub use field::{Field, FieldSpec, FieldValue};
pub use schema::{LayoutError, Record, RecordMut, StructLayout};
