use std::fmt;

use crate::error::DecodeError;

use super::{Field, FieldSpec, FieldValue};

/// Versioned description of a fixed-size binary structure.
#[derive(Debug)]
pub struct StructLayout {
    pub name: &'static str,
    pub version: u16,
    /// Total size in bytes. Fields must lie entirely inside `0..size`.
    pub size: usize,
    pub fields: &'static [FieldSpec],
}

/// A layout whose fields do not fit or overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutError(pub String);

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layout error: {}", self.0)
    }
}

impl std::error::Error for LayoutError {}

impl StructLayout {
    /// Checks that every field fits inside the layout and that no two overlap.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (i, a) in self.fields.iter().enumerate() {
            if a.width == 0 || a.end() > self.size {
                return Err(LayoutError(format!(
                    "{} v{}: field `{}` ({}..{}) outside size {}",
                    self.name,
                    self.version,
                    a.name,
                    a.offset,
                    a.end(),
                    self.size
                )));
            }
            for b in &self.fields[i + 1..] {
                if a.offset < b.end() && b.offset < a.end() {
                    return Err(LayoutError(format!(
                        "{} v{}: fields `{}` and `{}` overlap",
                        self.name, self.version, a.name, b.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns `true` if `field` is one of this layout's fields.
    pub fn contains<T: FieldValue>(&self, field: &Field<T>) -> bool {
        self.fields.contains(&field.spec())
    }

    /// Borrows the `size` bytes starting at `at` as a record of this layout.
    pub fn record<'a>(&'static self, bytes: &'a [u8], at: usize) -> Result<Record<'a>, DecodeError> {
        let end = at.checked_add(self.size);
        match end.and_then(|end| bytes.get(at..end)) {
            Some(bytes) => Ok(Record { layout: self, bytes }),
            None => Err(DecodeError::Truncated {
                what: self.name,
                needed: at.saturating_add(self.size),
                available: bytes.len(),
            }),
        }
    }

    /// Borrows `size` writable bytes at `at` for encoding.
    ///
    /// # Panics
    /// Panics if `out` is shorter than `at + size`.
    pub fn record_mut<'a>(&'static self, out: &'a mut [u8], at: usize) -> RecordMut<'a> {
        RecordMut { layout: self, bytes: &mut out[at..at + self.size] }
    }
}

/// Read-only view of one structure instance.
#[derive(Debug, Copy, Clone)]
pub struct Record<'a> {
    layout: &'static StructLayout,
    bytes: &'a [u8],
}

impl<'a> Record<'a> {
    /// Reads a field. The field must belong to this record's layout.
    #[inline]
    pub fn get<T: FieldValue>(&self, field: &Field<T>) -> T {
        debug_assert!(
            self.layout.contains(field),
            "field `{}` is not part of layout `{}`",
            field.name,
            self.layout.name
        );
        T::read_le(&self.bytes[field.offset..field.offset + T::WIDTH])
    }

    #[inline]
    pub fn layout(&self) -> &'static StructLayout {
        self.layout
    }
}

/// Writable view of one structure instance.
#[derive(Debug)]
pub struct RecordMut<'a> {
    layout: &'static StructLayout,
    bytes: &'a mut [u8],
}

impl RecordMut<'_> {
    #[inline]
    pub fn set<T: FieldValue>(&mut self, field: &Field<T>, value: T) {
        debug_assert!(self.layout.contains(field));
        value.write_le(&mut self.bytes[field.offset..field.offset + T::WIDTH]);
    }
}
