// crates/backup-roundtrip-local/src/wire.rs
// ============================================================================
// Module: Big-Endian Wire Primitives
// Description: Bounded writer and reader for backup binary formats.
// Purpose: Share length-checked encoding between entities and backup sets.
// Dependencies: crate::format
// ============================================================================

//! ## Overview
//! All integers are big-endian. Strings are a `u16` byte length followed by
//! UTF-8. Optional strings carry a leading `u8` presence flag (`0` or `1`).
//! The reader never panics on hostile input; every read is bounds-checked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::format::FormatError;

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Append-only big-endian writer.
#[derive(Debug, Default)]
pub(crate) struct ByteWriter {
    /// Encoded bytes.
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Appends raw bytes.
    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a `u8`.
    pub(crate) fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Appends a `u16`.
    pub(crate) fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends a `u32`.
    pub(crate) fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends an `i32`.
    pub(crate) fn put_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends an `i64`.
    pub(crate) fn put_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends a `u64`.
    pub(crate) fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends a length-prefixed string.
    pub(crate) fn put_str(&mut self, field: &'static str, value: &str) -> Result<(), FormatError> {
        let len = u16::try_from(value.len()).map_err(|_| FormatError::TooLong {
            field,
            max: usize::from(u16::MAX),
        })?;
        self.put_u16(len);
        self.put_bytes(value.as_bytes());
        Ok(())
    }

    /// Appends an optional length-prefixed string.
    pub(crate) fn put_opt_str(
        &mut self,
        field: &'static str,
        value: Option<&str>,
    ) -> Result<(), FormatError> {
        match value {
            Some(value) => {
                self.put_u8(1);
                self.put_str(field, value)
            }
            None => {
                self.put_u8(0);
                Ok(())
            }
        }
    }

    /// Returns the encoded bytes.
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Bounds-checked big-endian reader.
#[derive(Debug)]
pub(crate) struct ByteReader<'a> {
    /// Input bytes.
    bytes: &'a [u8],
    /// Read position.
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader at the start of `bytes`.
    pub(crate) const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
        }
    }

    /// Returns the number of unread bytes.
    pub(crate) const fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Takes `len` bytes or fails with [`FormatError::Truncated`].
    pub(crate) fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], FormatError> {
        let available = self.remaining();
        if len > available {
            return Err(FormatError::Truncated {
                field,
                needed: len,
                available,
            });
        }
        let slice = &self.bytes[self.offset .. self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Takes exactly `N` bytes.
    fn take_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], FormatError> {
        let mut out = [0_u8; N];
        out.copy_from_slice(self.take(field, N)?);
        Ok(out)
    }

    /// Reads a `u8`.
    pub(crate) fn u8(&mut self, field: &'static str) -> Result<u8, FormatError> {
        Ok(self.take_array::<1>(field)?[0])
    }

    /// Reads a `u16`.
    pub(crate) fn u16(&mut self, field: &'static str) -> Result<u16, FormatError> {
        Ok(u16::from_be_bytes(self.take_array(field)?))
    }

    /// Reads a `u32`.
    pub(crate) fn u32(&mut self, field: &'static str) -> Result<u32, FormatError> {
        Ok(u32::from_be_bytes(self.take_array(field)?))
    }

    /// Reads an `i32`.
    pub(crate) fn i32(&mut self, field: &'static str) -> Result<i32, FormatError> {
        Ok(i32::from_be_bytes(self.take_array(field)?))
    }

    /// Reads an `i64`.
    pub(crate) fn i64(&mut self, field: &'static str) -> Result<i64, FormatError> {
        Ok(i64::from_be_bytes(self.take_array(field)?))
    }

    /// Reads a `u64`.
    pub(crate) fn u64(&mut self, field: &'static str) -> Result<u64, FormatError> {
        Ok(u64::from_be_bytes(self.take_array(field)?))
    }

    /// Reads a length-prefixed UTF-8 string.
    pub(crate) fn str(&mut self, field: &'static str) -> Result<String, FormatError> {
        let len = usize::from(self.u16(field)?);
        let raw = self.take(field, len)?;
        std::str::from_utf8(raw).map(str::to_string).map_err(|_| FormatError::InvalidUtf8 {
            field,
        })
    }

    /// Reads an optional length-prefixed UTF-8 string.
    pub(crate) fn opt_str(&mut self, field: &'static str) -> Result<Option<String>, FormatError> {
        match self.u8(field)? {
            0 => Ok(None),
            1 => self.str(field).map(Some),
            flag => Err(FormatError::InvalidFlag {
                field,
                flag,
            }),
        }
    }

    /// Fails unless every byte was consumed.
    pub(crate) const fn finish(&self) -> Result<(), FormatError> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(FormatError::TrailingBytes(extra)),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
