// stream.rs: position-tracked in-memory byte buffer
//
// All multi-byte values are little-endian, matching the legacy save format.

use crate::error::{StreamError, StreamResult};

/// Growable byte buffer with a read/write cursor.
///
/// Reads never go past `len()`; writes past the end grow the buffer. A failed
/// operation leaves the cursor where it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteStream {
    data: Vec<u8>,
    position: usize,
}

impl ByteStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sized, zero-filled stream of `len` bytes.
    pub fn with_len(len: usize) -> Self {
        Self {
            data: vec![0; len],
            position: 0,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            data: Vec::with_capacity(cap),
            position: 0,
        }
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) -> StreamResult<()> {
        if position > self.data.len() {
            return Err(StreamError::OutOfBounds {
                position,
                requested: 0,
                length: self.data.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn ensure(&self, n: usize) -> StreamResult<()> {
        match self.position.checked_add(n) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(StreamError::OutOfBounds {
                position: self.position,
                requested: n,
                length: self.data.len(),
            }),
        }
    }

    // ============================================================
    // Raw blocks
    // ============================================================

    /// Copy `dst.len()` bytes from the cursor into `dst`.
    pub fn read(&mut self, dst: &mut [u8]) -> StreamResult<()> {
        let src = self.read_bytes(dst.len())?;
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> StreamResult<&[u8]> {
        self.ensure(n)?;
        let start = self.position;
        self.position += n;
        Ok(&self.data[start..start + n])
    }

    pub fn read_array<const N: usize>(&mut self) -> StreamResult<[u8; N]> {
        let mut out = [0u8; N];
        self.read(&mut out)?;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> StreamResult<()> {
        self.ensure(n)?;
        self.position += n;
        Ok(())
    }

    /// Copy `src` to the cursor, growing the buffer when needed.
    pub fn write(&mut self, src: &[u8]) {
        let end = self.position + src.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].copy_from_slice(src);
        self.position = end;
    }

    pub fn write_zeros(&mut self, n: usize) {
        let end = self.position + n;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].fill(0);
        self.position = end;
    }

    // ============================================================
    // Strings
    // ============================================================

    /// Read a NUL-terminated string. Invalid UTF-8 is replaced lossily.
    pub fn read_string(&mut self) -> StreamResult<String> {
        let rest = &self.data[self.position..];
        let Some(nul) = rest.iter().position(|&b| b == 0) else {
            return Err(StreamError::MalformedData {
                position: self.position,
                reason: "string is missing its terminator",
            });
        };
        let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.position += nul + 1;
        Ok(s)
    }

    pub fn write_string(&mut self, s: &str) {
        self.write(s.as_bytes());
        self.write(&[0]);
    }

    // ============================================================
    // Fixed-width values
    // ============================================================

    pub fn read_u8(&mut self) -> StreamResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> StreamResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> StreamResult<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_i16(&mut self) -> StreamResult<i16> {
        self.read_array().map(i16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> StreamResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> StreamResult<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> StreamResult<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> StreamResult<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> StreamResult<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    pub fn write_u8(&mut self, v: u8) {
        self.write(&[v]);
    }

    pub fn write_i8(&mut self, v: i8) {
        self.write(&[v as u8]);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i16(&mut self, v: i16) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.write(&v.to_le_bytes());
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

// ============================================================
// Tests
// ============================================================
