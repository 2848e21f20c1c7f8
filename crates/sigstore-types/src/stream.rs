//! Cursor-based big-endian byte stream
//!
//! [`ByteStream`] reads and writes the fixed-width integers and TLS-style
//! opaque vectors used by Certificate Transparency structures (RFC 6962,
//! RFC 5246 section 4). Reads never run past the end of the buffer: a short
//! buffer yields [`Error::OutOfBounds`] and leaves the cursor untouched.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

const U24_MAX: u32 = 0x00ff_ffff;

/// A growable byte buffer with a read cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteStream {
    buf: Vec<u8>,
    pos: usize,
}

impl ByteStream {
    /// Create an empty stream for writing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stream for reading over existing bytes, cursor at zero
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            buf: bytes.into(),
            pos: 0,
        }
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total number of bytes in the buffer
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no bytes at all
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the cursor has reached the end of the buffer
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// The whole underlying buffer, regardless of cursor position
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the stream and return its buffer
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.remaining() {
            return Err(Error::OutOfBounds {
                position: self.pos,
                requested: n,
                remaining: self.remaining(),
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    /// Read one byte
    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a big-endian u16
    pub fn get_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    /// Read a big-endian 24-bit unsigned integer
    pub fn get_u24(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u24(self.take(3)?))
    }

    /// Read a big-endian u64
    pub fn get_u64(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    /// Read exactly `n` bytes
    pub fn get_block(&mut self, n: usize) -> Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    /// Read a u16 length prefix followed by that many bytes
    pub fn get_opaque16(&mut self) -> Result<Vec<u8>> {
        let len = self.get_u16()? as usize;
        self.get_block(len)
    }

    /// Append one byte
    pub fn append_char(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Append a big-endian u16
    pub fn append_u16(&mut self, value: u16) {
        let mut out = [0u8; 2];
        BigEndian::write_u16(&mut out, value);
        self.buf.extend_from_slice(&out);
    }

    /// Append a big-endian 24-bit unsigned integer
    pub fn append_u24(&mut self, value: u32) -> Result<()> {
        if value > U24_MAX {
            return Err(Error::FieldOverflow(format!(
                "{value} does not fit in 24 bits"
            )));
        }
        let mut out = [0u8; 3];
        BigEndian::write_u24(&mut out, value);
        self.buf.extend_from_slice(&out);
        Ok(())
    }

    /// Append a big-endian u64
    pub fn append_u64(&mut self, value: u64) {
        let mut out = [0u8; 8];
        BigEndian::write_u64(&mut out, value);
        self.buf.extend_from_slice(&out);
    }

    /// Append raw bytes verbatim
    pub fn append_view(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a u16 length prefix followed by the bytes
    pub fn append_opaque16(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u16::try_from(bytes.len()).map_err(|_| {
            Error::FieldOverflow(format!(
                "{} bytes exceed a u16 length prefix",
                bytes.len()
            ))
        })?;
        self.append_u16(len);
        self.append_view(bytes);
        Ok(())
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl AsRef<[u8]> for ByteStream {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}
