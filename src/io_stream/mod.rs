//! Bounds-checked random-access byte reader.
//!
//! [`ByteStream`] wraps any seekable byte source (an in-memory buffer, a file,
//! or an arbitrary `Read + Seek`) behind a position/size pair that it owns.
//! Every access is checked against the size fixed at construction; an access
//! that would leave `0..=size` fails with [`Error::OutOfBounds`] and leaves
//! the position untouched.
//!
//! # Endianness
//! Formats in this domain mix byte orders freely, so every multi-byte read
//! comes in an explicit `_le` and `_be` flavour.  There is no default.

pub mod bit_reader;

pub use bit_reader::BitReader;

use std::fmt;
use std::fs;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Chunk size used while scanning for a zero terminator.
const SCAN_CHUNK: usize = 64;

trait Source: Read + Seek + Send {}
impl<T: Read + Seek + Send> Source for T {}

pub struct ByteStream {
    inner:     Box<dyn Source>,
    pos:       u64,
    size:      u64,
    /// Offset `inner` is known to sit at; `None` forces a seek before the
    /// next read.
    inner_pos: Option<u64>,
}

impl ByteStream {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// In-memory stream owning `data`.
    pub fn new(data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self {
            inner:     Box::new(Cursor::new(data)),
            pos:       0,
            size,
            inner_pos: Some(0),
        }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }

    /// File-backed stream.  The size is taken once from the file metadata.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = fs::File::open(path.as_ref())?;
        let size = file.metadata()?.len();
        Ok(Self {
            inner:     Box::new(BufReader::new(file)),
            pos:       0,
            size,
            inner_pos: Some(0),
        })
    }

    /// Wrap an arbitrary seekable reader, measuring its length up front.
    pub fn from_reader<R: Read + Seek + Send + 'static>(mut reader: R) -> Result<Self> {
        let size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner:     Box::new(reader),
            pos:       0,
            size,
            inner_pos: Some(0),
        })
    }

    // ── Position ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn tell(&self) -> u64 { self.pos }

    #[inline]
    pub fn size(&self) -> u64 { self.size }

    #[inline]
    pub fn left(&self) -> u64 { self.size - self.pos }

    #[inline]
    pub fn eof(&self) -> bool { self.pos == self.size }

    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.size {
            return Err(Error::OutOfBounds { pos, wanted: 0, size: self.size });
        }
        self.pos = pos;
        Ok(())
    }

    /// `seek(tell() + delta)`; `delta` may be negative.
    pub fn skip(&mut self, delta: i64) -> Result<()> {
        let target = i128::from(self.pos) + i128::from(delta);
        if target < 0 || target > i128::from(self.size) {
            return Err(Error::OutOfBounds {
                pos:    self.pos,
                wanted: delta.unsigned_abs(),
                size:   self.size,
            });
        }
        self.pos = target as u64;
        Ok(())
    }

    /// Run `op` with the stream positioned at `offset`, then put the position
    /// back where it was.  The restore happens whether `op` succeeds or not;
    /// `op`'s result is returned as is.
    pub fn peek<T, F>(&mut self, offset: u64, op: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let old_pos = self.pos;
        self.seek(offset)?;
        let result = op(self);
        self.pos = old_pos;
        result
    }

    // ── Raw reads ────────────────────────────────────────────────────────────

    /// Fill `buf` from the current position.  All-or-nothing.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let wanted = buf.len() as u64;
        if wanted > self.left() {
            return Err(Error::OutOfBounds { pos: self.pos, wanted, size: self.size });
        }
        if wanted == 0 {
            return Ok(());
        }
        if self.inner_pos != Some(self.pos) {
            self.inner_pos = None;
            self.inner.seek(SeekFrom::Start(self.pos))?;
        }
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.pos += wanted;
                self.inner_pos = Some(self.pos);
                Ok(())
            }
            Err(e) => {
                self.inner_pos = None;
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    // The source shrank underneath us.
                    Err(Error::OutOfBounds { pos: self.pos, wanted, size: self.size })
                } else {
                    Err(Error::Io(e))
                }
            }
        }
    }

    pub fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        if n as u64 > self.left() {
            return Err(Error::OutOfBounds { pos: self.pos, wanted: n as u64, size: self.size });
        }
        let mut buf = vec![0u8; n];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    pub fn read_to_eof(&mut self) -> Result<Vec<u8>> {
        self.read(self.left() as usize)
    }

    /// Read up to `max` bytes, stopping at the first zero byte.  The zero is
    /// consumed but not returned.  Without a zero, `min(max, left())` bytes
    /// are returned.
    pub fn read_to_zero(&mut self, max: usize) -> Result<Vec<u8>> {
        let start = self.pos;
        let limit = (max as u64).min(self.left()) as usize;
        let mut out = Vec::new();
        while out.len() < limit {
            let n = (limit - out.len()).min(SCAN_CHUNK);
            let chunk = match self.read(n) {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.pos = start;
                    return Err(e);
                }
            };
            if let Some(zero) = chunk.iter().position(|&b| b == 0) {
                out.extend_from_slice(&chunk[..zero]);
                self.pos = start + out.len() as u64 + 1;
                return Ok(out);
            }
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }

    /// Consume a whole fixed-width, null-padded field and return the bytes
    /// before its first zero.
    pub fn read_padded(&mut self, width: usize) -> Result<Vec<u8>> {
        if width as u64 > self.left() {
            return Err(Error::OutOfBounds { pos: self.pos, wanted: width as u64, size: self.size });
        }
        let field_end = self.pos + width as u64;
        let text = self.read_to_zero(width)?;
        self.pos = field_end;
        Ok(text)
    }

    // ── Integers ─────────────────────────────────────────────────────────────

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(&self.read_array::<2>()?))
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(&self.read_array::<2>()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(&self.read_array::<4>()?))
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(&self.read_array::<4>()?))
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(data: Vec<u8>) -> Self { Self::new(data) }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("pos", &self.pos)
            .field("size", &self.size)
            .finish()
    }
}
