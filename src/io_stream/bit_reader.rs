//! MSB-first bit reader.
//!
//! Two backings are supported:
//!
//! - **Buffered**: the whole bit stream is already in memory (borrowed or
//!   owned).  Reads compose up to five source bytes into a 40-bit window,
//!   which covers any 32-bit request at any bit alignment.
//! - **Stream**: bits are pulled from a live [`ByteStream`] only as they
//!   are needed.  The unread tail of the last fetched byte is held in a
//!   lookahead of at most 7 bits while the stream itself has already moved
//!   past that byte, so byte-level reads on the stream (via
//!   [`BitReader::stream_mut`]) pick up at the next unfetched byte.  Bit and
//!   byte reads interleave cleanly as long as the bit side stops on a byte
//!   boundary before the byte side reads.
//!
//! In stream mode, [`BitReader::tell`] is derived from the stream:
//! `stream.tell() * 8 - lookahead_bits`.
//!
//! # Atomicity
//! [`BitReader::get`] either returns `n` bits and advances by exactly `n`, or
//! fails with [`Error::OutOfBounds`] with the bit position, the stream
//! position and the lookahead exactly as they were before the call.

use std::borrow::Cow;

use super::ByteStream;
use crate::error::{Error, Result};

/// Widest request [`BitReader::get`] accepts.
pub const MAX_BITS: u32 = 32;

enum Source<'a> {
    Buffer {
        data: Cow<'a, [u8]>,
        pos:  u64,
    },
    Stream {
        stream:         &'a mut ByteStream,
        lookahead:      u64,
        lookahead_bits: u32,
    },
}

pub struct BitReader<'a> {
    source: Source<'a>,
}

#[inline]
fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { source: Source::Buffer { data: Cow::Borrowed(data), pos: 0 } }
    }

    /// Start reading at the stream's current byte position.
    pub fn from_stream(stream: &'a mut ByteStream) -> Self {
        Self {
            source: Source::Stream { stream, lookahead: 0, lookahead_bits: 0 },
        }
    }

    /// The underlying stream, when stream-backed.
    pub fn stream_mut(&mut self) -> Option<&mut ByteStream> {
        match &mut self.source {
            Source::Stream { stream, .. } => Some(&mut **stream),
            Source::Buffer { .. }         => None,
        }
    }

    pub fn size(&self) -> u64 {
        match &self.source {
            Source::Buffer { data, .. }   => data.len() as u64 * 8,
            Source::Stream { stream, .. } => stream.size() * 8,
        }
    }

    pub fn tell(&self) -> u64 {
        match &self.source {
            Source::Buffer { pos, .. } => *pos,
            Source::Stream { stream, lookahead_bits, .. } => {
                stream.tell() * 8 - u64::from(*lookahead_bits)
            }
        }
    }

    pub fn left(&self) -> u64 {
        self.size() - self.tell()
    }

    pub fn eof(&self) -> bool {
        self.tell() == self.size()
    }

    /// Read `n` bits (`1..=32`) as an unsigned value, first bit most
    /// significant.
    pub fn get(&mut self, n: u32) -> Result<u32> {
        if n == 0 || n > MAX_BITS {
            return Err(Error::InvalidArgument(format!(
                "bit reads must be 1..={MAX_BITS} bits wide, got {n}"
            )));
        }
        let (pos, size) = (self.tell(), self.size());
        if u64::from(n) > size - pos {
            return Err(Error::OutOfBounds { pos, wanted: u64::from(n), size });
        }

        match &mut self.source {
            Source::Buffer { data, pos } => {
                let first = (*pos / 8) as usize;
                let shift = (*pos % 8) as u32;
                let mut window = 0u64;
                for i in 0..5 {
                    window = (window << 8) | u64::from(data.get(first + i).copied().unwrap_or(0));
                }
                *pos += u64::from(n);
                Ok(((window >> (40 - shift - n)) & mask(n)) as u32)
            }
            Source::Stream { stream, lookahead, lookahead_bits } => {
                if n > *lookahead_bits {
                    let missing = n - *lookahead_bits;
                    // Nothing is touched until the bytes are in hand.
                    let fresh = stream.read(missing.div_ceil(8) as usize)?;
                    for byte in fresh {
                        *lookahead = (*lookahead << 8) | u64::from(byte);
                        *lookahead_bits += 8;
                    }
                }
                *lookahead_bits -= n;
                let value = (*lookahead >> *lookahead_bits) & mask(n);
                *lookahead &= mask(*lookahead_bits);
                Ok(value as u32)
            }
        }
    }

    pub fn seek(&mut self, bit_pos: u64) -> Result<()> {
        let size = self.size();
        if bit_pos > size {
            return Err(Error::OutOfBounds { pos: bit_pos, wanted: 0, size });
        }
        match &mut self.source {
            Source::Buffer { pos, .. } => {
                *pos = bit_pos;
                Ok(())
            }
            Source::Stream { stream, lookahead, lookahead_bits } => {
                let old_pos = stream.tell();
                let partial = (bit_pos % 8) as u32;
                stream.seek(bit_pos / 8)?;
                if partial == 0 {
                    *lookahead = 0;
                    *lookahead_bits = 0;
                    return Ok(());
                }
                match stream.read_u8() {
                    Ok(byte) => {
                        *lookahead_bits = 8 - partial;
                        *lookahead = u64::from(byte) & mask(*lookahead_bits);
                        Ok(())
                    }
                    Err(e) => {
                        stream.seek(old_pos)?;
                        Err(e)
                    }
                }
            }
        }
    }

    /// `seek(tell() + delta)`.
    pub fn skip(&mut self, delta: i64) -> Result<()> {
        let target = i128::from(self.tell()) + i128::from(delta);
        if target < 0 {
            return Err(Error::OutOfBounds {
                pos:    self.tell(),
                wanted: delta.unsigned_abs(),
                size:   self.size(),
            });
        }
        let target = u64::try_from(target).map_err(|_| Error::OutOfBounds {
            pos:    self.tell(),
            wanted: delta.unsigned_abs(),
            size:   self.size(),
        })?;
        self.seek(target)
    }
}

impl BitReader<'static> {
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { source: Source::Buffer { data: Cow::Owned(data), pos: 0 } }
    }
}
