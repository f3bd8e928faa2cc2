//! Decoded PCM audio.

use crate::decoder::BaseDecoder;
use crate::error::Result;
use crate::file::InputFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audio {
    pub channels:        u16,
    pub sample_rate:     u32,
    pub bits_per_sample: u16,
    /// Interleaved little-endian PCM.
    pub samples:         Vec<u8>,
}

impl Audio {
    /// Bytes per sample frame; `None` if it does not fit a WAV header.
    pub fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.bits_per_sample.div_ceil(8))
    }

    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate.checked_mul(u32::from(self.block_align()?))
    }
}

pub trait AudioDecoder: BaseDecoder {
    fn decode(&self, input: &mut InputFile) -> Result<Audio>;
}
