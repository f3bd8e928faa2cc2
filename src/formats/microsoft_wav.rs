//! Plain RIFF/WAVE, PCM only.
//!
//! Also the carrier for obfuscated variants such as [`super::mebius_koe`],
//! which reuse [`read_wav`] and post-process the samples.

use log::debug;

use crate::audio::{Audio, AudioDecoder};
use crate::decoder::BaseDecoder;
use crate::error::{Error, Result};
use crate::file::InputFile;
use crate::io_stream::ByteStream;

pub const RIFF_MAGIC: &[u8; 4] = b"RIFF";
pub const WAVE_MAGIC: &[u8; 4] = b"WAVE";
const FORMAT_PCM: u16 = 1;

pub struct WavAudioDecoder;

struct Format {
    channels:        u16,
    sample_rate:     u32,
    bits_per_sample: u16,
}

/// True when the stream starts with a RIFF header of type WAVE.
pub(crate) fn has_wav_magic(stream: &mut ByteStream) -> Result<bool> {
    if &stream.read_array::<4>()? != RIFF_MAGIC {
        return Ok(false);
    }
    stream.skip(4)?;
    Ok(&stream.read_array::<4>()? == WAVE_MAGIC)
}

/// Parse a whole RIFF/WAVE file from offset 0.
pub(crate) fn read_wav(stream: &mut ByteStream) -> Result<Audio> {
    stream.seek(0)?;
    if !has_wav_magic(stream)? {
        return Err(Error::malformed("not a RIFF/WAVE file"));
    }

    let mut format = None;
    while stream.left() >= 8 {
        let id = stream.read_array::<4>()?;
        let size = stream.read_u32_le()?;
        let start = stream.tell();
        match &id {
            b"fmt " => {
                let tag = stream.read_u16_le()?;
                if tag != FORMAT_PCM {
                    return Err(Error::unsupported(format!("WAV format tag {tag:#06x}")));
                }
                let channels = stream.read_u16_le()?;
                let sample_rate = stream.read_u32_le()?;
                let _byte_rate = stream.read_u32_le()?;
                let _block_align = stream.read_u16_le()?;
                let bits_per_sample = stream.read_u16_le()?;
                if channels == 0 || bits_per_sample == 0 {
                    return Err(Error::malformed(format!(
                        "WAV format with {channels} channels of {bits_per_sample} bits"
                    )));
                }
                let block_align = channels.checked_mul(bits_per_sample.div_ceil(8));
                if block_align.and_then(|a| sample_rate.checked_mul(a.into())).is_none() {
                    return Err(Error::malformed(format!(
                        "WAV byte rate overflows: {channels} x {bits_per_sample} bits at {sample_rate} Hz"
                    )));
                }
                format = Some(Format { channels, sample_rate, bits_per_sample });
            }
            b"data" => {
                let Some(fmt) = format else {
                    return Err(Error::malformed("WAV data chunk precedes fmt chunk"));
                };
                let samples = stream.read(size as usize)?;
                return Ok(Audio {
                    channels:        fmt.channels,
                    sample_rate:     fmt.sample_rate,
                    bits_per_sample: fmt.bits_per_sample,
                    samples,
                });
            }
            _ => debug!("skipping WAV chunk {}", hex::encode(id)),
        }
        // Chunks are word aligned; tolerate a missing pad byte at EOF.
        let next = start + u64::from(size) + u64::from(size & 1);
        stream.seek(next.min(stream.size()))?;
    }
    Err(Error::malformed("WAV file has no data chunk"))
}

impl BaseDecoder for WavAudioDecoder {
    fn recognize(&self, input: &mut InputFile) -> Result<bool> {
        has_wav_magic(&mut input.stream)
    }
}

impl AudioDecoder for WavAudioDecoder {
    fn decode(&self, input: &mut InputFile) -> Result<Audio> {
        read_wav(&mut input.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::audio_to_wav;

    fn sample_audio() -> Audio {
        Audio {
            channels:        2,
            sample_rate:     22050,
            bits_per_sample: 16,
            samples:         (0..64u8).collect(),
        }
    }

    #[test]
    fn decodes_encoded_wav() {
        let file = audio_to_wav(&sample_audio(), "a").unwrap();
        let mut input = InputFile::from_bytes("a.wav", file.content);
        assert!(WavAudioDecoder.is_recognized(&mut input));
        assert_eq!(WavAudioDecoder.decode(&mut input).unwrap(), sample_audio());
    }

    #[test]
    fn skips_unknown_and_odd_chunks() {
        let file = audio_to_wav(&sample_audio(), "a").unwrap();
        let (header, rest) = file.content.split_at(12);
        let mut data = header.to_vec();
        data.extend_from_slice(b"LIST");
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3, 0]);
        data.extend_from_slice(rest);
        let mut input = InputFile::from_bytes("a.wav", data);
        assert_eq!(WavAudioDecoder.decode(&mut input).unwrap(), sample_audio());
    }

    #[test]
    fn rejects_compressed_formats() {
        let mut data = audio_to_wav(&sample_audio(), "a").unwrap().content;
        data[20] = 2; // ADPCM
        let mut input = InputFile::from_bytes("a.wav", data);
        assert!(matches!(
            WavAudioDecoder.decode(&mut input),
            Err(Error::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn data_without_fmt_is_malformed() {
        let mut data = b"RIFF\0\0\0\0WAVEdata".to_vec();
        data.extend_from_slice(&0u32.to_le_bytes());
        let mut input = InputFile::from_bytes("a.wav", data);
        assert!(matches!(
            WavAudioDecoder.decode(&mut input),
            Err(Error::MalformedData(_))
        ));
    }

    fn with_fmt(channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
        let mut data = audio_to_wav(&sample_audio(), "a").unwrap().content;
        data[22..24].copy_from_slice(&channels.to_le_bytes());
        data[24..28].copy_from_slice(&sample_rate.to_le_bytes());
        data[34..36].copy_from_slice(&bits.to_le_bytes());
        data
    }

    #[test]
    fn hostile_fmt_fields_are_malformed() {
        for (channels, rate, bits) in [(u16::MAX, 44100, 16), (2, u32::MAX, 16), (0, 44100, 16), (2, 44100, 0)] {
            let mut input = InputFile::from_bytes("a.wav", with_fmt(channels, rate, bits));
            assert!(
                matches!(WavAudioDecoder.decode(&mut input), Err(Error::MalformedData(_))),
                "{channels} {rate} {bits}"
            );
        }
        let mut input = InputFile::from_bytes("a.wav", with_fmt(1, 8000, 24));
        assert_eq!(WavAudioDecoder.decode(&mut input).unwrap().bits_per_sample, 24);
    }

    #[test]
    fn truncated_samples_are_out_of_bounds() {
        let mut data = audio_to_wav(&sample_audio(), "a").unwrap().content;
        data.truncate(data.len() - 1);
        let mut input = InputFile::from_bytes("a.wav", data);
        assert!(WavAudioDecoder.decode(&mut input).unwrap_err().is_out_of_bounds());
    }
}
