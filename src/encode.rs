//! Output encoders: decoded images become BMP files, decoded audio becomes
//! WAV files.  Both are the simplest lossless containers for the data.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use crate::audio::Audio;
use crate::error::{Error, Result};
use crate::file::File;
use crate::image::{Image, BYTES_PER_PIXEL};

const BMP_FILE_HEADER_SIZE: u32 = 14;
const BMP_INFO_HEADER_SIZE: u32 = 40;

#[derive(Debug, Clone)]
struct BmpHeader {
    width:     i32,
    height:    i32,
    data_size: u32,
}

impl BmpHeader {
    fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let data_offset = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE;
        writer.write_all(b"BM")?;
        writer.write_u32::<LittleEndian>(data_offset + self.data_size)?;
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(data_offset)?;

        writer.write_u32::<LittleEndian>(BMP_INFO_HEADER_SIZE)?;
        writer.write_i32::<LittleEndian>(self.width)?;
        // Negative height: rows are stored top to bottom.
        writer.write_i32::<LittleEndian>(-self.height)?;
        writer.write_u16::<LittleEndian>(1)?;
        writer.write_u16::<LittleEndian>((BYTES_PER_PIXEL * 8) as u16)?;
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(self.data_size)?;
        writer.write_i32::<LittleEndian>(2835)?;
        writer.write_i32::<LittleEndian>(2835)?;
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(0)?;
        Ok(())
    }
}

fn to_i32(value: usize, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::InvalidArgument(format!("{what} {value} too large for BMP")))
}

/// 32-bit uncompressed BMP; pixel rows are already 4-byte aligned.
pub fn image_to_bmp(image: &Image, path: &str) -> Result<File> {
    let header = BmpHeader {
        width:     to_i32(image.width(), "width")?,
        height:    to_i32(image.height(), "height")?,
        data_size: u32::try_from(image.data().len())
            .map_err(|_| Error::InvalidArgument("image too large for BMP".into()))?,
    };
    let mut out = Vec::with_capacity(54 + image.data().len());
    header.write(&mut out)?;
    out.extend_from_slice(image.data());
    Ok(File::new(path, out).with_extension("bmp"))
}

/// Canonical 44-byte-header PCM WAV.
pub fn audio_to_wav(audio: &Audio, path: &str) -> Result<File> {
    let data_size = u32::try_from(audio.samples.len())
        .map_err(|_| Error::InvalidArgument("audio too large for WAV".into()))?;
    let (Some(block_align), Some(byte_rate)) = (audio.block_align(), audio.byte_rate()) else {
        return Err(Error::InvalidArgument(format!(
            "{} channels x {} bits at {} Hz overflows WAV header",
            audio.channels, audio.bits_per_sample, audio.sample_rate
        )));
    };
    let mut out = Vec::with_capacity(44 + audio.samples.len());
    out.write_all(b"RIFF")?;
    out.write_u32::<LittleEndian>(36 + data_size)?;
    out.write_all(b"WAVE")?;

    out.write_all(b"fmt ")?;
    out.write_u32::<LittleEndian>(16)?;
    out.write_u16::<LittleEndian>(1)?;
    out.write_u16::<LittleEndian>(audio.channels)?;
    out.write_u32::<LittleEndian>(audio.sample_rate)?;
    out.write_u32::<LittleEndian>(byte_rate)?;
    out.write_u16::<LittleEndian>(block_align)?;
    out.write_u16::<LittleEndian>(audio.bits_per_sample)?;

    out.write_all(b"data")?;
    out.write_u32::<LittleEndian>(data_size)?;
    out.extend_from_slice(&audio.samples);
    Ok(File::new(path, out).with_extension("wav"))
}
