//! NScripter SPB images.
//!
//! ```text
//! u16 BE  width
//! u16 BE  height
//! bit stream (MSB-first) to end of file
//! ```
//!
//! # Pixel compression
//! Each colour channel is coded as one plane of `width * height` bytes, in
//! the order blue, green, red.  A plane starts with a literal 8-bit seed `v`
//! and continues in groups:
//!
//! | 3-bit selector `t` | meaning                                        |
//! |--------------------|------------------------------------------------|
//! | 0                  | repeat `v` four times                          |
//! | 1..=5              | four deltas of `t + 2` bits                    |
//! | 6                  | four literal bytes (width 8)                   |
//! | 7                  | one more bit `b`; four deltas of `b + 1` bits  |
//!
//! A delta `d` moves `v` up by `(d >> 1) + 1` when odd and down by `d >> 1`
//! when even (wrapping).  A delta group stops once the plane is full, but
//! only after the value that no longer fits has been read.
//!
//! Planes are stored in serpentine order: even rows left to right, odd rows
//! right to left.  Alpha is always opaque.

use crate::decoder::BaseDecoder;
use crate::error::{Error, Result};
use crate::file::InputFile;
use crate::image::{Image, ImageDecoder, ALPHA, BLUE, GREEN, RED};
use crate::io_stream::BitReader;

/// Larger dimensions are treated as "not an SPB".
const MAX_DIMENSION: u16 = 5000;

const GROUP: usize = 4;

pub struct SpbImageDecoder;

fn decode_plane(bits: &mut BitReader<'_>, plane: &mut [u8]) -> Result<()> {
    let mut v = bits.get(8)? as u8;
    let Some(first) = plane.first_mut() else {
        return Ok(());
    };
    *first = v;
    let mut out = 1;

    while out < plane.len() {
        let t = bits.get(3)?;
        if t == 0 {
            for _ in 0..GROUP {
                if out >= plane.len() {
                    break;
                }
                plane[out] = v;
                out += 1;
            }
            continue;
        }

        let width = if t == 7 { bits.get(1)? + 1 } else { t + 2 };
        for _ in 0..GROUP {
            if width == 8 {
                v = bits.get(8)? as u8;
            } else {
                let d = bits.get(width)?;
                if d & 1 != 0 {
                    v = v.wrapping_add(((d >> 1) + 1) as u8);
                } else {
                    v = v.wrapping_sub((d >> 1) as u8);
                }
            }
            if out >= plane.len() {
                break;
            }
            plane[out] = v;
            out += 1;
        }
    }
    Ok(())
}

/// Fewest bits that can code three planes of `pixels` bytes: a seed each,
/// then one zero selector per group.
fn min_stream_bits(pixels: u64) -> u64 {
    let groups = pixels.saturating_sub(1).div_ceil(GROUP as u64);
    groups.saturating_mul(3).saturating_add(8).saturating_mul(3)
}

/// Decode the pixel bit stream of a `width × height` image.
///
/// Fails with [`Error::OutOfBounds`] before allocating anything if the
/// stream is too short for the dimensions.
pub fn decode_pixels(width: usize, height: usize, bits: &mut BitReader<'_>) -> Result<Image> {
    if width == 0 || height == 0 {
        let mut image = Image::new(width, height);
        image.fill_channel(ALPHA, 0xFF);
        return Ok(image);
    }
    let pixels = (width as u64).saturating_mul(height as u64);
    let wanted = min_stream_bits(pixels);
    if bits.left() < wanted {
        return Err(Error::OutOfBounds { pos: bits.tell(), wanted, size: bits.size() });
    }

    let mut image = Image::new(width, height);
    image.fill_channel(ALPHA, 0xFF);
    let mut plane = vec![0u8; width * height];
    for channel in [BLUE, GREEN, RED] {
        decode_plane(bits, &mut plane)?;

        let mut src = plane.iter().copied();
        for y in 0..height {
            for i in 0..width {
                let x = if y % 2 == 1 { width - 1 - i } else { i };
                if let Some(byte) = src.next() {
                    image.pixel_mut(x, y)[channel] = byte;
                }
            }
        }
    }
    Ok(image)
}

impl BaseDecoder for SpbImageDecoder {
    fn recognize(&self, input: &mut InputFile) -> Result<bool> {
        if !input.has_extension("bmp") {
            return Ok(false);
        }
        let width = input.stream.read_u16_be()?;
        let height = input.stream.read_u16_be()?;
        Ok((1..=MAX_DIMENSION).contains(&width) && (1..=MAX_DIMENSION).contains(&height))
    }
}

impl ImageDecoder for SpbImageDecoder {
    fn decode(&self, input: &mut InputFile) -> Result<Image> {
        input.stream.seek(0)?;
        let width = input.stream.read_u16_be()?;
        let height = input.stream.read_u16_be()?;
        let dims = 1..=MAX_DIMENSION;
        if !dims.contains(&width) || !dims.contains(&height) {
            return Err(Error::malformed(format!("SPB dimensions {width}x{height}")));
        }
        let mut bits = BitReader::from_vec(input.stream.read_to_eof()?);
        decode_pixels(width.into(), height.into(), &mut bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// MSB-first bit packer for building streams by hand.
    #[derive(Default)]
    struct Bits {
        bytes: Vec<u8>,
        used:  u32,
    }

    impl Bits {
        fn put(&mut self, value: u32, n: u32) -> &mut Self {
            for i in (0..n).rev() {
                if self.used % 8 == 0 {
                    self.bytes.push(0);
                }
                let bit = ((value >> i) & 1) as u8;
                let last = self.bytes.last_mut().unwrap();
                *last |= bit << (7 - self.used % 8);
                self.used += 1;
            }
            self
        }
    }

    #[test]
    fn one_pixel_seeds() {
        let data = [0x10, 0x20, 0x30];
        let mut bits = BitReader::new(&data);
        let image = decode_pixels(1, 1, &mut bits).unwrap();
        assert_eq!(image.at(0, 0), [0x10, 0x20, 0x30, 0xFF]);
        assert!(bits.eof());
    }

    #[test]
    fn zero_selector_repeats_seed() {
        // 5x1: seed + one run fills the plane; no further selector bits.
        let mut b = Bits::default();
        for seed in [7, 8, 9] {
            b.put(seed, 8).put(0, 3);
        }
        let mut bits = BitReader::new(&b.bytes);
        let image = decode_pixels(5, 1, &mut bits).unwrap();
        for x in 0..5 {
            assert_eq!(image.at(x, 0), [7, 8, 9, 0xFF]);
        }
        assert_eq!(bits.tell(), 3 * 11);
    }

    #[test]
    fn deltas_follow_sign_convention() {
        // t=1 → 3-bit deltas: 3 (+2), 2 (-1), 0 (-0), 7 (+4)
        let mut b = Bits::default();
        b.put(100, 8).put(1, 3).put(3, 3).put(2, 3).put(0, 3).put(7, 3);
        for _ in 0..2 {
            b.put(0, 8).put(0, 3);
        }
        let mut bits = BitReader::new(&b.bytes);
        let image = decode_pixels(5, 1, &mut bits).unwrap();
        let blue: Vec<u8> = (0..5).map(|x| image.at(x, 0)[BLUE]).collect();
        assert_eq!(blue, vec![100, 102, 101, 101, 105]);
    }

    #[test]
    fn wide_selectors() {
        // t=6 → literals; t=7,b=0 → 1-bit deltas; t=7,b=1 → 2-bit deltas.
        let mut b = Bits::default();
        b.put(0, 8).put(6, 3);
        for lit in [250, 251, 252, 253] {
            b.put(lit, 8);
        }
        b.put(7, 3).put(0, 1).put(1, 1).put(1, 1).put(0, 1).put(1, 1);
        b.put(7, 3).put(1, 1).put(3, 2).put(2, 2).put(1, 2).put(0, 2);
        b.put(0, 8).put(0, 3).put(0, 3).put(0, 3);
        b.put(0, 8).put(0, 3).put(0, 3).put(0, 3);
        let mut bits = BitReader::new(&b.bytes);
        let image = decode_pixels(13, 1, &mut bits).unwrap();
        let blue: Vec<u8> = (0..13).map(|x| image.at(x, 0)[BLUE]).collect();
        assert_eq!(blue, vec![0, 250, 251, 252, 253, 254, 255, 255, 0, 2, 1, 2, 2]);
    }

    #[test]
    fn full_plane_stops_after_one_extra_value() {
        // 2x1: the group writes one byte, then reads one more delta and stops.
        let mut b = Bits::default();
        for _ in 0..3 {
            b.put(50, 8).put(1, 3).put(1, 3).put(1, 3);
        }
        let mut bits = BitReader::new(&b.bytes);
        let image = decode_pixels(2, 1, &mut bits).unwrap();
        assert_eq!(image.at(1, 0), [51, 51, 51, 0xFF]);
        assert_eq!(bits.tell(), 3 * (8 + 3 + 6));
    }

    #[test]
    fn serpentine_scatter() {
        // 2x2 with plane bytes 1,2,3,4 per channel: row 1 is reversed.
        let mut b = Bits::default();
        for _ in 0..3 {
            b.put(1, 8).put(1, 3).put(1, 3).put(1, 3).put(1, 3).put(0, 3);
        }
        let mut bits = BitReader::new(&b.bytes);
        let image = decode_pixels(2, 2, &mut bits).unwrap();
        assert_eq!(image.at(0, 0)[RED], 1);
        assert_eq!(image.at(1, 0)[RED], 2);
        assert_eq!(image.at(1, 1)[GREEN], 3);
        assert_eq!(image.at(0, 1)[GREEN], 4);
    }

    #[test]
    fn truncated_stream_fails() {
        let mut bits = BitReader::new(&[0x10, 0x20]);
        assert!(decode_pixels(1, 1, &mut bits).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn short_stream_fails_before_allocating() {
        let mut bits = BitReader::new(&[0; 8]);
        let err = decode_pixels(usize::MAX / 2, 3, &mut bits).unwrap_err();
        assert!(err.is_out_of_bounds());
        assert_eq!(bits.tell(), 0);

        // 5x1 needs a seed plus one selector per plane.
        assert_eq!(min_stream_bits(5), 33);
        let mut bits = BitReader::new(&[0; 4]);
        assert!(decode_pixels(5, 1, &mut bits).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn oversized_header_is_malformed() {
        let mut input = InputFile::from_bytes("a.bmp", vec![0xFF, 0xFF, 0xFF, 0xFF, 0, 0]);
        assert!(matches!(SpbImageDecoder.decode(&mut input), Err(Error::MalformedData(_))));
        let mut input = InputFile::from_bytes("a.bmp", vec![0, 0, 0, 1, 0, 0]);
        assert!(matches!(SpbImageDecoder.decode(&mut input), Err(Error::MalformedData(_))));
    }

    #[test]
    fn recognition_bounds() {
        let mut ok = InputFile::from_bytes("a.bmp", vec![0, 1, 0, 1, 0, 0, 0]);
        assert!(SpbImageDecoder.is_recognized(&mut ok));
        let mut wrong_ext = InputFile::from_bytes("a.spb", vec![0, 1, 0, 1]);
        assert!(!SpbImageDecoder.is_recognized(&mut wrong_ext));
        let mut zero = InputFile::from_bytes("a.bmp", vec![0, 0, 0, 1]);
        assert!(!SpbImageDecoder.is_recognized(&mut zero));
        let mut huge = InputFile::from_bytes("a.bmp", vec![0x13, 0x89, 0, 1]);
        assert!(!SpbImageDecoder.is_recognized(&mut huge));
        let mut short = InputFile::from_bytes("a.bmp", vec![0, 1]);
        assert!(!SpbImageDecoder.is_recognized(&mut short));
    }
}
