//! Decoded pixel grids.

use crate::decoder::BaseDecoder;
use crate::error::Result;
use crate::file::InputFile;

pub const BYTES_PER_PIXEL: usize = 4;

/// Channel indices within a pixel.
pub const BLUE:  usize = 0;
pub const GREEN: usize = 1;
pub const RED:   usize = 2;
pub const ALPHA: usize = 3;

/// Interleaved BGRA8888 image, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width:  usize,
    height: usize,
    data:   Vec<u8>,
}

impl Image {
    /// Fully transparent black image.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, data: vec![0; width * height * BYTES_PER_PIXEL] }
    }

    pub fn width(&self) -> usize { self.width }

    pub fn height(&self) -> usize { self.height }

    pub fn data(&self) -> &[u8] { &self.data }

    pub fn at(&self, x: usize, y: usize) -> [u8; 4] {
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let i = self.index(x, y);
        &mut self.data[i..i + BYTES_PER_PIXEL]
    }

    pub fn fill_channel(&mut self, channel: usize, value: u8) {
        for px in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            px[channel] = value;
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) outside {}x{}", self.width, self.height);
        (y * self.width + x) * BYTES_PER_PIXEL
    }
}

pub trait ImageDecoder: BaseDecoder {
    fn decode(&self, input: &mut InputFile) -> Result<Image>;
}
