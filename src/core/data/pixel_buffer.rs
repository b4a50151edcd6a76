use crate::core::data::colour::Colour;
use crate::core::data::grid_size::GridSize;
use crate::core::data::point::Point;
use std::error::Error;
use std::fmt;

pub const BYTES_PER_PIXEL: usize = 3;

fn grid_size_to_buffer_size(size: GridSize) -> usize {
    size.cell_count() * BYTES_PER_PIXEL
}

#[derive(Debug, Clone, PartialEq)]
pub enum PixelBufferError {
    PixelOutsideBounds { pixel: Point, size: GridSize },
    BoundsMismatch { expected: usize, found: usize },
}

impl fmt::Display for PixelBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundsMismatch { expected, found } => {
                write!(
                    f,
                    "pixel buffer needs {} bytes but was given {}",
                    expected, found
                )
            }
            Self::PixelOutsideBounds { pixel, size } => {
                write!(
                    f,
                    "pixel at x:{}, y:{} outside of {} image",
                    pixel.x, pixel.y, size
                )
            }
        }
    }
}

impl Error for PixelBufferError {}

pub type PixelBufferData = Vec<u8>;

/// Packed RGB bytes for an image, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    size: GridSize,
    buffer: PixelBufferData,
}

impl PixelBuffer {
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            buffer: vec![0; grid_size_to_buffer_size(size)],
        }
    }

    pub fn from_data(size: GridSize, buffer: PixelBufferData) -> Result<Self, PixelBufferError> {
        let expected = grid_size_to_buffer_size(size);

        if expected != buffer.len() {
            return Err(PixelBufferError::BoundsMismatch {
                expected,
                found: buffer.len(),
            });
        }

        Ok(Self { size, buffer })
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[must_use]
    pub fn buffer(&self) -> &PixelBufferData {
        &self.buffer
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn into_data(self) -> PixelBufferData {
        self.buffer
    }

    #[must_use]
    pub fn pixel(&self, pixel: Point) -> Option<Colour> {
        let index = self.size.index_of(pixel)? * BYTES_PER_PIXEL;

        Some(Colour {
            r: self.buffer[index],
            g: self.buffer[index + 1],
            b: self.buffer[index + 2],
        })
    }

    pub fn set_pixel(&mut self, pixel: Point, colour: Colour) -> Result<(), PixelBufferError> {
        let index = self
            .size
            .index_of(pixel)
            .ok_or(PixelBufferError::PixelOutsideBounds {
                pixel,
                size: self.size,
            })?
            * BYTES_PER_PIXEL;

        self.buffer[index] = colour.r;
        self.buffer[index + 1] = colour.g;
        self.buffer[index + 2] = colour.b;

        Ok(())
    }
}
