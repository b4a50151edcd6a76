use crate::core::data::point::Point;
use std::error::Error;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GridSizeError {
    InvalidSize { width: u32, height: u32 },
    TooLarge { width: u32, height: u32 },
}

impl fmt::Display for GridSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { width, height } => {
                write!(f, "grid size must be at least 1x1: {}x{}", width, height)
            }
            Self::TooLarge { width, height } => {
                write!(f, "grid size {}x{} overflows the addressable cell count", width, height)
            }
        }
    }
}

impl Error for GridSizeError {}

/// Width and height of a rectangular grid anchored at the origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    pub fn new(width: u32, height: u32) -> Result<Self, GridSizeError> {
        if width == 0 || height == 0 {
            return Err(GridSizeError::InvalidSize { width, height });
        }

        // Byte buffers hold three channels per cell.
        let fits = (width as usize)
            .checked_mul(height as usize)
            .and_then(|cells| cells.checked_mul(3))
            .is_some();

        if !fits {
            return Err(GridSizeError::TooLarge { width, height });
        }

        Ok(Self { width, height })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// Row-major index of `point`, or `None` when it lies outside the grid.
    #[must_use]
    pub fn index_of(&self, point: Point) -> Option<usize> {
        if !self.contains_point(point) {
            return None;
        }

        Some(point.y as usize * self.width as usize + point.x as usize)
    }

    /// The size of this grid with every cell blown up to `factor` x `factor`.
    pub fn scaled(&self, factor: u32) -> Result<Self, GridSizeError> {
        let width = self.width.checked_mul(factor);
        let height = self.height.checked_mul(factor);

        match (width, height) {
            (Some(width), Some(height)) => Self::new(width, height),
            _ => Err(GridSizeError::TooLarge {
                width: self.width.saturating_mul(factor),
                height: self.height.saturating_mul(factor),
            }),
        }
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
