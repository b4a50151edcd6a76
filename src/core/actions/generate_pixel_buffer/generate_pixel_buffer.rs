use rayon::prelude::*;

use crate::core::actions::cancellation::{
    CANCEL_CHECK_INTERVAL_CELLS, CancelToken, Cancelled, NeverCancel,
};
use crate::core::actions::generate_pixel_buffer::ports::colour_map::ColourMap;
use crate::core::data::colour::Colour;
use crate::core::data::feature_map::FeatureMap;
use crate::core::data::grid_size::GridSizeError;
use crate::core::data::pixel_buffer::{BYTES_PER_PIXEL, PixelBuffer, PixelBufferData, PixelBufferError};
use std::error::Error;
use std::fmt;

/// Error type for heatmap rendering.
///
/// Cancellation is reported as its own variant so callers can treat it as
/// control flow rather than a failure to display.
#[derive(Debug)]
pub enum GeneratePixelBufferError<E> {
    /// The operation was cancelled before completion.
    Cancelled(Cancelled),
    /// The colour map rejected a value.
    ColourMap(E),
    /// The cell size produced an empty or unaddressable image.
    InvalidCellSize(GridSizeError),
    /// The rendered bytes did not fit the output image.
    PixelBuffer(PixelBufferError),
}

impl<E: fmt::Display> fmt::Display for GeneratePixelBufferError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled(c) => write!(f, "{}", c),
            Self::ColourMap(err) => write!(f, "colour map error: {}", err),
            Self::InvalidCellSize(err) => write!(f, "invalid cell size: {}", err),
            Self::PixelBuffer(err) => write!(f, "pixel buffer error: {}", err),
        }
    }
}

impl<E: Error + 'static> Error for GeneratePixelBufferError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Cancelled(c) => Some(c),
            Self::ColourMap(err) => Some(err),
            Self::InvalidCellSize(err) => Some(err),
            Self::PixelBuffer(err) => Some(err),
        }
    }
}

impl<E> From<PixelBufferError> for GeneratePixelBufferError<E> {
    fn from(err: PixelBufferError) -> Self {
        Self::PixelBuffer(err)
    }
}

/// Renders a feature map as a heatmap, one `cell_size` square per cell.
///
/// For cancel-aware or parallel rendering, see
/// [`generate_pixel_buffer_cancelable`] and [`generate_pixel_buffer_rayon`].
pub fn generate_pixel_buffer<CMap>(
    feature_map: &FeatureMap,
    mapper: &CMap,
    cell_size: u32,
) -> Result<PixelBuffer, GeneratePixelBufferError<CMap::Failure>>
where
    CMap: ColourMap<T = f64>,
{
    generate_pixel_buffer_cancelable(feature_map, mapper, cell_size, &NeverCancel)
}

/// Like [`generate_pixel_buffer`], but polls `cancel` at the start of every
/// row and every [`CANCEL_CHECK_INTERVAL_CELLS`] cells within a row.
pub fn generate_pixel_buffer_cancelable<CMap, C>(
    feature_map: &FeatureMap,
    mapper: &CMap,
    cell_size: u32,
    cancel: &C,
) -> Result<PixelBuffer, GeneratePixelBufferError<CMap::Failure>>
where
    CMap: ColourMap<T = f64>,
    C: CancelToken,
{
    let output_size = feature_map
        .size()
        .scaled(cell_size)
        .map_err(GeneratePixelBufferError::InvalidCellSize)?;

    let mut buffer: PixelBufferData = Vec::with_capacity(output_size.cell_count() * BYTES_PER_PIXEL);

    for row in feature_map.rows() {
        buffer.extend(render_row(row, mapper, cell_size, cancel)?);
    }

    Ok(PixelBuffer::from_data(output_size, buffer)?)
}

/// Renders rows in parallel on rayon's pool. Output is byte-identical to
/// [`generate_pixel_buffer`].
pub fn generate_pixel_buffer_rayon<CMap>(
    feature_map: &FeatureMap,
    mapper: &CMap,
    cell_size: u32,
) -> Result<PixelBuffer, GeneratePixelBufferError<CMap::Failure>>
where
    CMap: ColourMap<T = f64> + Sync,
    CMap::Failure: Send,
{
    generate_pixel_buffer_rayon_cancelable(feature_map, mapper, cell_size, &NeverCancel)
}

pub fn generate_pixel_buffer_rayon_cancelable<CMap, C>(
    feature_map: &FeatureMap,
    mapper: &CMap,
    cell_size: u32,
    cancel: &C,
) -> Result<PixelBuffer, GeneratePixelBufferError<CMap::Failure>>
where
    CMap: ColourMap<T = f64> + Sync,
    CMap::Failure: Send,
    C: CancelToken,
{
    let output_size = feature_map
        .size()
        .scaled(cell_size)
        .map_err(GeneratePixelBufferError::InvalidCellSize)?;

    let width = feature_map.size().width() as usize;

    let rows: Result<Vec<Vec<u8>>, GeneratePixelBufferError<CMap::Failure>> = feature_map
        .values()
        .par_chunks(width)
        .map(|row| render_row(row, mapper, cell_size, cancel))
        .collect();

    // Rows come back in input order, so concatenating keeps the image row-major.
    let buffer: PixelBufferData = rows?.concat();

    Ok(PixelBuffer::from_data(output_size, buffer)?)
}

/// Maps one feature-map row and expands it into `cell_size` identical pixel rows.
fn render_row<CMap, C>(
    row: &[f64],
    mapper: &CMap,
    cell_size: u32,
    cancel: &C,
) -> Result<Vec<u8>, GeneratePixelBufferError<CMap::Failure>>
where
    CMap: ColourMap<T = f64>,
    C: CancelToken,
{
    let cell_size = cell_size as usize;
    let line_len = row.len() * cell_size * BYTES_PER_PIXEL;
    let mut line: Vec<u8> = Vec::with_capacity(line_len);

    for (i, &value) in row.iter().enumerate() {
        if i % CANCEL_CHECK_INTERVAL_CELLS == 0 && cancel.is_cancelled() {
            return Err(GeneratePixelBufferError::Cancelled(Cancelled));
        }

        let Colour { r, g, b } = mapper
            .map(value)
            .map_err(GeneratePixelBufferError::ColourMap)?;

        for _ in 0..cell_size {
            line.extend_from_slice(&[r, g, b]);
        }
    }

    Ok(line.repeat(cell_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::colour_maps::diverging::DivergingColourMap;
    use crate::core::data::grid_size::GridSize;
    use crate::core::data::point::Point;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct StubError {}

    impl fmt::Display for StubError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "StubColourMapError")
        }
    }

    impl Error for StubError {}

    /// Writes the value straight into every channel.
    #[derive(Debug)]
    struct StubColourMapSuccess {}

    impl ColourMap for StubColourMapSuccess {
        type T = f64;
        type Failure = StubError;

        fn map(&self, value: f64) -> Result<Colour, StubError> {
            let v = value as u8;
            Ok(Colour { r: v, g: v, b: v })
        }

        fn display_name(&self) -> &str {
            "Stub Success"
        }
    }

    #[derive(Debug)]
    struct StubColourMapFailure {}

    impl ColourMap for StubColourMapFailure {
        type T = f64;
        type Failure = StubError;

        fn map(&self, _: f64) -> Result<Colour, StubError> {
            Err(StubError {})
        }

        fn display_name(&self) -> &str {
            "Stub Failure"
        }
    }

    fn create_feature_map(width: u32, height: u32) -> FeatureMap {
        let size = GridSize::new(width, height).unwrap();
        let values = (0..size.cell_count()).map(|i| (i % 256) as f64).collect();

        FeatureMap::from_data(size, values).unwrap()
    }

    #[test]
    fn test_generates_pixel_buffer_correctly() {
        let feature_map = create_feature_map(3, 2);
        let results = generate_pixel_buffer(&feature_map, &StubColourMapSuccess {}, 1).unwrap();

        assert_eq!(results.size(), feature_map.size());
        assert_eq!(
            results.buffer(),
            &vec![0u8, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5, 5]
        );
    }

    #[test]
    fn test_cell_size_expands_each_cell_into_a_block() {
        let feature_map = create_feature_map(2, 2);
        let results = generate_pixel_buffer(&feature_map, &StubColourMapSuccess {}, 2).unwrap();

        assert_eq!(results.size(), GridSize::new(4, 4).unwrap());

        for y in 0..4 {
            for x in 0..4 {
                let source = feature_map.get(Point { x: x / 2, y: y / 2 }).unwrap() as u8;

                assert_eq!(
                    results.pixel(Point { x, y }),
                    Some(Colour::new(source, source, source)),
                    "pixel ({}, {})",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_zero_cell_size_is_rejected() {
        let feature_map = create_feature_map(2, 2);
        let result = generate_pixel_buffer(&feature_map, &StubColourMapSuccess {}, 0);

        assert!(matches!(
            result,
            Err(GeneratePixelBufferError::InvalidCellSize(
                GridSizeError::InvalidSize { width: 0, height: 0 }
            ))
        ));
    }

    #[test]
    fn test_propagates_colour_map_failure() {
        let feature_map = create_feature_map(3, 2);
        let result = generate_pixel_buffer(&feature_map, &StubColourMapFailure {}, 1);

        assert!(matches!(result, Err(GeneratePixelBufferError::ColourMap(StubError {}))));
    }

    #[test]
    fn test_renders_diverging_heatmap() {
        let feature_map = FeatureMap::from_rows(vec![vec![1.0, 0.0, -1.0]]).unwrap();
        let results = generate_pixel_buffer(&feature_map, &DivergingColourMap, 1).unwrap();

        assert_eq!(
            results.buffer(),
            &vec![51u8, 128, 255, 255, 255, 255, 255, 128, 51]
        );
    }

    #[test]
    fn test_rayon_generates_same_results_as_serial() {
        let feature_map = create_feature_map(37, 23);

        for cell_size in [1, 3] {
            let serial = generate_pixel_buffer(&feature_map, &StubColourMapSuccess {}, cell_size).unwrap();
            let parallel =
                generate_pixel_buffer_rayon(&feature_map, &StubColourMapSuccess {}, cell_size).unwrap();

            assert_eq!(parallel, serial);
        }
    }

    #[test]
    fn test_rayon_propagates_colour_map_failure() {
        let feature_map = create_feature_map(4, 4);
        let result = generate_pixel_buffer_rayon(&feature_map, &StubColourMapFailure {}, 2);

        assert!(matches!(result, Err(GeneratePixelBufferError::ColourMap(_))));
    }

    #[test]
    fn test_cancelable_returns_cancelled_when_token_is_cancelled() {
        let feature_map = create_feature_map(3, 2);
        let cancelled = AtomicBool::new(true);
        let cancel_token = || cancelled.load(Ordering::Relaxed);

        let serial =
            generate_pixel_buffer_cancelable(&feature_map, &StubColourMapSuccess {}, 1, &cancel_token);
        let parallel = generate_pixel_buffer_rayon_cancelable(
            &feature_map,
            &StubColourMapSuccess {},
            1,
            &cancel_token,
        );

        assert!(matches!(serial, Err(GeneratePixelBufferError::Cancelled(_))));
        assert!(matches!(parallel, Err(GeneratePixelBufferError::Cancelled(_))));
    }

    #[test]
    fn test_cancellation_polled_at_row_start() {
        let feature_map = create_feature_map(2, 5);
        let poll_count = AtomicUsize::new(0);
        let cancel_token = || {
            poll_count.fetch_add(1, Ordering::Relaxed);
            false
        };

        let result =
            generate_pixel_buffer_cancelable(&feature_map, &StubColourMapSuccess {}, 1, &cancel_token);

        assert!(result.is_ok());
        assert_eq!(poll_count.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_cancellation_polled_multiple_times_on_wide_rows() {
        // 3000 cells per row polls at 0, 1024 and 2048.
        let feature_map = create_feature_map(3000, 2);
        let poll_count = AtomicUsize::new(0);
        let cancel_token = || {
            poll_count.fetch_add(1, Ordering::Relaxed);
            false
        };

        let result = generate_pixel_buffer_rayon_cancelable(
            &feature_map,
            &StubColourMapSuccess {},
            1,
            &cancel_token,
        );

        assert!(result.is_ok());
        assert_eq!(poll_count.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_cancels_after_k_polls() {
        let feature_map = create_feature_map(4, 6);
        let poll_count = AtomicUsize::new(0);
        let cancel_token = || poll_count.fetch_add(1, Ordering::Relaxed) >= 3;

        let result =
            generate_pixel_buffer_cancelable(&feature_map, &StubColourMapSuccess {}, 1, &cancel_token);

        assert!(matches!(result, Err(GeneratePixelBufferError::Cancelled(_))));
        assert_eq!(poll_count.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_error_displays_cancelled() {
        let err: GeneratePixelBufferError<StubError> = GeneratePixelBufferError::Cancelled(Cancelled);

        assert_eq!(format!("{}", err), "operation cancelled");
    }

    #[test]
    fn test_error_displays_colour_map_error() {
        let err = GeneratePixelBufferError::ColourMap(StubError {});

        assert_eq!(format!("{}", err), "colour map error: StubColourMapError");
    }
}
