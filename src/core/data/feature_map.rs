use crate::core::data::grid_size::{GridSize, GridSizeError};
use crate::core::data::normalisation::Normalisation;
use crate::core::data::point::Point;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureMapError {
    Empty,
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    SizeMismatch {
        expected: usize,
        found: usize,
    },
    MismatchedChannels {
        channel: usize,
        expected: GridSize,
        found: GridSize,
    },
    GridSize(GridSizeError),
}

impl fmt::Display for FeatureMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "feature map has no cells"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => {
                write!(
                    f,
                    "row {} has {} values, expected {}",
                    row, found, expected
                )
            }
            Self::SizeMismatch { expected, found } => {
                write!(
                    f,
                    "feature map expects {} values but was given {}",
                    expected, found
                )
            }
            Self::MismatchedChannels {
                channel,
                expected,
                found,
            } => {
                write!(
                    f,
                    "channel {} is {}, expected {} like the first channel",
                    channel, found, expected
                )
            }
            Self::GridSize(err) => write!(f, "invalid feature map size: {}", err),
        }
    }
}

impl Error for FeatureMapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::GridSize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GridSizeError> for FeatureMapError {
    fn from(err: GridSizeError) -> Self {
        Self::GridSize(err)
    }
}

/// A single channel of layer activations, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    size: GridSize,
    values: Vec<f64>,
}

impl FeatureMap {
    pub fn from_data(size: GridSize, values: Vec<f64>) -> Result<Self, FeatureMapError> {
        if values.len() != size.cell_count() {
            return Err(FeatureMapError::SizeMismatch {
                expected: size.cell_count(),
                found: values.len(),
            });
        }

        Ok(Self { size, values })
    }

    /// Builds a map from nested rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, FeatureMapError> {
        let width = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(FeatureMapError::Empty),
        };

        let mut values = Vec::with_capacity(width * rows.len());

        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(FeatureMapError::RaggedRow {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }

            values.extend_from_slice(cells);
        }

        let size = match (u32::try_from(width), u32::try_from(rows.len())) {
            (Ok(width), Ok(height)) => GridSize::new(width, height)?,
            (width, height) => {
                return Err(FeatureMapError::GridSize(GridSizeError::TooLarge {
                    width: width.unwrap_or(u32::MAX),
                    height: height.unwrap_or(u32::MAX),
                }));
            }
        };

        Ok(Self { size, values })
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, point: Point) -> Option<f64> {
        self.size.index_of(point).map(|index| self.values[index])
    }

    /// Iterates the map one row at a time, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.size.width() as usize)
    }

    /// Largest magnitude among the finite cells, if there are any.
    #[must_use]
    pub fn max_abs(&self) -> Option<f64> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .map(|v| v.abs())
            .reduce(f64::max)
    }

    /// Rescales the map according to `normalisation`.
    ///
    /// Non-finite cells are left untouched. A map with no non-zero finite
    /// cell cannot be scaled and is returned unchanged.
    #[must_use]
    pub fn normalised(mut self, normalisation: Normalisation) -> Self {
        match normalisation {
            Normalisation::None => self,
            Normalisation::MaxAbs => {
                let peak = match self.max_abs() {
                    Some(peak) if peak > 0.0 => peak,
                    _ => {
                        log::warn!(
                            "feature map {} has no non-zero finite values, skipping normalisation",
                            self.size
                        );
                        return self;
                    }
                };

                for value in self.values.iter_mut().filter(|v| v.is_finite()) {
                    *value /= peak;
                }

                self
            }
        }
    }
}

/// The channels of one layer. All channels share the same size.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMapStack {
    channels: Vec<FeatureMap>,
}

impl FeatureMapStack {
    pub fn new(channels: Vec<FeatureMap>) -> Result<Self, FeatureMapError> {
        let expected = match channels.first() {
            Some(first) => first.size(),
            None => return Err(FeatureMapError::Empty),
        };

        if let Some((channel, map)) = channels
            .iter()
            .enumerate()
            .find(|(_, map)| map.size() != expected)
        {
            return Err(FeatureMapError::MismatchedChannels {
                channel,
                expected,
                found: map.size(),
            });
        }

        Ok(Self { channels })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Always false; a stack holds at least one channel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[must_use]
    pub fn channels(&self) -> &[FeatureMap] {
        &self.channels
    }

    #[must_use]
    pub fn into_channels(self) -> Vec<FeatureMap> {
        self.channels
    }
}

impl From<FeatureMap> for FeatureMapStack {
    fn from(map: FeatureMap) -> Self {
        Self {
            channels: vec![map],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_feature_map(rows: &[&[f64]]) -> FeatureMap {
        FeatureMap::from_rows(rows.iter().map(|row| row.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_from_rows_flattens_row_major() {
        let map = create_feature_map(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);

        assert_eq!(map.size(), GridSize::new(3, 2).unwrap());
        assert_eq!(map.values(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(map.get(Point { x: 0, y: 1 }), Some(4.0));
        assert_eq!(map.get(Point { x: 3, y: 0 }), None);
    }

    #[test]
    fn test_from_rows_rejects_empty_input() {
        assert_eq!(FeatureMap::from_rows(vec![]), Err(FeatureMapError::Empty));
        assert_eq!(
            FeatureMap::from_rows(vec![vec![], vec![]]),
            Err(FeatureMapError::Empty)
        );
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let result = FeatureMap::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);

        assert_eq!(
            result,
            Err(FeatureMapError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_from_data_checks_length() {
        let size = GridSize::new(2, 2).unwrap();

        assert!(FeatureMap::from_data(size, vec![0.0; 4]).is_ok());
        assert_eq!(
            FeatureMap::from_data(size, vec![0.0; 3]),
            Err(FeatureMapError::SizeMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_rows_iterates_each_row() {
        let map = create_feature_map(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        let rows: Vec<&[f64]> = map.rows().collect();

        assert_eq!(rows, vec![&[1.0, 2.0][..], &[3.0, 4.0][..], &[5.0, 6.0][..]]);
    }

    #[test]
    fn test_max_abs_ignores_non_finite_values() {
        let map = create_feature_map(&[&[0.5, -3.0], &[f64::NAN, f64::INFINITY]]);

        assert_eq!(map.max_abs(), Some(3.0));
    }

    #[test]
    fn test_max_abs_is_none_without_finite_values() {
        let map = create_feature_map(&[&[f64::NAN]]);

        assert_eq!(map.max_abs(), None);
    }

    #[test]
    fn test_normalise_none_is_identity() {
        let map = create_feature_map(&[&[4.0, -2.0]]);

        assert_eq!(map.clone().normalised(Normalisation::None), map);
    }

    #[test]
    fn test_normalise_max_abs_scales_peak_to_one() {
        let map = create_feature_map(&[&[4.0, -2.0], &[1.0, -8.0]]).normalised(Normalisation::MaxAbs);

        assert_eq!(map.values(), &[0.5, -0.25, 0.125, -1.0]);
    }

    #[test]
    fn test_normalise_max_abs_leaves_all_zero_map_unchanged() {
        let map = create_feature_map(&[&[0.0, 0.0]]);

        assert_eq!(map.clone().normalised(Normalisation::MaxAbs), map);
    }

    #[test]
    fn test_normalise_max_abs_keeps_nan_cells() {
        let map = create_feature_map(&[&[2.0, f64::NAN]]).normalised(Normalisation::MaxAbs);

        assert_eq!(map.values()[0], 1.0);
        assert!(map.values()[1].is_nan());
    }

    #[test]
    fn test_stack_requires_matching_sizes() {
        let a = create_feature_map(&[&[1.0, 2.0]]);
        let b = create_feature_map(&[&[1.0], &[2.0]]);

        let result = FeatureMapStack::new(vec![a.clone(), b]);

        assert_eq!(
            result,
            Err(FeatureMapError::MismatchedChannels {
                channel: 1,
                expected: GridSize::new(2, 1).unwrap(),
                found: GridSize::new(1, 2).unwrap(),
            })
        );
        assert_eq!(FeatureMapStack::new(vec![a.clone(), a]).unwrap().len(), 2);
    }

    #[test]
    fn test_stack_rejects_no_channels() {
        assert_eq!(FeatureMapStack::new(vec![]), Err(FeatureMapError::Empty));
    }

    #[test]
    fn test_single_map_converts_into_stack() {
        let map = create_feature_map(&[&[1.0]]);
        let stack = FeatureMapStack::from(map.clone());

        assert_eq!(stack.channels(), &[map]);
        assert!(!stack.is_empty());
    }
}
