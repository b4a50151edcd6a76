use crate::core::data::feature_map::{FeatureMap, FeatureMapError, FeatureMapStack};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug)]
pub enum LoadFeatureMapError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    FeatureMap(FeatureMapError),
}

impl fmt::Display for LoadFeatureMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read feature map: {}", err),
            Self::Parse(err) => write!(f, "feature map is not a 2-D or 3-D number array: {}", err),
            Self::FeatureMap(err) => write!(f, "invalid feature map: {}", err),
        }
    }
}

impl Error for LoadFeatureMapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::FeatureMap(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for LoadFeatureMapError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for LoadFeatureMapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<FeatureMapError> for LoadFeatureMapError {
    fn from(err: FeatureMapError) -> Self {
        Self::FeatureMap(err)
    }
}

// `null` cells are kept as missing values and rendered as NaN.
type JsonRows = Vec<Vec<Option<f64>>>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureMapJson {
    Single(JsonRows),
    Stack(Vec<JsonRows>),
}

fn rows_to_feature_map(rows: JsonRows) -> Result<FeatureMap, FeatureMapError> {
    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect();

    FeatureMap::from_rows(rows)
}

impl FeatureMapJson {
    fn into_stack(self) -> Result<FeatureMapStack, FeatureMapError> {
        match self {
            Self::Single(rows) => Ok(rows_to_feature_map(rows)?.into()),
            Self::Stack(channels) => {
                let maps = channels
                    .into_iter()
                    .map(rows_to_feature_map)
                    .collect::<Result<Vec<_>, _>>()?;

                FeatureMapStack::new(maps)
            }
        }
    }
}

/// Reads a feature map from JSON.
///
/// Accepts a 2-D array (`[[f64]]`, one channel) or a 3-D array
/// (`[[[f64]]]`, one entry per channel).
pub fn read_feature_maps<R: Read>(reader: R) -> Result<FeatureMapStack, LoadFeatureMapError> {
    let json: FeatureMapJson = serde_json::from_reader(reader)?;

    Ok(json.into_stack()?)
}

pub fn parse_feature_maps(json: &str) -> Result<FeatureMapStack, LoadFeatureMapError> {
    read_feature_maps(json.as_bytes())
}

pub fn load_feature_maps(filepath: impl AsRef<Path>) -> Result<FeatureMapStack, LoadFeatureMapError> {
    let file = File::open(filepath)?;

    read_feature_maps(BufReader::new(file))
}
