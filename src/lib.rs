mod controllers;
mod core;
mod presenters;
mod storage;

pub use crate::controllers::cli::heatmap::{HeatmapController, HeatmapControllerError};
pub use crate::controllers::cli::heatmap_config::{DEFAULT_CELL_SIZE, HeatmapConfig};
pub use crate::controllers::ports::file_presenter::FilePresenterPort;
pub use crate::core::actions::cancellation::{CancelFlag, CancelToken, Cancelled, NeverCancel};
pub use crate::core::actions::generate_pixel_buffer::generate_pixel_buffer::{
    GeneratePixelBufferError, generate_pixel_buffer, generate_pixel_buffer_cancelable,
    generate_pixel_buffer_rayon, generate_pixel_buffer_rayon_cancelable,
};
pub use crate::core::actions::generate_pixel_buffer::ports::colour_map::ColourMap;
pub use crate::core::colour_maps::diverging::{
    DivergingColourMap, NEAR_ZERO_THRESHOLD, NEUTRAL_COLOUR, diverging_colour,
};
pub use crate::core::data::colour::Colour;
pub use crate::core::data::feature_map::{FeatureMap, FeatureMapError, FeatureMapStack};
pub use crate::core::data::grid_size::{GridSize, GridSizeError};
pub use crate::core::data::normalisation::Normalisation;
pub use crate::core::data::pixel_buffer::{PixelBuffer, PixelBufferError};
pub use crate::core::data::point::Point;
pub use crate::presenters::file::ppm::PpmFilePresenter;
pub use crate::storage::load_feature_map::{
    LoadFeatureMapError, load_feature_maps, parse_feature_maps, read_feature_maps,
};
pub use crate::storage::write_ppm::write_ppm;
