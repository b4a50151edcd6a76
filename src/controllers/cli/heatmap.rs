use std::convert::Infallible;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::controllers::cli::heatmap_config::HeatmapConfig;
use crate::controllers::ports::file_presenter::FilePresenterPort;
use crate::core::actions::cancellation::CancelFlag;
use crate::core::actions::generate_pixel_buffer::generate_pixel_buffer::{
    GeneratePixelBufferError, generate_pixel_buffer_cancelable,
    generate_pixel_buffer_rayon_cancelable,
};
use crate::core::colour_maps::diverging::DivergingColourMap;
use crate::core::data::feature_map::FeatureMapStack;
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::storage::load_feature_map::{LoadFeatureMapError, load_feature_maps};

#[derive(Debug)]
pub enum HeatmapControllerError {
    Load(LoadFeatureMapError),
    Render {
        channel: usize,
        source: GeneratePixelBufferError<Infallible>,
    },
    Present {
        filepath: PathBuf,
        source: std::io::Error,
    },
    NothingRendered,
}

impl fmt::Display for HeatmapControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => write!(f, "{}", err),
            Self::Render { channel, source } => {
                write!(f, "rendering channel {} failed: {}", channel, source)
            }
            Self::Present { filepath, source } => {
                write!(f, "writing {} failed: {}", filepath.display(), source)
            }
            Self::NothingRendered => write!(f, "no heatmap has been rendered yet"),
        }
    }
}

impl Error for HeatmapControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Render { source, .. } => Some(source),
            Self::Present { source, .. } => Some(source),
            Self::NothingRendered => None,
        }
    }
}

impl From<LoadFeatureMapError> for HeatmapControllerError {
    fn from(err: LoadFeatureMapError) -> Self {
        Self::Load(err)
    }
}

/// `out.ppm` becomes `out_3.ppm` for channel 3.
fn channel_path(filepath: &Path, channel: usize) -> PathBuf {
    let stem = filepath
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match filepath.extension() {
        Some(ext) => format!("{}_{}.{}", stem, channel, ext.to_string_lossy()),
        None => format!("{}_{}", stem, channel),
    };

    filepath.with_file_name(file_name)
}

/// Loads feature maps, renders each channel as a diverging heatmap and hands
/// the images to a file presenter.
pub struct HeatmapController<P: FilePresenterPort> {
    presenter: P,
    config: HeatmapConfig,
    colour_map: DivergingColourMap,
    cancel: CancelFlag,
    buffers: Vec<PixelBuffer>,
}

impl<P: FilePresenterPort> HeatmapController<P> {
    pub fn new(presenter: P, config: HeatmapConfig) -> Self {
        Self {
            presenter,
            config,
            colour_map: DivergingColourMap::new(),
            cancel: CancelFlag::new(),
            buffers: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> HeatmapConfig {
        self.config
    }

    /// A handle that aborts the current or next render when tripped.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelFlag {
        self.cancel.clone()
    }

    #[must_use]
    pub fn buffers(&self) -> &[PixelBuffer] {
        &self.buffers
    }

    pub fn load(&mut self, input: impl AsRef<Path>) -> Result<(), HeatmapControllerError> {
        let input = input.as_ref();
        let stack = load_feature_maps(input)?;

        log::info!(
            "Loaded {} channel(s) of {} from {}",
            stack.len(),
            stack.channels()[0].size(),
            input.display()
        );

        self.generate(stack)
    }

    pub fn generate(&mut self, stack: FeatureMapStack) -> Result<(), HeatmapControllerError> {
        self.buffers.clear();

        log::info!(
            "Rendering {} channel(s), cell size {}, normalisation: {}",
            stack.len(),
            self.config.cell_size,
            self.config.normalisation
        );

        let start = Instant::now();
        let mut buffers = Vec::with_capacity(stack.len());

        for (channel, feature_map) in stack.into_channels().into_iter().enumerate() {
            let feature_map = feature_map.normalised(self.config.normalisation);

            let rendered = if self.config.parallel {
                generate_pixel_buffer_rayon_cancelable(
                    &feature_map,
                    &self.colour_map,
                    self.config.cell_size,
                    &self.cancel,
                )
            } else {
                generate_pixel_buffer_cancelable(
                    &feature_map,
                    &self.colour_map,
                    self.config.cell_size,
                    &self.cancel,
                )
            };

            let buffer = rendered
                .map_err(|source| HeatmapControllerError::Render { channel, source })?;

            log::debug!("channel {} rendered at {}", channel, buffer.size());
            buffers.push(buffer);
        }

        log::info!("Duration: {:?}", start.elapsed());

        self.buffers = buffers;
        Ok(())
    }

    /// Writes every rendered channel and returns the paths written.
    ///
    /// A single channel goes to `filepath`; a stack writes one numbered file
    /// per channel beside it.
    pub fn write(&self, filepath: impl AsRef<Path>) -> Result<Vec<PathBuf>, HeatmapControllerError> {
        let filepath = filepath.as_ref();

        if self.buffers.is_empty() {
            return Err(HeatmapControllerError::NothingRendered);
        }

        let mut written = Vec::with_capacity(self.buffers.len());

        for (channel, buffer) in self.buffers.iter().enumerate() {
            let target = if self.buffers.len() == 1 {
                filepath.to_path_buf()
            } else {
                channel_path(filepath, channel)
            };

            self.presenter
                .present(buffer, &target)
                .map_err(|source| HeatmapControllerError::Present {
                    filepath: target.clone(),
                    source,
                })?;

            log::info!("Saved to {}", target.display());
            written.push(target);
        }

        Ok(written)
    }
}
