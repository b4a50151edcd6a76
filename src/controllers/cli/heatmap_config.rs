use crate::core::data::normalisation::Normalisation;

pub const DEFAULT_CELL_SIZE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapConfig {
    /// Edge length in pixels of one rendered feature-map cell.
    pub cell_size: u32,
    pub normalisation: Normalisation,
    /// Render rows on rayon's thread pool.
    pub parallel: bool,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            normalisation: Normalisation::default(),
            parallel: true,
        }
    }
}
