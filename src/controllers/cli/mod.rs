pub mod heatmap;
pub mod heatmap_config;
