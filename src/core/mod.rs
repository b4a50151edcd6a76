pub mod actions;
pub mod colour_maps;
pub mod data;
