pub mod colour;
pub mod feature_map;
pub mod grid_size;
pub mod normalisation;
pub mod pixel_buffer;
pub mod point;
