pub mod load_feature_map;
pub mod write_ppm;
