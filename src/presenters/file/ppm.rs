use crate::controllers::ports::file_presenter::FilePresenterPort;
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::storage::write_ppm::write_ppm;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes heatmaps to disk as PPM images, creating missing parent directories.
#[derive(Debug, Default)]
pub struct PpmFilePresenter {}

impl FilePresenterPort for PpmFilePresenter {
    fn present(&self, buffer: &PixelBuffer, filepath: impl AsRef<Path>) -> std::io::Result<()> {
        let filepath = filepath.as_ref();

        if let Some(parent) = filepath.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(filepath)?);
        write_ppm(buffer, &mut writer)?;
        writer.flush()?;

        log::debug!("wrote {} heatmap to {}", buffer.size(), filepath.display());

        Ok(())
    }
}

impl PpmFilePresenter {
    pub fn new() -> Self {
        Self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::grid_size::GridSize;

    #[test]
    fn test_present_creates_directories_and_writes_ppm() {
        let dir = std::env::temp_dir().join(format!("melmage_ppm_presenter_{}", std::process::id()));
        let filepath = dir.join("nested").join("map.ppm");
        let buffer = PixelBuffer::new(GridSize::new(2, 1).unwrap());

        PpmFilePresenter::new().present(&buffer, &filepath).unwrap();

        let written = fs::read(&filepath).unwrap();
        assert!(written.starts_with(b"P6\n2 1\n255\n"));
        assert_eq!(written.len(), 11 + 6);

        fs::remove_dir_all(&dir).unwrap();
    }
}
