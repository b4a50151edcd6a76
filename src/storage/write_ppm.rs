use crate::core::data::pixel_buffer::PixelBuffer;
use std::io::Write;

/// Encodes `buffer` as a binary (P6) PPM image.
pub fn write_ppm<W: Write>(buffer: &PixelBuffer, writer: &mut W) -> std::io::Result<()> {
    let size = buffer.size();

    // P6 means binary RGB, then width height max_colour
    writeln!(writer, "P6")?;
    writeln!(writer, "{} {}", size.width(), size.height())?;
    writeln!(writer, "255")?;
    writer.write_all(buffer.buffer())?;

    Ok(())
}
