//! Lossless PNG persistence for baselines and diagnostics.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ImageError, ImageFormat, RgbaImage};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors from reading or writing PNG files.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("png codec error: {0}")]
    Image(#[from] ImageError),
}

/// Decode PNG bytes into an RGBA8 image.
pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    Ok(image.to_rgba8())
}

/// Encode `image` as PNG and write it to `path`.
///
/// The parent directory is created if needed. The image is written to a
/// temporary file next to `path` and renamed into place, so readers never
/// observe a partial file and a failed write leaves nothing behind.
pub fn write_png_atomic(path: &Path, image: &RgbaImage) -> Result<(), CodecError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        image.write_to(&mut writer, ImageFormat::Png)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
