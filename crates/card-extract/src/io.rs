//! Async photo loading and card saving.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};

use crate::Result;

/// Load a photograph (PNG or JPEG) as an opaque RGB raster.
pub async fn load_photo(path: impl AsRef<Path>) -> Result<RgbImage> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    let photo = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map(|img| img.to_rgb8())
    })
    .await??;
    Ok(photo)
}

/// Encode a rectified card as PNG (the only common format that keeps the
/// rounded-corner transparency) and write it out.
pub async fn save_card_png(image: RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let bytes = tokio::task::spawn_blocking(move || {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image).write_to(&mut buffer, ImageFormat::Png)?;
        Ok::<_, image::ImageError>(buffer.into_inner())
    })
    .await??;
    tokio::fs::write(path.as_ref(), bytes).await?;
    Ok(())
}
