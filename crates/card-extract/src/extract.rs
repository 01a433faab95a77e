use image::{Rgb, RgbImage, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use log::{debug, info};

use crate::contour::{binarize, largest_outer_boundary};
use crate::mask::{apply_alpha_mask, rounded_corner_mask};
use crate::options::{CornerPolicy, ExtractOptions};
use crate::quad::{Quadrilateral, hull_boundary};
use crate::{ExtractError, Result};

/// A rectified, alpha-masked card.
#[derive(Debug, Clone)]
pub struct ExtractedCard {
    /// The rectified 4-channel raster, exactly
    /// `floor(width_mm * px/mm) x floor(height_mm * px/mm)` pixels.
    pub image: RgbaImage,
    /// The corners the card was recovered from, in photo coordinates.
    pub source_quad: Quadrilateral,
}

impl ExtractedCard {
    /// Human-readable result line, e.g. for display next to a saved card.
    pub fn summary(&self) -> String {
        format!(
            "card rectified to {}x{} px",
            self.image.width(),
            self.image.height()
        )
    }
}

/// Extract a single card from a photograph.
///
/// The photograph must show one light card on a darker, evenly lit
/// background; the largest bright region is assumed to be the card. The
/// original (unblurred) pixels are resampled through the recovered
/// perspective transform, so the denoising blur never reaches the output.
///
/// The function has no side effects and is deterministic for identical
/// inputs. Both failure modes are recoverable: retry with a different
/// threshold or a cleaner photograph.
pub fn extract(photo: &RgbImage, options: &ExtractOptions) -> Result<ExtractedCard> {
    options.validate()?;
    let (dst_w, dst_h) = options.output_dimensions();

    let mask = binarize(photo, options.threshold);
    let boundary = largest_outer_boundary(&mask)
        .ok_or(ExtractError::NoContourFound(options.threshold))?;

    let quad = match options.corner_policy {
        CornerPolicy::Extremes => Quadrilateral::from_boundary(&boundary),
        CornerPolicy::ConvexHull => Quadrilateral::from_boundary(&hull_boundary(&boundary)),
    }
    .ok_or(ExtractError::DegenerateContour)?;
    debug!("recovered corners: {:?}", quad);

    let dst = [
        (0.0, 0.0),
        (dst_w as f32 - 1.0, 0.0),
        (dst_w as f32 - 1.0, dst_h as f32 - 1.0),
        (0.0, dst_h as f32 - 1.0),
    ];
    // Collinear corners admit no invertible transform.
    let projection = Projection::from_control_points(quad.corners(), dst)
        .ok_or(ExtractError::DegenerateContour)?;

    let mut warped = RgbImage::new(dst_w, dst_h);
    warp_into(
        photo,
        &projection,
        Interpolation::Bilinear,
        Rgb([0, 0, 0]),
        &mut warped,
    );

    let radius_px = options.corner_radius_mm * options.pixels_per_mm;
    let alpha = rounded_corner_mask(dst_w, dst_h, radius_px);
    let image = apply_alpha_mask(&warped, &alpha);

    info!("extracted card at {}x{} px", dst_w, dst_h);
    Ok(ExtractedCard {
        image,
        source_quad: quad,
    })
}

/// Extract cards from a batch of photographs.
///
/// Photographs are processed concurrently on the blocking pool, one task
/// each; a failed extraction never aborts the rest. Results come back in
/// submission order, one per input, so callers can pair them with their
/// file names.
pub async fn extract_batch(
    photos: Vec<RgbImage>,
    options: &ExtractOptions,
) -> Vec<Result<ExtractedCard>> {
    let mut handles = Vec::with_capacity(photos.len());
    for photo in photos {
        let options = options.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            extract(&photo, &options)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(match handle.await {
            Ok(result) => result,
            Err(err) => Err(ExtractError::TaskJoin(err)),
        });
    }
    results
}
