use image::{GrayImage, RgbImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::filter::gaussian_blur_f32;
use imageproc::point::Point;
use log::debug;

use crate::quad::boundary_area;

/// Grayscale, denoise and binarize a photograph.
///
/// The blur kernel spans roughly 1% of the longer photo dimension: wide
/// enough to remove single-pixel speckle from the background, narrow
/// enough to leave the card edges in place.
pub(crate) fn binarize(photo: &RgbImage, thresh: u8) -> GrayImage {
    let gray = image::imageops::grayscale(photo);

    let longest = photo.width().max(photo.height());
    let kernel = ((longest as f32 * 0.01).round() as u32).max(3) | 1;
    let sigma = kernel as f32 / 6.0;
    let blurred = gaussian_blur_f32(&gray, sigma);

    threshold(&blurred, thresh, ThresholdType::Binary)
}

/// Trace the outer boundaries of the binarized foreground and return the
/// one enclosing the largest area.
///
/// Only outer borders are candidates: dark shapes printed on the card form
/// hole borders and must never be mistaken for separate regions.
pub(crate) fn largest_outer_boundary(mask: &GrayImage) -> Option<Vec<Point<i32>>> {
    let mut best: Option<Vec<Point<i32>>> = None;
    let mut best_area = 0.0f64;

    for contour in find_contours::<i32>(mask) {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        let area = boundary_area(&contour.points);
        if best.is_none() || area > best_area {
            best_area = area;
            best = Some(contour.points);
        }
    }

    if let Some(points) = &best {
        debug!(
            "selected outer boundary: {} points, area {:.0} px^2",
            points.len(),
            best_area
        );
    }
    best
}
