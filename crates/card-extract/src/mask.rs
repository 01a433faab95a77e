use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

/// Opacity mask for a rectified card: fully opaque except at the four
/// corners, each clipped by a quarter-circle of `radius_px` and
/// anti-aliased at the circular boundary.
pub fn rounded_corner_mask(width: u32, height: u32, radius_px: f32) -> GrayImage {
    let mut mask = GrayImage::from_pixel(width, height, Luma([255]));

    // A radius beyond half the shorter side would make the corner arcs
    // overlap; clamp so the outline stays well defined.
    let radius = radius_px.min(width.min(height) as f32 / 2.0);
    if radius <= 0.5 {
        return mask;
    }

    let w = width as f32;
    let h = height as f32;
    for y in 0..height {
        for x in 0..width {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            // Only pixels inside one of the corner squares can fall
            // outside the rounded outline.
            if (px >= radius && px <= w - radius) || (py >= radius && py <= h - radius) {
                continue;
            }

            let cx = if px < radius { radius } else { w - radius };
            let cy = if py < radius { radius } else { h - radius };
            let distance = (px - cx).hypot(py - cy);
            let coverage = (radius - distance + 0.5).clamp(0.0, 1.0);
            mask.put_pixel(x, y, Luma([(coverage * 255.0).round() as u8]));
        }
    }

    mask
}

/// Merge rectified color data with an opacity mask into a 4-channel
/// raster. The two must share dimensions.
pub(crate) fn apply_alpha_mask(color: &RgbImage, mask: &GrayImage) -> RgbaImage {
    debug_assert_eq!(color.dimensions(), mask.dimensions());

    let (width, height) = color.dimensions();
    let mut out = RgbaImage::new(width, height);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let Rgb([r, g, b]) = *color.get_pixel(x, y);
        let Luma([alpha]) = *mask.get_pixel(x, y);
        *pixel = Rgba([r, g, b, alpha]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_radius_is_fully_opaque() {
        let mask = rounded_corner_mask(40, 60, 0.0);
        assert!(mask.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn corners_fall_off_to_transparent() {
        let mask = rounded_corner_mask(630, 880, 30.0);

        // The extreme corner pixels lie far outside the arc.
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(629, 0)[0], 0);
        assert_eq!(mask.get_pixel(0, 879)[0], 0);
        assert_eq!(mask.get_pixel(629, 879)[0], 0);

        // Just inside the arc the mask is solid again.
        assert_eq!(mask.get_pixel(29, 29)[0], 255);

        // Mid-edge and center pixels are untouched by the rounding.
        assert_eq!(mask.get_pixel(315, 0)[0], 255);
        assert_eq!(mask.get_pixel(0, 440)[0], 255);
        assert_eq!(mask.get_pixel(315, 440)[0], 255);

        // The boundary itself is anti-aliased: the diagonal crosses the
        // arc through at least one partially covered pixel.
        let partial = (0..30)
            .map(|k| mask.get_pixel(k, k)[0])
            .filter(|&a| a > 0 && a < 255)
            .count();
        assert!(partial >= 1);
    }

    #[test]
    fn oversized_radius_is_clamped() {
        // Radius larger than half the shorter side must not panic or
        // produce overlapping corner artifacts on the long edge midline.
        let mask = rounded_corner_mask(20, 60, 50.0);
        assert_eq!(mask.get_pixel(10, 30)[0], 255);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn mask_merges_into_alpha_channel() {
        let color = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        let mut mask = GrayImage::from_pixel(4, 4, Luma([255]));
        mask.put_pixel(0, 0, Luma([0]));
        mask.put_pixel(1, 0, Luma([128]));

        let out = apply_alpha_mask(&color, &mask);
        assert_eq!(*out.get_pixel(0, 0), Rgba([1, 2, 3, 0]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([1, 2, 3, 128]));
        assert_eq!(*out.get_pixel(3, 3), Rgba([1, 2, 3, 255]));
    }
}
