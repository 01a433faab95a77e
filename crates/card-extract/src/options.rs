use crate::{ExtractError, Result};

/// How the four card corners are recovered from the traced boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerPolicy {
    /// Scan every boundary point for the coordinate sum/difference
    /// extremes. Exact for axis-aligned and mildly rotated cards; degrades
    /// beyond ~45 degrees of rotation or with protruding boundary noise.
    #[default]
    Extremes,
    /// Reduce the boundary to its convex hull before the extremes
    /// selection, which discards protruding noise points.
    ConvexHull,
}

/// Parameters for a single extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Physical card width in millimetres.
    pub width_mm: f32,
    /// Physical card height in millimetres.
    pub height_mm: f32,
    /// Output resolution in pixels per millimetre.
    pub pixels_per_mm: f32,
    /// Binarization threshold on the 8-bit luminance scale. Pixels
    /// brighter than this are treated as card, darker as background: the
    /// photograph must show a light card on a dark background. The
    /// polarity is not auto-detected.
    pub threshold: u8,
    /// Corner rounding radius in millimetres, independent of card size.
    pub corner_radius_mm: f32,
    pub corner_policy: CornerPolicy,
}

impl ExtractOptions {
    /// Options for a card of the given physical size, with the usual
    /// defaults: 10 px/mm, threshold 45, 3 mm corner radius.
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width_mm,
            height_mm,
            pixels_per_mm: 10.0,
            threshold: 45,
            corner_radius_mm: 3.0,
            corner_policy: CornerPolicy::default(),
        }
    }

    /// Output raster dimensions in pixels (physical size times resolution,
    /// rounded down).
    pub fn output_dimensions(&self) -> (u32, u32) {
        (
            (self.width_mm * self.pixels_per_mm).floor() as u32,
            (self.height_mm * self.pixels_per_mm).floor() as u32,
        )
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.width_mm > 0.0 && self.height_mm > 0.0) {
            return Err(ExtractError::Config(
                "card dimensions must be positive".to_string(),
            ));
        }
        if !(self.pixels_per_mm > 0.0) {
            return Err(ExtractError::Config(
                "resolution must be positive".to_string(),
            ));
        }
        if self.corner_radius_mm < 0.0 {
            return Err(ExtractError::Config(
                "corner radius must not be negative".to_string(),
            ));
        }
        let (width, height) = self.output_dimensions();
        if width == 0 || height == 0 {
            return Err(ExtractError::Config(format!(
                "output raster would be empty ({}x{} px)",
                width, height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dimensions_round_down() {
        let mut options = ExtractOptions::new(63.0, 88.0);
        assert_eq!(options.output_dimensions(), (630, 880));

        options.pixels_per_mm = 5.5;
        // 63 * 5.5 = 346.5, 88 * 5.5 = 484.0
        assert_eq!(options.output_dimensions(), (346, 484));
    }

    #[test]
    fn rejects_degenerate_targets() {
        let options = ExtractOptions::new(0.0, 88.0);
        assert!(options.validate().is_err());

        let mut options = ExtractOptions::new(63.0, 88.0);
        options.pixels_per_mm = 0.0;
        assert!(options.validate().is_err());

        // Positive but so small the raster rounds down to nothing.
        let mut options = ExtractOptions::new(0.05, 88.0);
        options.pixels_per_mm = 10.0;
        assert!(options.validate().is_err());
    }
}
