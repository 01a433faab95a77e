use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Imposition configuration for a print run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpositionOptions {
    pub paper_size: PaperSize,
    /// Uniform page margin in millimetres.
    pub margin_mm: f32,
    /// Duplex flip convention used to mirror back pages.
    pub flip_edge: FlipEdge,
    /// Stroke light-gray cutting frames around each occupied cell.
    pub cut_guides: bool,
}

impl Default for ImpositionOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            margin_mm: 10.0,
            flip_edge: FlipEdge::Long,
            cut_guides: true,
        }
    }
}

impl ImpositionOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| ImposeError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ImposeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let (page_w, page_h) = self.paper_size.dimensions_mm();
        if page_w <= 0.0 || page_h <= 0.0 {
            return Err(ImposeError::Config(
                "page dimensions must be positive".to_string(),
            ));
        }
        if self.margin_mm < 0.0 {
            return Err(ImposeError::Config(
                "margin must not be negative".to_string(),
            ));
        }
        if 2.0 * self.margin_mm >= page_w.min(page_h) {
            return Err(ImposeError::Config(format!(
                "margin of {} mm leaves no usable area on the page",
                self.margin_mm
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_validate() {
        assert!(ImpositionOptions::default().validate().is_ok());
    }

    #[test]
    fn excessive_margin_is_rejected() {
        let options = ImpositionOptions {
            margin_mm: 110.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[tokio::test]
    async fn options_round_trip_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("impose.json");

        let options = ImpositionOptions {
            paper_size: PaperSize::Letter,
            margin_mm: 8.0,
            flip_edge: FlipEdge::Short,
            cut_guides: false,
        };
        options.save(&path).await.unwrap();

        let loaded = ImpositionOptions::load(&path).await.unwrap();
        assert_eq!(loaded, options);
    }
}
