//! Card extraction - locating a single card in a photograph and
//! rectifying it into a true-scale, alpha-masked raster.
//!
//! The pipeline assumes one light card photographed on a darker, evenly
//! lit background. The largest bright region above the binarization
//! threshold is taken to be the card; its four corners are recovered from
//! the traced boundary, a perspective transform maps them onto an
//! axis-aligned rectangle at the requested physical scale, and the result
//! is finished with an anti-aliased rounded-corner opacity mask.

mod contour;
mod extract;
mod io;
mod mask;
mod options;
mod quad;

pub use extract::{ExtractedCard, extract, extract_batch};
pub use io::{load_photo, save_card_png};
pub use mask::rounded_corner_mask;
pub use options::{CornerPolicy, ExtractOptions};
pub use quad::Quadrilateral;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// Nothing in the photograph is brighter than the threshold.
    #[error("no contour found above threshold {0}")]
    NoContourFound(u8),
    /// The detected boundary is too small to form a card outline.
    #[error("boundary too small to form a card outline")]
    DegenerateContour,
    #[error("invalid extraction options: {0}")]
    Config(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
