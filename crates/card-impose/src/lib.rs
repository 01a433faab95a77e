//! Duplex card imposition - arranging rectified card rasters onto
//! print-ready page grids.
//!
//! The engine follows the page pipeline:
//! 1. [`group_by_size`] partitions a print run by exact physical size
//! 2. [`layout`] turns one group into an alternating Front/Back page
//!    sequence, mirroring back cells for duplex alignment
//! 3. [`render_pdf_bytes`] / [`generate_pdf`] hand the placements to the
//!    PDF writer
//!
//! Layout is pure geometry over raster ids; the rasters themselves are
//! only touched at render time.

mod layout;
mod options;
mod render;
mod stats;
mod types;

pub use layout::{PageGrid, group_by_size, layout};
pub use options::ImpositionOptions;
pub use render::{generate_pdf, render_pdf_bytes};
pub use stats::calculate_statistics;
pub use types::*;
