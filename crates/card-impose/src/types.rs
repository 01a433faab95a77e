use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImposeError {
    /// Not even a single card of this size fits the usable page area.
    #[error("cards of {width_mm}x{height_mm} mm cannot fit on the page inside its margins")]
    UngroupableLayout { width_mm: f32, height_mm: f32 },
    /// A raster could not be serialized for embedding. Fatal to this
    /// export only.
    #[error("failed to encode card raster: {0}")]
    Encoding(#[from] image::ImageError),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("placement references unknown raster {0}")]
    UnknownRaster(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ImposeError>;

/// Index of a card raster within the caller-supplied raster table.
pub type RasterId = usize;

/// Physical card dimensions in millimetres.
///
/// Also the grouping key for imposition: two entries share a page grid
/// only when both dimensions compare exactly equal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PhysicalSize {
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width_mm > 0.0 && self.height_mm > 0.0
    }
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get dimensions in portrait orientation (width < height for the
    /// standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }
}

/// Which physical side of the printed sheet a page lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetSide {
    /// Printed first in duplex.
    Front,
    /// Printed second; its cells are mirrored so each back lands behind
    /// its front once the sheet flips.
    Back,
}

/// Which paper edge the duplex printer flips the sheet around.
///
/// A physical printer convention, not a property of the layout: flipping
/// on the long edge of a portrait page mirrors left-right, so back
/// columns are mirrored; flipping on the short edge mirrors top-bottom,
/// so back rows are mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlipEdge {
    #[default]
    Long,
    Short,
}

/// One physical copy of a card in a print run. Copy counts are expanded
/// into repeated entries before layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPrintEntry {
    pub front: RasterId,
    /// Back raster shared by the deck; `None` leaves the back cell empty.
    pub back: Option<RasterId>,
    pub size: PhysicalSize,
}

/// A cell rectangle on a page, in millimetres from the page's top-left
/// corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Final placement of one card side on a page: the atomic unit handed to
/// the PDF writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlacement {
    pub raster: RasterId,
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// One output page with its ordered placements.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub side: SheetSide,
    pub placements: Vec<PagePlacement>,
    /// Cell outlines for cutting guides - one per occupied cell,
    /// including back cells whose entry has no back raster.
    pub guides: Vec<CellRect>,
}

/// Statistics about a full print run
#[derive(Debug, Clone, PartialEq)]
pub struct ImpositionStatistics {
    /// Cards in the run, after copy-count expansion
    pub cards: usize,
    /// Physical sheets of paper
    pub sheets: usize,
    /// Output pages (front and back of each sheet)
    pub pages: usize,
    /// Size groups that produce pages
    pub groups: usize,
    /// Cards skipped because their size group cannot fit the page
    pub ungroupable_cards: usize,
}
