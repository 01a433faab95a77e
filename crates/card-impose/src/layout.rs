//! Grid layout calculation and duplex mirroring.
//!
//! Coordinates are millimetres measured from the page's top-left corner;
//! the renderer converts to PDF bottom-up space when emitting pages.

use log::debug;

use crate::options::ImpositionOptions;
use crate::types::*;

/// Grid of card cells on one page, computed once per size group and
/// reused for every page of that group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGrid {
    pub columns: usize,
    pub rows: usize,
    pub cell_width_mm: f32,
    pub cell_height_mm: f32,
    /// Top-left corner of the grid. Leftover space inside the margins is
    /// split evenly on both sides so the grid sits centered.
    pub origin_x_mm: f32,
    pub origin_y_mm: f32,
}

impl PageGrid {
    /// Compute the grid for one card size, or `None` when not even a
    /// single card fits the usable area.
    pub fn compute(
        size: PhysicalSize,
        page_width_mm: f32,
        page_height_mm: f32,
        margin_mm: f32,
    ) -> Option<Self> {
        if !size.is_valid() {
            return None;
        }
        let usable_w = page_width_mm - 2.0 * margin_mm;
        let usable_h = page_height_mm - 2.0 * margin_mm;

        let columns = (usable_w / size.width_mm).max(0.0).floor() as usize;
        let rows = (usable_h / size.height_mm).max(0.0).floor() as usize;
        if columns == 0 || rows == 0 {
            return None;
        }

        let origin_x_mm = margin_mm + (usable_w - columns as f32 * size.width_mm) / 2.0;
        let origin_y_mm = margin_mm + (usable_h - rows as f32 * size.height_mm) / 2.0;

        Some(Self {
            columns,
            rows,
            cell_width_mm: size.width_mm,
            cell_height_mm: size.height_mm,
            origin_x_mm,
            origin_y_mm,
        })
    }

    pub fn items_per_page(&self) -> usize {
        self.columns * self.rows
    }

    /// Top-left corner of the cell at (row, col).
    fn cell_origin(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.origin_x_mm + col as f32 * self.cell_width_mm,
            self.origin_y_mm + row as f32 * self.cell_height_mm,
        )
    }

    fn cell_rect(&self, row: usize, col: usize) -> CellRect {
        let (x_mm, y_mm) = self.cell_origin(row, col);
        CellRect {
            x_mm,
            y_mm,
            width_mm: self.cell_width_mm,
            height_mm: self.cell_height_mm,
        }
    }

    /// Cell of entry `i` on the front page.
    fn front_cell(&self, i: usize) -> (usize, usize) {
        ((i / self.columns) % self.rows, i % self.columns)
    }

    /// Cell of entry `i` on the back page: the front cell mirrored around
    /// the configured flip edge so the back lands behind its front.
    fn back_cell(&self, i: usize, flip: FlipEdge) -> (usize, usize) {
        let (row, col) = self.front_cell(i);
        match flip {
            FlipEdge::Long => (row, self.columns - 1 - col),
            FlipEdge::Short => (self.rows - 1 - row, col),
        }
    }
}

/// Lay out one size group as an alternating Front/Back page sequence.
///
/// All entries must share one physical size; the engine takes the first
/// entry's size for the whole group and does not re-validate the grouping
/// (see [`group_by_size`]). Entries without a back raster leave their
/// back cell empty rather than defaulting to any image.
///
/// Returns [`ImposeError::UngroupableLayout`] when the card size cannot
/// fit the usable page area at all, so callers can warn instead of
/// silently losing cards.
pub fn layout(entries: &[CardPrintEntry], options: &ImpositionOptions) -> Result<Vec<Page>> {
    options.validate()?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let size = entries[0].size;
    if !size.is_valid() {
        return Err(ImposeError::Config(format!(
            "card size must be positive, got {}x{} mm",
            size.width_mm, size.height_mm
        )));
    }

    let (page_w, page_h) = options.paper_size.dimensions_mm();
    let grid = PageGrid::compute(size, page_w, page_h, options.margin_mm).ok_or(
        ImposeError::UngroupableLayout {
            width_mm: size.width_mm,
            height_mm: size.height_mm,
        },
    )?;
    debug!(
        "{}x{} grid for {}x{} mm cards, {} per page",
        grid.columns,
        grid.rows,
        size.width_mm,
        size.height_mm,
        grid.items_per_page()
    );

    let mut pages = Vec::new();
    for batch in entries.chunks(grid.items_per_page()) {
        let mut front = Page {
            side: SheetSide::Front,
            placements: Vec::new(),
            guides: Vec::new(),
        };
        let mut back = Page {
            side: SheetSide::Back,
            placements: Vec::new(),
            guides: Vec::new(),
        };

        for (i, entry) in batch.iter().enumerate() {
            let (row, col) = grid.front_cell(i);
            let (x_mm, y_mm) = grid.cell_origin(row, col);
            front.placements.push(PagePlacement {
                raster: entry.front,
                x_mm,
                y_mm,
                width_mm: size.width_mm,
                height_mm: size.height_mm,
            });
            front.guides.push(grid.cell_rect(row, col));

            let (back_row, back_col) = grid.back_cell(i, options.flip_edge);
            let (back_x_mm, back_y_mm) = grid.cell_origin(back_row, back_col);
            if let Some(raster) = entry.back {
                back.placements.push(PagePlacement {
                    raster,
                    x_mm: back_x_mm,
                    y_mm: back_y_mm,
                    width_mm: size.width_mm,
                    height_mm: size.height_mm,
                });
            }
            back.guides.push(grid.cell_rect(back_row, back_col));
        }

        pages.push(front);
        pages.push(back);
    }

    Ok(pages)
}

/// Partition a print run into size groups, comparing both dimensions
/// exactly and preserving first-seen order.
pub fn group_by_size(entries: Vec<CardPrintEntry>) -> Vec<Vec<CardPrintEntry>> {
    let mut groups: Vec<Vec<CardPrintEntry>> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|group| group[0].size == entry.size) {
            Some(group) => group.push(entry),
            None => groups.push(vec![entry]),
        }
    }
    groups
}
