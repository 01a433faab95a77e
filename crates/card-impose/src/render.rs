//! PDF page emission via printpdf.
//!
//! The layout engine hands over physical placements only; everything PDF
//! (XObjects, content streams, media boxes) stays in here.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use ::image::RgbaImage;
use log::debug;
use printpdf::*;

use crate::options::ImpositionOptions;
use crate::types::*;

/// Render a laid-out page sequence into PDF bytes.
///
/// Each referenced raster is embedded once and reused by every placement.
/// Rasters travel as PNG so the rounded-corner alpha survives into the
/// document; a placement reproduces its raster at the requested physical
/// width and height with no implicit rescaling.
pub fn render_pdf_bytes(
    pages: &[Page],
    rasters: &[RgbaImage],
    options: &ImpositionOptions,
) -> Result<Vec<u8>> {
    options.validate()?;

    let mut doc = PdfDocument::new("Card sheets");
    let (page_w_mm, page_h_mm) = options.paper_size.dimensions_mm();

    let mut xobjects: HashMap<RasterId, XObjectId> = HashMap::new();
    for page in pages {
        for placement in &page.placements {
            if xobjects.contains_key(&placement.raster) {
                continue;
            }
            let raster = rasters
                .get(placement.raster)
                .ok_or(ImposeError::UnknownRaster(placement.raster))?;
            let image = encode_raster(raster)?;
            xobjects.insert(placement.raster, doc.add_image(&image));
        }
    }

    for page in pages {
        let mut ops = Vec::new();
        for placement in &page.placements {
            let raster = &rasters[placement.raster];
            ops.push(place_op(
                xobjects[&placement.raster].clone(),
                raster,
                placement,
                page_h_mm,
            ));
        }
        if options.cut_guides {
            push_guide_ops(&mut ops, &page.guides, page_h_mm);
        }
        doc.pages
            .push(PdfPage::new(Mm(page_w_mm), Mm(page_h_mm), ops));
    }

    let mut warnings = Vec::new();
    let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
    debug!("rendered {} pages, {} bytes", pages.len(), bytes.len());
    Ok(bytes)
}

/// Render a laid-out page sequence and write the PDF out.
pub async fn generate_pdf(
    pages: Vec<Page>,
    rasters: Vec<RgbaImage>,
    options: &ImpositionOptions,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    let options = options.clone();
    let output_path = output_path.as_ref().to_owned();

    let bytes =
        tokio::task::spawn_blocking(move || render_pdf_bytes(&pages, &rasters, &options)).await??;

    tokio::fs::write(&output_path, bytes).await?;

    Ok(())
}

fn encode_raster(raster: &RgbaImage) -> Result<RawImage> {
    let mut buffer = Cursor::new(Vec::new());
    ::image::DynamicImage::ImageRgba8(raster.clone())
        .write_to(&mut buffer, ::image::ImageFormat::Png)?;

    let mut warnings = Vec::new();
    RawImage::decode_from_bytes(buffer.get_ref(), &mut warnings)
        .map_err(|e| ImposeError::Pdf(format!("failed to embed card raster: {}", e)))
}

/// Place one raster at its physical position and size. Layout coordinates
/// run top-down; PDF space runs bottom-up.
fn place_op(id: XObjectId, raster: &RgbaImage, placement: &PagePlacement, page_h_mm: f32) -> Op {
    let y_mm = page_h_mm - placement.y_mm - placement.height_mm;

    // At 72 dpi one image pixel maps to one point, so the scale factors
    // are exactly target-points over pixels.
    let scale_x = Mm(placement.width_mm).into_pt().0 / raster.width() as f32;
    let scale_y = Mm(placement.height_mm).into_pt().0 / raster.height() as f32;

    Op::UseXobject {
        id,
        transform: XObjectTransform {
            translate_x: Some(Mm(placement.x_mm).into_pt()),
            translate_y: Some(Mm(y_mm).into_pt()),
            rotate: None,
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            dpi: Some(72.0),
        },
    }
}

fn push_guide_ops(ops: &mut Vec<Op>, guides: &[CellRect], page_h_mm: f32) {
    if guides.is_empty() {
        return;
    }

    ops.push(Op::SetOutlineColor {
        col: Color::Rgb(Rgb {
            r: 0.78,
            g: 0.78,
            b: 0.78,
            icc_profile: None,
        }),
    });
    ops.push(Op::SetOutlineThickness {
        pt: Mm(0.2).into_pt(),
    });

    for guide in guides {
        let y_mm = page_h_mm - guide.y_mm - guide.height_mm;
        let corners = [
            (guide.x_mm, y_mm),
            (guide.x_mm + guide.width_mm, y_mm),
            (guide.x_mm + guide.width_mm, y_mm + guide.height_mm),
            (guide.x_mm, y_mm + guide.height_mm),
        ];
        ops.push(Op::DrawLine {
            line: Line {
                points: corners
                    .iter()
                    .map(|&(x, y)| LinePoint {
                        p: Point::new(Mm(x), Mm(y)),
                        bezier: false,
                    })
                    .collect(),
                is_closed: true,
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;
    use ::image::Rgba;

    fn solid_raster(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([200, 40, 40, 255]))
    }

    #[test]
    fn renders_a_pdf_document() {
        let size = PhysicalSize::new(63.0, 88.0);
        let entries = vec![
            CardPrintEntry {
                front: 0,
                back: Some(1),
                size,
            };
            3
        ];
        let options = ImpositionOptions::default();
        let pages = layout(&entries, &options).unwrap();
        let rasters = vec![solid_raster(630, 880), solid_raster(630, 880)];

        let bytes = render_pdf_bytes(&pages, &rasters, &options).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!bytes.is_empty());
    }

    #[test]
    fn unknown_raster_is_an_error() {
        let size = PhysicalSize::new(63.0, 88.0);
        let entries = vec![CardPrintEntry {
            front: 5,
            back: None,
            size,
        }];
        let options = ImpositionOptions::default();
        let pages = layout(&entries, &options).unwrap();

        match render_pdf_bytes(&pages, &[], &options) {
            Err(ImposeError::UnknownRaster(5)) => {}
            other => panic!("expected UnknownRaster, got {:?}", other.map(|b| b.len())),
        }
    }
}
