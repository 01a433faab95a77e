use card_extract::{CornerPolicy, ExtractError, ExtractOptions, extract, extract_batch};
use image::{Rgb, RgbImage};

fn photo_with_bright_rect(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> RgbImage {
    let mut photo = RgbImage::from_pixel(w, h, Rgb([10, 10, 12]));
    for y in y0..y1 {
        for x in x0..x1 {
            photo.put_pixel(x, y, Rgb([235, 235, 230]));
        }
    }
    photo
}

#[test]
fn dark_photo_yields_no_contour() {
    let photo = RgbImage::from_pixel(320, 240, Rgb([8, 8, 8]));
    let options = ExtractOptions::new(63.0, 88.0);
    match extract(&photo, &options) {
        Err(ExtractError::NoContourFound(threshold)) => assert_eq!(threshold, 45),
        other => panic!("expected NoContourFound, got {:?}", other.map(|c| c.summary())),
    }
}

#[test]
fn axis_aligned_card_is_rectified_to_exact_scale() {
    let photo = photo_with_bright_rect(300, 400, 50, 40, 250, 360);
    let options = ExtractOptions::new(63.0, 88.0);
    let card = extract(&photo, &options).unwrap();

    assert_eq!(card.image.dimensions(), (630, 880));
    assert_eq!(card.summary(), "card rectified to 630x880 px");

    // The recovered corners hug the drawn rectangle (the blur may move the
    // binarized edge by a pixel or two).
    let (tlx, tly) = card.source_quad.top_left;
    assert!((tlx - 50.0).abs() <= 3.0 && (tly - 40.0).abs() <= 3.0);
    let (brx, bry) = card.source_quad.bottom_right;
    assert!((brx - 249.0).abs() <= 3.0 && (bry - 359.0).abs() <= 3.0);

    // Card material in the center, fully opaque.
    let center = card.image.get_pixel(315, 440);
    assert!(center[0] > 200);
    assert_eq!(center[3], 255);

    // The extreme corners fall outside the 3 mm (30 px) rounding.
    assert_eq!(card.image.get_pixel(0, 0)[3], 0);
    assert_eq!(card.image.get_pixel(629, 0)[3], 0);
    assert_eq!(card.image.get_pixel(0, 879)[3], 0);
    assert_eq!(card.image.get_pixel(629, 879)[3], 0);

    // Mid-edges are unaffected by the corner rounding.
    assert_eq!(card.image.get_pixel(315, 0)[3], 255);
    assert_eq!(card.image.get_pixel(0, 440)[3], 255);
}

#[test]
fn resolution_scales_both_dimensions_proportionally() {
    let photo = photo_with_bright_rect(300, 400, 50, 40, 250, 360);

    let mut options = ExtractOptions::new(63.0, 88.0);
    options.pixels_per_mm = 5.0;
    let card = extract(&photo, &options).unwrap();
    assert_eq!(card.image.dimensions(), (315, 440));

    options.pixels_per_mm = 20.0;
    let card = extract(&photo, &options).unwrap();
    assert_eq!(card.image.dimensions(), (1260, 1760));
}

#[test]
fn convex_hull_policy_handles_a_clean_rectangle() {
    let photo = photo_with_bright_rect(300, 400, 50, 40, 250, 360);
    let mut options = ExtractOptions::new(63.0, 88.0);
    options.corner_policy = CornerPolicy::ConvexHull;

    let card = extract(&photo, &options).unwrap();
    assert_eq!(card.image.dimensions(), (630, 880));
    let (tlx, tly) = card.source_quad.top_left;
    assert!((tlx - 50.0).abs() <= 3.0 && (tly - 40.0).abs() <= 3.0);
}

#[test]
fn extraction_is_deterministic() {
    let photo = photo_with_bright_rect(300, 400, 50, 40, 250, 360);
    let options = ExtractOptions::new(63.0, 88.0);

    let first = extract(&photo, &options).unwrap();
    let second = extract(&photo, &options).unwrap();
    assert_eq!(first.source_quad, second.source_quad);
    assert_eq!(first.image.as_raw(), second.image.as_raw());
}

#[tokio::test]
async fn batch_isolates_failures_and_preserves_order() {
    let good = photo_with_bright_rect(300, 400, 50, 40, 250, 360);
    let dark = RgbImage::from_pixel(300, 400, Rgb([5, 5, 5]));
    let options = ExtractOptions::new(63.0, 88.0);

    let results = extract_batch(vec![dark.clone(), good, dark], &options).await;
    assert_eq!(results.len(), 3);
    assert!(matches!(results[0], Err(ExtractError::NoContourFound(_))));
    assert!(results[1].is_ok());
    assert!(matches!(results[2], Err(ExtractError::NoContourFound(_))));
}
