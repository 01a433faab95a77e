use imageproc::geometry::convex_hull;
use imageproc::point::Point;

/// Four corner points in canonical order: top-left, top-right,
/// bottom-right, bottom-left. The order is fixed regardless of the order
/// the points were discovered in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral {
    pub top_left: (f32, f32),
    pub top_right: (f32, f32),
    pub bottom_right: (f32, f32),
    pub bottom_left: (f32, f32),
}

impl Quadrilateral {
    /// Recover the canonical corners from a traced boundary.
    ///
    /// Over all boundary points: top-left minimizes the coordinate sum,
    /// bottom-right maximizes it; top-right minimizes y - x, bottom-left
    /// maximizes it. Exact for axis-aligned and mildly rotated rectangles;
    /// see [`crate::CornerPolicy`] for the limits of this selection.
    ///
    /// Returns `None` when fewer than four distinct points are available.
    pub fn from_boundary(points: &[Point<i32>]) -> Option<Self> {
        if points.len() < 4 {
            return None;
        }
        let mut distinct: Vec<(i32, i32)> = points.iter().map(|p| (p.x, p.y)).collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < 4 {
            return None;
        }

        let mut top_left = points[0];
        let mut bottom_right = points[0];
        let mut top_right = points[0];
        let mut bottom_left = points[0];
        for p in points {
            if p.x + p.y < top_left.x + top_left.y {
                top_left = *p;
            }
            if p.x + p.y > bottom_right.x + bottom_right.y {
                bottom_right = *p;
            }
            if p.y - p.x < top_right.y - top_right.x {
                top_right = *p;
            }
            if p.y - p.x > bottom_left.y - bottom_left.x {
                bottom_left = *p;
            }
        }

        Some(Self {
            top_left: (top_left.x as f32, top_left.y as f32),
            top_right: (top_right.x as f32, top_right.y as f32),
            bottom_right: (bottom_right.x as f32, bottom_right.y as f32),
            bottom_left: (bottom_left.x as f32, bottom_left.y as f32),
        })
    }

    /// Corners as an array in canonical order, usable as warp control
    /// points.
    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// Reduce a boundary to its convex hull.
pub(crate) fn hull_boundary(points: &[Point<i32>]) -> Vec<Point<i32>> {
    convex_hull(points.to_vec())
}

/// Area enclosed by a closed boundary, by the shoelace formula.
pub(crate) fn boundary_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        area += a.x as f64 * b.y as f64;
        area -= b.x as f64 * a.y as f64;
    }
    area.abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Point<i32> {
        Point::new(x, y)
    }

    #[test]
    fn corners_canonicalize_regardless_of_traversal_order() {
        let corners = [p(10, 5), p(90, 8), p(93, 70), p(8, 67)];
        let expected = Quadrilateral {
            top_left: (10.0, 5.0),
            top_right: (90.0, 8.0),
            bottom_right: (93.0, 70.0),
            bottom_left: (8.0, 67.0),
        };

        // Every traversal order of the same boundary yields the same quad.
        let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [2, 3, 0, 1], [3, 2, 1, 0], [1, 3, 0, 2]];
        for order in orders {
            let points: Vec<_> = order.iter().map(|&i| corners[i]).collect();
            assert_eq!(Quadrilateral::from_boundary(&points), Some(expected));
        }
    }

    #[test]
    fn axis_aligned_boundary_recovers_exact_corners() {
        // A dense rectangular boundary, not just the four vertices.
        let mut points = Vec::new();
        for x in 20..=120 {
            points.push(p(x, 30));
            points.push(p(x, 90));
        }
        for y in 30..=90 {
            points.push(p(20, y));
            points.push(p(120, y));
        }

        let quad = Quadrilateral::from_boundary(&points).unwrap();
        assert_eq!(quad.top_left, (20.0, 30.0));
        assert_eq!(quad.top_right, (120.0, 30.0));
        assert_eq!(quad.bottom_right, (120.0, 90.0));
        assert_eq!(quad.bottom_left, (20.0, 90.0));
    }

    #[test]
    fn too_few_distinct_points_is_degenerate() {
        assert!(Quadrilateral::from_boundary(&[p(1, 1), p(2, 2), p(3, 3)]).is_none());
        // Four entries but only two distinct points.
        assert!(Quadrilateral::from_boundary(&[p(1, 1), p(2, 2), p(1, 1), p(2, 2)]).is_none());
    }

    #[test]
    fn hull_discards_interior_points() {
        let points = vec![p(0, 0), p(100, 0), p(100, 50), p(0, 50), p(40, 20), p(60, 30)];
        let hull = hull_boundary(&points);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&p(40, 20)));
        assert!(!hull.contains(&p(60, 30)));
    }

    #[test]
    fn shoelace_area_of_rectangle() {
        let points = vec![p(0, 0), p(10, 0), p(10, 5), p(0, 5)];
        assert!((boundary_area(&points) - 50.0).abs() < 1e-9);
    }
}
