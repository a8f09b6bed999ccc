//! Pure geometric helpers shared by layout, hit testing, and gestures.

use kurbo::{Point, Rect};

/// Round each coordinate to the nearest multiple of `grid`.
pub fn snap_to_grid(p: Point, grid: f64) -> Point {
    if grid <= 0.0 {
        return p;
    }
    Point::new((p.x / grid).round() * grid, (p.y / grid).round() * grid)
}

/// Whether `p` lies strictly closer than `spacing` to any of `others`.
pub fn too_close<'a>(p: Point, others: impl IntoIterator<Item = &'a Point>, spacing: f64) -> bool {
    others.into_iter().any(|o| p.distance(*o) < spacing)
}

/// Rectangle spanning two arbitrary corners.
pub fn normalize_rect(a: Point, b: Point) -> Rect {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

/// Strict axis-aligned overlap. Touching edges do not count.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && a.x1 > b.x0 && a.y0 < b.y1 && a.y1 > b.y0
}

/// Smallest rectangle containing every input, or `None` for an empty input.
pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn snap_rounds_half_up() {
        assert_eq!(snap_to_grid(Point::new(150.0, 89.0), 20.0), Point::new(160.0, 80.0));
        assert_eq!(snap_to_grid(Point::new(-31.0, -9.0), 20.0), Point::new(-40.0, -0.0));
    }

    #[test]
    fn normalize_handles_reversed_corners() {
        let r = normalize_rect(Point::new(300.0, 10.0), Point::new(100.0, 200.0));
        assert_eq!(r, Rect::new(100.0, 10.0, 300.0, 200.0));
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(!overlaps(a, Rect::new(100.0, 0.0, 200.0, 100.0)));
        assert!(overlaps(a, Rect::new(99.0, 99.0, 200.0, 200.0)));
    }

    #[test]
    fn too_close_is_strict() {
        let others = [Point::new(0.0, 0.0)];
        assert!(too_close(Point::new(49.9, 0.0), &others, 50.0));
        assert!(!too_close(Point::new(50.0, 0.0), &others, 50.0));
    }

    proptest! {
        #[test]
        fn snapped_points_lie_on_grid(x in -5000.0f64..5000.0, y in -5000.0f64..5000.0) {
            let p = snap_to_grid(Point::new(x, y), 20.0);
            prop_assert!((p.x / 20.0).fract().abs() < 1e-9);
            prop_assert!((p.y / 20.0).fract().abs() < 1e-9);
            prop_assert!((p.x - x).abs() <= 10.0);
            prop_assert!((p.y - y).abs() <= 10.0);
        }
    }
}
