//! Scan-line polygon fill.
//!
//! Used by thick line strokes (the quad between two offset endpoints) and
//! any other polygonal pixel enumeration. Coordinates are absolute-padded
//! device space; the caller converts emitted pixels back to page-relative
//! units and does its own bounds clipping.

use kurbo::Point;
use std::cmp::Ordering;

/// Fill the polygon bounded by `edges` over scan lines `[y_min, y_max)`.
///
/// Classic even-odd rule: per scan line, x-intercepts of every edge whose
/// vertical span contains the line are sorted and filled pairwise. Edge
/// spans are half-open (upper endpoint exclusive) so a vertex shared by two
/// edges is counted once; horizontal edges never intersect a scan line. An
/// odd trailing intersection (a tangent) is left unmatched and produces no
/// fill. Degenerate scan lines with no intersections are skipped.
pub fn scan_fill<F>(edges: &[(Point, Point)], y_min: i64, y_max: i64, mut emit: F)
where
    F: FnMut(i64, i64),
{
    let mut intercepts: Vec<f64> = Vec::with_capacity(edges.len());
    for y in y_min..y_max {
        intercepts.clear();
        let scan = y as f64;
        for &(a, b) in edges {
            let (top, bottom) = if a.y <= b.y { (a, b) } else { (b, a) };
            if scan >= top.y && scan < bottom.y {
                let t = (scan - top.y) / (bottom.y - top.y);
                intercepts.push(top.x + t * (bottom.x - top.x));
            }
        }
        intercepts.sort_by(|p, q| p.partial_cmp(q).unwrap_or(Ordering::Equal));
        for pair in intercepts.chunks_exact(2) {
            let start = pair[0].ceil() as i64;
            let end = pair[1].ceil() as i64;
            for x in start..end {
                emit(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn quad_edges(corners: [(f64, f64); 4]) -> Vec<(Point, Point)> {
        (0..4)
            .map(|i| {
                let (ax, ay) = corners[i];
                let (bx, by) = corners[(i + 1) % 4];
                (Point::new(ax, ay), Point::new(bx, by))
            })
            .collect()
    }

    fn collect(edges: &[(Point, Point)], y_min: i64, y_max: i64) -> HashSet<(i64, i64)> {
        let mut pixels = HashSet::new();
        scan_fill(edges, y_min, y_max, |x, y| {
            pixels.insert((x, y));
        });
        pixels
    }

    #[test]
    fn test_unit_square_fills_interior_exactly() {
        let edges = quad_edges([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let pixels = collect(&edges, 0, 10);
        assert_eq!(pixels.len(), 100);
        for y in 0..10 {
            for x in 0..10 {
                assert!(pixels.contains(&(x, y)), "missing ({x}, {y})");
            }
        }
        assert!(!pixels.contains(&(10, 5)));
        assert!(!pixels.contains(&(5, 10)));
        assert!(!pixels.contains(&(-1, 0)));
    }

    #[test]
    fn test_shared_vertex_counted_once() {
        // A triangle: the apex is shared by two edges but the half-open rule
        // keeps the intercept count even on every interior scan line.
        let edges = vec![
            (Point::new(5.0, 0.0), Point::new(10.0, 10.0)),
            (Point::new(10.0, 10.0), Point::new(0.0, 10.0)),
            (Point::new(0.0, 10.0), Point::new(5.0, 0.0)),
        ];
        let pixels = collect(&edges, 0, 10);
        assert!(pixels.contains(&(5, 5)));
        assert!(!pixels.contains(&(0, 0)));
        assert!(!pixels.contains(&(9, 0)));
    }

    #[test]
    fn test_no_intersections_emits_nothing() {
        let edges = quad_edges([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(collect(&edges, 20, 30).is_empty());
        assert!(collect(&[], 0, 10).is_empty());
    }

    #[test]
    fn test_odd_trailing_intersection_ignored() {
        // A lone edge yields one unmatched intercept per line; no fill may
        // escape it.
        let edges = vec![(Point::new(3.0, 0.0), Point::new(3.0, 6.0))];
        assert!(collect(&edges, 0, 6).is_empty());
    }

    #[test]
    fn test_horizontal_edges_skipped() {
        let edges = vec![(Point::new(0.0, 4.0), Point::new(10.0, 4.0))];
        assert!(collect(&edges, 0, 10).is_empty());
    }
}
