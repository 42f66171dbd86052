//! Freehand brush stroke.

use super::line::fill_capsule;
use super::{BlendMode, ShapeId};
use crate::coords::{PagePoint, ViewContext, scale_ratio};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand stroke: an ordered point chain rendered as thick segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Points in page-relative coordinates, in gesture order.
    pub points: Vec<PagePoint>,
    /// Brush diameter in relative units.
    pub brush_size: f64,
    pub blend: BlendMode,
}

impl Freehand {
    pub fn new(brush_size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: Vec::new(),
            brush_size,
            blend: BlendMode::Add,
        }
    }

    pub fn from_points(points: Vec<PagePoint>, brush_size: f64) -> Self {
        Self {
            points,
            ..Self::new(brush_size)
        }
    }

    /// Append a gesture point.
    pub fn add_point(&mut self, point: PagePoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop redundant points with Ramer-Douglas-Peucker simplification.
    /// Tolerance is in relative units.
    pub fn simplify(&mut self, tolerance: f64) {
        if self.points.len() < 3 {
            return;
        }
        self.points = rdp_simplify(&self.points, tolerance);
    }

    pub(crate) fn for_each_pixel(
        &self,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
        emit: &mut dyn FnMut(i64, i64),
    ) {
        if self.points.first().map(|p| p.page) != Some(page) {
            return;
        }
        let half = self.brush_size * scale_ratio(zoom) / 2.0;
        for pair in self.points.windows(2) {
            let a = pair[0].to_absolute_padded(zoom, ctx);
            let b = pair[1].to_absolute_padded(zoom, ctx);
            fill_capsule(a, b, half, emit);
        }
    }
}

fn rdp_simplify(points: &[PagePoint], tolerance: f64) -> Vec<PagePoint> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;
    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(point, &first, &last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = rdp_simplify(&points[..=max_index], tolerance);
        let right = rdp_simplify(&points[max_index..], tolerance);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

fn perpendicular_distance(point: &PagePoint, line_start: &PagePoint, line_end: &PagePoint) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        let px = point.x - line_start.x;
        let py = point.y - line_start.y;
        return (px * px + py * py).sqrt();
    }
    let area2 = ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs();
    area2 / len_sq.sqrt()
}
