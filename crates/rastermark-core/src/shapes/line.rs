//! Thick line stroke.

use super::circle::fill_disc;
use super::{BlendMode, ShapeId};
use crate::coords::{PagePoint, ViewContext, scale_ratio};
use crate::scanfill::scan_fill;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use uuid::Uuid;

/// A straight stroke of non-zero width with round caps.
///
/// Rasterized as a capsule: a quadrilateral formed by offsetting both
/// endpoints perpendicular to the segment by half the stroke width, plus a
/// disc at each endpoint. Angle and offsets are both computed in
/// absolute-padded space so viewport centering cannot skew the stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    pub start: PagePoint,
    pub end: PagePoint,
    /// Stroke width in relative units.
    pub stroke_width: f64,
    pub blend: BlendMode,
}

impl Line {
    pub fn new(start: PagePoint, end: PagePoint, stroke_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            stroke_width,
            blend: BlendMode::Add,
        }
    }

    pub fn with_blend(
        start: PagePoint,
        end: PagePoint,
        stroke_width: f64,
        blend: BlendMode,
    ) -> Self {
        Self {
            blend,
            ..Self::new(start, end, stroke_width)
        }
    }

    /// Length in relative units.
    pub fn length(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub(crate) fn for_each_pixel(
        &self,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
        emit: &mut dyn FnMut(i64, i64),
    ) {
        if self.start.page != page {
            return;
        }
        let a = self.start.to_absolute_padded(zoom, ctx);
        let b = self.end.to_absolute_padded(zoom, ctx);
        let half = self.stroke_width * scale_ratio(zoom) / 2.0;
        fill_capsule(a, b, half, emit);
    }
}

/// Emit every pixel of the capsule of half-width `half` around segment a-b,
/// in device coordinates. Coincident endpoints draw nothing.
pub(crate) fn fill_capsule(a: Point, b: Point, half: f64, emit: &mut dyn FnMut(i64, i64)) {
    if half <= 0.0 || (b - a).hypot() < f64::EPSILON {
        return;
    }
    let angle = (b.y - a.y).atan2(b.x - a.x);
    let normal = Vec2::new((angle + FRAC_PI_2).cos(), (angle + FRAC_PI_2).sin()) * half;
    let corners = [a + normal, b + normal, b - normal, a - normal];
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    let y_min = corners
        .iter()
        .map(|p| p.y)
        .fold(f64::INFINITY, f64::min)
        .floor() as i64;
    let y_max = corners
        .iter()
        .map(|p| p.y)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil() as i64;
    scan_fill(&edges, y_min, y_max, |x, y| emit(x, y));
    // Round caps.
    fill_disc(a, half, emit);
    fill_disc(b, half, emit);
}
