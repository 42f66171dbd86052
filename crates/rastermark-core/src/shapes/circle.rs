//! Circle shape.

use super::{BlendMode, ShapeId};
use crate::coords::{PagePoint, ViewContext, scale_ratio};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A filled circle: origin point plus a radius in relative units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    /// Center in page-relative coordinates.
    pub origin: PagePoint,
    /// Radius in relative units (scaled by the zoom level when rasterized).
    pub radius: f64,
    pub blend: BlendMode,
}

impl Circle {
    pub fn new(origin: PagePoint, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            radius,
            blend: BlendMode::Add,
        }
    }

    pub fn with_blend(origin: PagePoint, radius: f64, blend: BlendMode) -> Self {
        Self {
            blend,
            ..Self::new(origin, radius)
        }
    }

    pub(crate) fn for_each_pixel(
        &self,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
        emit: &mut dyn FnMut(i64, i64),
    ) {
        if self.origin.page != page {
            return;
        }
        let center = self.origin.to_absolute_padded(zoom, ctx);
        fill_disc(center, self.radius * scale_ratio(zoom), emit);
    }
}

/// Emit every device pixel (x, y) with `x² + y² ≤ r²` relative to `center`.
pub(crate) fn fill_disc(center: Point, radius: f64, emit: &mut dyn FnMut(i64, i64)) {
    if radius <= 0.0 {
        return;
    }
    let r_sq = radius * radius;
    let x0 = (center.x - radius).floor() as i64;
    let x1 = (center.x + radius).ceil() as i64;
    let y0 = (center.y - radius).floor() as i64;
    let y1 = (center.y + radius).ceil() as i64;
    for y in y0..=y1 {
        let dy = y as f64 - center.y;
        for x in x0..=x1 {
            let dx = x as f64 - center.x;
            if dx * dx + dy * dy <= r_sq {
                emit(x, y);
            }
        }
    }
}
