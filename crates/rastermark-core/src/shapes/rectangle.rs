//! Rectangle shape.

use super::{BlendMode, ShapeId};
use crate::coords::{PagePoint, ViewContext};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned rectangle with signed extent.
///
/// Width and height keep the sign of the drag that created them; bounds are
/// normalized when rasterized, so drag direction never matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Drag origin in page-relative coordinates.
    pub origin: PagePoint,
    /// Signed width in relative units.
    pub width: f64,
    /// Signed height in relative units.
    pub height: f64,
    pub blend: BlendMode,
}

impl Rectangle {
    pub fn new(origin: PagePoint, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            width,
            height,
            blend: BlendMode::Add,
        }
    }

    pub fn with_blend(origin: PagePoint, width: f64, height: f64, blend: BlendMode) -> Self {
        Self {
            blend,
            ..Self::new(origin, width, height)
        }
    }

    /// Normalized bounds in relative units (x0 ≤ x1, y0 ≤ y1).
    pub fn bounds(&self) -> kurbo::Rect {
        kurbo::Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
        .abs()
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
        let bounds = self.bounds();
        let top_left =
            PagePoint::new(bounds.x0, bounds.y0, self.origin.page).to_absolute_padded(zoom, ctx);
        let bottom_right =
            PagePoint::new(bounds.x1, bounds.y1, self.origin.page).to_absolute_padded(zoom, ctx);
        let x0 = top_left.x.ceil() as i64;
        let x1 = bottom_right.x.ceil() as i64;
        let y0 = top_left.y.ceil() as i64;
        let y1 = bottom_right.y.ceil() as i64;
        for y in y0..y1 {
            for x in x0..x1 {
                emit(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pixels_of(rect: &Rectangle, zoom: f64) -> HashSet<(i64, i64)> {
        let mut pixels = HashSet::new();
        rect.for_each_pixel(0, zoom, &ViewContext::default(), &mut |x, y| {
            pixels.insert((x, y));
        });
        pixels
    }

    #[test]
    fn test_fill_extent() {
        let rect = Rectangle::new(PagePoint::new(2.0, 3.0, 0), 4.0, 2.0);
        let pixels = pixels_of(&rect, 0.0);
        assert_eq!(pixels.len(), 8);
        assert!(pixels.contains(&(2, 3)));
        assert!(pixels.contains(&(5, 4)));
        assert!(!pixels.contains(&(6, 3)));
        assert!(!pixels.contains(&(2, 5)));
    }

    #[test]
    fn test_negative_extent_normalizes() {
        // Dragged up-left from (6, 5): same pixels as the forward drag.
        let backward = Rectangle::new(PagePoint::new(6.0, 5.0, 0), -4.0, -2.0);
        let forward = Rectangle::new(PagePoint::new(2.0, 3.0, 0), 4.0, 2.0);
        assert_eq!(pixels_of(&backward, 0.0), pixels_of(&forward, 0.0));
    }

    #[test]
    fn test_zoom_scales_extent() {
        let rect = Rectangle::new(PagePoint::new(1.0, 1.0, 0), 2.0, 1.0);
        let pixels = pixels_of(&rect, 1.0);
        // 4x2 device pixels starting at (2, 2).
        assert_eq!(pixels.len(), 8);
        assert!(pixels.contains(&(2, 2)));
        assert!(pixels.contains(&(5, 3)));
    }

    #[test]
    fn test_zero_area_emits_nothing() {
        let rect = Rectangle::new(PagePoint::new(5.0, 5.0, 0), 0.0, 10.0);
        assert!(pixels_of(&rect, 0.0).is_empty());
    }
}
