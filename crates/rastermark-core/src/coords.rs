//! Coordinate frames and conversions.
//!
//! Annotations are stored in *relative* coordinates: page-local units that
//! do not change when the host viewer zooms. Rendering and pixel scanning
//! happen in *absolute* coordinates (device pixels at a given zoom level)
//! or *padded* coordinates (absolute, shifted by the host viewport's scroll
//! offset and centering padding). All conversions are pure functions over a
//! host-supplied viewport snapshot; nothing here reads global state.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Device pixels per relative unit at the given zoom level.
///
/// Fractional zoom levels interpolate between integer tile resolutions.
pub fn scale_ratio(zoom: f64) -> f64 {
    2f64.powf(zoom)
}

/// On-screen viewport dimensions and scroll position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportMetrics {
    pub width: f64,
    pub height: f64,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

/// Layout dimensions of the page as the host currently displays it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub width: f64,
    pub height: f64,
}

/// Device offset of a page within the host's scrollable area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageOffset {
    pub left: f64,
    pub top: f64,
}

/// Snapshot of the host viewport for one page.
///
/// Taken once per operation and passed by parameter, so conversions stay
/// consistent even if the live viewer scrolls mid-operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewContext {
    pub viewport: ViewportMetrics,
    pub layout: PageLayout,
    pub offset: PageOffset,
}

impl ViewContext {
    /// Horizontal centering padding: pages narrower than the viewport are
    /// centered by the host.
    pub fn padding_x(&self) -> f64 {
        ((self.viewport.width - self.layout.width) / 2.0).max(0.0)
    }

    /// Vertical centering padding.
    pub fn padding_y(&self) -> f64 {
        ((self.viewport.height - self.layout.height) / 2.0).max(0.0)
    }

    /// Total shift between the absolute and padded frames.
    pub fn pad_shift(&self) -> Vec2 {
        Vec2::new(
            self.offset.left - self.viewport.scroll_left + self.padding_x(),
            self.offset.top - self.viewport.scroll_top + self.padding_y(),
        )
    }
}

/// A position in page-local, zoom-independent units, tagged with the page
/// it belongs to.
///
/// Immutable: frame conversions build new values rather than mutating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagePoint {
    pub x: f64,
    pub y: f64,
    pub page: usize,
}

impl PagePoint {
    pub fn new(x: f64, y: f64, page: usize) -> Self {
        Self { x, y, page }
    }

    /// Relative coordinate scaled to device pixels at `zoom`.
    pub fn to_absolute(&self, zoom: f64) -> Point {
        let scale = scale_ratio(zoom);
        Point::new(self.x * scale, self.y * scale)
    }

    /// Absolute coordinate shifted into the padded (viewport-centered) frame.
    pub fn to_absolute_padded(&self, zoom: f64, ctx: &ViewContext) -> Point {
        self.to_absolute(zoom) + ctx.pad_shift()
    }

    /// Inverse of [`PagePoint::to_absolute`].
    pub fn from_absolute(page: usize, zoom: f64, absolute: Point) -> Self {
        let scale = scale_ratio(zoom);
        Self::new(absolute.x / scale, absolute.y / scale, page)
    }

    /// Inverse of [`PagePoint::to_absolute_padded`].
    pub fn from_padded(page: usize, zoom: f64, ctx: &ViewContext, padded: Point) -> Self {
        Self::from_absolute(page, zoom, padded - ctx.pad_shift())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ctx() -> ViewContext {
        ViewContext {
            viewport: ViewportMetrics {
                width: 1280.0,
                height: 800.0,
                scroll_left: 35.0,
                scroll_top: 410.0,
            },
            layout: PageLayout {
                width: 900.0,
                height: 1200.0,
            },
            offset: PageOffset {
                left: 12.0,
                top: 2400.0,
            },
        }
    }

    #[test]
    fn test_scale_ratio() {
        assert!((scale_ratio(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((scale_ratio(1.0) - 2.0).abs() < f64::EPSILON);
        assert!((scale_ratio(3.0) - 8.0).abs() < f64::EPSILON);
        // Fractional zoom interpolates between integer resolutions.
        assert!((scale_ratio(0.5) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_to_absolute_scales_by_zoom() {
        let p = PagePoint::new(23.0, 42.0, 0);
        let abs = p.to_absolute(1.0);
        assert!((abs.x - 46.0).abs() < f64::EPSILON);
        assert!((abs.y - 84.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_padding_clamps_at_zero() {
        // Page wider than the viewport: no horizontal centering.
        let ctx = sample_ctx();
        assert!((ctx.padding_x() - 190.0).abs() < f64::EPSILON);
        assert!((ctx.padding_y() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_padded_round_trip() {
        let ctx = sample_ctx();
        for &zoom in &[0.0, 0.5, 1.0, 2.25, 4.0] {
            for &(x, y) in &[(0.0, 0.0), (23.0, 42.0), (899.5, 1199.5), (-3.0, 7.25)] {
                let p = PagePoint::new(x, y, 2);
                let padded = p.to_absolute_padded(zoom, &ctx);
                let back = PagePoint::from_padded(2, zoom, &ctx, padded);
                // Round trip must hold within one device pixel at this zoom.
                let tol = 1.0 / scale_ratio(zoom);
                assert!((back.x - p.x).abs() <= tol, "x drift at zoom {zoom}");
                assert!((back.y - p.y).abs() <= tol, "y drift at zoom {zoom}");
                assert_eq!(back.page, p.page);
            }
        }
    }

    #[test]
    fn test_absolute_round_trip() {
        let p = PagePoint::new(17.5, 91.25, 1);
        let back = PagePoint::from_absolute(1, 2.0, p.to_absolute(2.0));
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }
}
