//! Pasted pixel regions.

use super::{BlendMode, ShapeId};
use crate::colour::Colour;
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An owned pixel buffer anchored at a device coordinate.
///
/// Regions are value-semantic snapshots: they never alias a live layer
/// surface, so redrawing the source layer cannot invalidate them. Pixel
/// data is captured at a specific zoom level and re-applied at the same
/// device coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub page: usize,
    /// Device x of the region's top-left corner (absolute-padded frame).
    pub origin_x: i64,
    /// Device y of the region's top-left corner.
    pub origin_y: i64,
    pub pixels: Surface,
}

impl Region {
    pub fn new(page: usize, origin_x: i64, origin_y: i64, pixels: Surface) -> Self {
        Self {
            page,
            origin_x,
            origin_y,
            pixels,
        }
    }
}

/// Clipboard or import content committed to a layer.
///
/// The distinct action variant for pasted data: undo/redo re-inserts the
/// buffers themselves rather than re-running a vector rasterization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pasted {
    pub(crate) id: ShapeId,
    pub regions: Vec<Region>,
    pub blend: BlendMode,
}

impl Pasted {
    pub fn new(regions: Vec<Region>) -> Self {
        Self {
            id: Uuid::new_v4(),
            regions,
            blend: BlendMode::Add,
        }
    }

    /// Overwrite the RGB channels of every stored pixel with `colour`,
    /// preserving alpha. Pasting adopts the destination layer's colour.
    pub fn recolour(&mut self, colour: Colour) {
        for region in &mut self.regions {
            let mut recoloured = Surface::new(region.pixels.width(), region.pixels.height());
            region.pixels.for_each_set_pixel(&mut |x, y, c| {
                recoloured.put(
                    x as i64,
                    y as i64,
                    Colour::new(colour.r, colour.g, colour.b, c.a),
                );
            });
            region.pixels = recoloured;
        }
    }

    pub(crate) fn draw(&self, page: usize, surface: &mut Surface) {
        match self.blend {
            BlendMode::Subtract => {
                self.for_each_pixel(page, &mut |x, y| surface.clear_pixel(x, y));
            }
            BlendMode::Add | BlendMode::Select => {
                for region in &self.regions {
                    if region.page == page {
                        surface.blit(region.origin_x, region.origin_y, &region.pixels);
                    }
                }
            }
        }
    }

    pub(crate) fn for_each_pixel(&self, page: usize, emit: &mut dyn FnMut(i64, i64)) {
        for region in &self.regions {
            if region.page != page {
                continue;
            }
            region.pixels.for_each_set_pixel(&mut |x, y, _| {
                emit(region.origin_x + x as i64, region.origin_y + y as i64);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pixel_region() -> Region {
        let mut pixels = Surface::new(2, 2);
        pixels.put(0, 0, Colour::new(9, 9, 9, 200));
        pixels.put(1, 1, Colour::new(7, 7, 7, 100));
        Region::new(0, 4, 4, pixels)
    }

    #[test]
    fn test_draw_blits_at_origin() {
        let pasted = Pasted::new(vec![two_pixel_region()]);
        let mut surface = Surface::new(8, 8);
        pasted.draw(0, &mut surface);
        assert_eq!(surface.get(4, 4), Some(Colour::new(9, 9, 9, 200)));
        assert_eq!(surface.get(5, 5), Some(Colour::new(7, 7, 7, 100)));
        assert!(!surface.is_set(4, 5));
    }

    #[test]
    fn test_recolour_preserves_alpha() {
        let mut pasted = Pasted::new(vec![two_pixel_region()]);
        pasted.recolour(Colour::rgb(50, 60, 70));
        let region = &pasted.regions[0];
        assert_eq!(region.pixels.get(0, 0), Some(Colour::new(50, 60, 70, 200)));
        assert_eq!(region.pixels.get(1, 1), Some(Colour::new(50, 60, 70, 100)));
        assert!(!region.pixels.is_set(0, 1));
    }

    #[test]
    fn test_wrong_page_draws_nothing() {
        let pasted = Pasted::new(vec![two_pixel_region()]);
        let mut surface = Surface::new(8, 8);
        pasted.draw(1, &mut surface);
        assert!(surface.data().iter().all(|&b| b == 0));
    }
}
