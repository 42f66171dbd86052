//! Vector annotation primitives.
//!
//! Shapes are stored in page-relative coordinates and rasterized on demand
//! at a given zoom level. Every variant knows how to enumerate the device
//! pixels it covers; drawing and pixel stamping are built on top of that
//! enumeration, so blend handling lives in exactly one place.

mod circle;
mod compound;
mod freehand;
mod line;
mod pasted;
mod rectangle;

pub use circle::Circle;
pub use compound::Compound;
pub use freehand::Freehand;
pub use line::Line;
pub use pasted::{Pasted, Region};
pub use rectangle::Rectangle;

use crate::colour::Colour;
use crate::coords::ViewContext;
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Per-shape compositing rule.
///
/// `Add` paints onto the layer surface, `Subtract` cuts from it. `Select`
/// marks a selection rectangle that has not been committed yet; markers are
/// transient UI feedback and never composite into layer pixels, so a copy
/// taken after a redraw snapshots the annotated content under them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Add,
    Subtract,
    Select,
}

/// Closed set of shape variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
    Line(Line),
    Freehand(Freehand),
    Compound(Compound),
    Pasted(Pasted),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Circle(s) => s.id,
            Shape::Rectangle(s) => s.id,
            Shape::Line(s) => s.id,
            Shape::Freehand(s) => s.id,
            Shape::Compound(s) => s.id,
            Shape::Pasted(s) => s.id,
        }
    }

    pub fn blend(&self) -> BlendMode {
        match self {
            Shape::Circle(s) => s.blend,
            Shape::Rectangle(s) => s.blend,
            Shape::Line(s) => s.blend,
            Shape::Freehand(s) => s.blend,
            Shape::Compound(s) => s.blend,
            Shape::Pasted(s) => s.blend,
        }
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        match self {
            Shape::Circle(s) => s.blend = blend,
            Shape::Rectangle(s) => s.blend = blend,
            Shape::Line(s) => s.blend = blend,
            Shape::Freehand(s) => s.blend = blend,
            Shape::Compound(s) => s.blend = blend,
            Shape::Pasted(s) => s.blend = blend,
        }
    }

    /// Page this shape belongs to.
    ///
    /// Compound and pasted shapes report the page of their first child or
    /// region; empty ones report page 0 and never cover a pixel anyway.
    pub fn page(&self) -> usize {
        match self {
            Shape::Circle(s) => s.origin.page,
            Shape::Rectangle(s) => s.origin.page,
            Shape::Line(s) => s.start.page,
            Shape::Freehand(s) => s.points.first().map(|p| p.page).unwrap_or(0),
            Shape::Compound(s) => s.children.first().map(|c| c.page()).unwrap_or(0),
            Shape::Pasted(s) => s.regions.first().map(|r| r.page).unwrap_or(0),
        }
    }

    /// Enumerate every device pixel this shape covers at the given zoom, in
    /// absolute-padded coordinates. Shapes on other pages emit nothing.
    pub fn for_each_pixel(
        &self,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
        emit: &mut dyn FnMut(i64, i64),
    ) {
        match self {
            Shape::Circle(s) => s.for_each_pixel(page, zoom, ctx, emit),
            Shape::Rectangle(s) => s.for_each_pixel(page, zoom, ctx, emit),
            Shape::Line(s) => s.for_each_pixel(page, zoom, ctx, emit),
            Shape::Freehand(s) => s.for_each_pixel(page, zoom, ctx, emit),
            Shape::Compound(s) => s.for_each_pixel(page, zoom, ctx, emit),
            Shape::Pasted(s) => s.for_each_pixel(page, emit),
        }
    }

    /// Render into `surface` with the given layer colour.
    ///
    /// No-op when the shape lives on another page. `Subtract` clears covered
    /// pixels; pixels outside the surface are silently clipped.
    pub fn draw(
        &self,
        colour: Colour,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
        surface: &mut Surface,
    ) {
        match self {
            // Children carry their own blend modes.
            Shape::Compound(s) => {
                for child in &s.children {
                    child.draw(colour, page, zoom, ctx, surface);
                }
            }
            // Pasted regions carry their own pixel data.
            Shape::Pasted(s) => s.draw(page, surface),
            _ => match self.blend() {
                BlendMode::Subtract => {
                    self.for_each_pixel(page, zoom, ctx, &mut |x, y| surface.clear_pixel(x, y));
                }
                BlendMode::Add => {
                    self.for_each_pixel(page, zoom, ctx, &mut |x, y| surface.put(x, y, colour));
                }
                // Uncommitted selection markers are not layer content.
                BlendMode::Select => {}
            },
        }
    }

    /// Stamp the covered pixels into `target`, sampling from `reference`.
    ///
    /// `Add` copies the reference pixel at each covered coordinate,
    /// `Subtract` clears it. Out-of-bounds pixels are skipped silently.
    pub fn stamp(
        &self,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
        reference: &Surface,
        target: &mut Surface,
    ) {
        match self {
            Shape::Compound(s) => {
                for child in &s.children {
                    child.stamp(page, zoom, ctx, reference, target);
                }
            }
            _ => match self.blend() {
                BlendMode::Subtract => {
                    self.for_each_pixel(page, zoom, ctx, &mut |x, y| target.clear_pixel(x, y));
                }
                BlendMode::Add => {
                    self.for_each_pixel(page, zoom, ctx, &mut |x, y| {
                        if let Some(c) = reference.get(x, y) {
                            target.put(x, y, c);
                        }
                    });
                }
                BlendMode::Select => {}
            },
        }
    }
}
