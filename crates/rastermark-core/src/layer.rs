//! Annotation layers.

use crate::colour::Colour;
use crate::coords::ViewContext;
use crate::shapes::{Shape, ShapeId};
use crate::surface::Surface;
use serde::{Deserialize, Serialize};

/// Identifier of a layer; doubles as the class label in exported matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl LayerId {
    /// The label written into exported matrices for this layer.
    pub fn label(&self) -> i32 {
        self.0 as i32
    }
}

/// A transparent overlay holding an ordered action log of shapes.
///
/// The log order is both the z-order within the layer and the order the
/// edits were performed; re-rendering replays it from scratch, which is
/// what makes exact undo possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub colour: Colour,
    opacity: f64,
    activated: bool,
    actions: Vec<Shape>,
    /// Rendered pixels; rebuilt by [`Layer::draw_layer`], never persisted.
    #[serde(skip)]
    pub surface: Surface,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>, colour: Colour) -> Self {
        Self {
            id,
            name: name.into(),
            colour,
            opacity: 1.0,
            activated: true,
            actions: Vec::new(),
            surface: Surface::default(),
        }
    }

    /// Actions in log order (earliest first).
    pub fn actions(&self) -> &[Shape] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Append a shape to the action log.
    ///
    /// Prefer [`crate::session::AnnotationSession::add_shape`], which also
    /// records the action in the global undo history.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.actions.push(shape);
        id
    }

    /// Remove the action with this exact identity. Returns the shape so the
    /// undo history can hold onto it.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.actions.iter().position(|s| s.id() == id)?;
        Some(self.actions.remove(index))
    }

    pub fn find_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.actions.iter().find(|s| s.id() == id)
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn activate(&mut self) {
        self.activated = true;
    }

    pub fn deactivate(&mut self) {
        self.activated = false;
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Layer colour with opacity folded into the alpha channel.
    pub fn draw_colour(&self) -> Colour {
        let alpha = (self.colour.a as f64 * self.opacity).round() as u8;
        self.colour.with_alpha(alpha)
    }

    /// Render the action log into a fresh surface of the given device size.
    ///
    /// Later actions land on top of earlier ones; subtractive actions clear
    /// whatever earlier actions painted.
    pub fn render_to(
        &self,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
        size: (u32, u32),
    ) -> Surface {
        let mut surface = Surface::new(size.0, size.1);
        let colour = self.draw_colour();
        for action in &self.actions {
            action.draw(colour, page, zoom, ctx, &mut surface);
        }
        surface
    }

    /// Re-render the layer's own surface (clear, then replay the log).
    pub fn draw_layer(&mut self, page: usize, zoom: f64, ctx: &ViewContext, size: (u32, u32)) {
        log::debug!(
            "layer {:?}: redraw {} actions at zoom {zoom}",
            self.id,
            self.actions.len()
        );
        self.surface = self.render_to(page, zoom, ctx, size);
    }
}
