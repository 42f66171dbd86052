//! Rectangular pixel selection and clipboard.
//!
//! A selection is bound to exactly one layer at a time. Marker rectangles
//! (blend `Select`) live in the layer's action log only for visual feedback
//! and are never recorded in the global history; committing the selection
//! via copy or cut replaces them with owned pixel snapshots.

use crate::coords::{PagePoint, ViewContext};
use crate::layer::LayerId;
use crate::session::AnnotationSession;
use crate::shapes::{BlendMode, Compound, Pasted, Rectangle, Region, Shape, ShapeId};
use thiserror::Error;

/// Selection/clipboard errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// Copy/cut/paste require a layer to be bound first.
    #[error("no layer bound to the selection")]
    NoLayerBound,
    #[error("selection bound to unknown layer {0:?}")]
    UnknownLayer(LayerId),
}

/// The single live clipboard.
///
/// Stored regions are value-semantic copies of layer pixels; redrawing the
/// source layer after a copy cannot change what gets pasted.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    layer: Option<LayerId>,
    marker_ids: Vec<ShapeId>,
    regions: Vec<Region>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound_layer(&self) -> Option<LayerId> {
        self.layer
    }

    /// Copied pixel regions awaiting a paste.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Bind the selection to a layer, discarding any previous uncommitted
    /// selection (its markers are removed from their layer).
    pub fn begin(&mut self, session: &mut AnnotationSession, layer: LayerId) {
        self.discard(session);
        self.layer = Some(layer);
    }

    /// Remove uncommitted marker shapes and drop stored regions.
    pub fn discard(&mut self, session: &mut AnnotationSession) {
        if let Some(layer) = self.layer.and_then(|id| session.layer_mut(id)) {
            for id in self.marker_ids.drain(..) {
                layer.remove_shape(id);
            }
        }
        self.marker_ids.clear();
        self.regions.clear();
        self.layer = None;
    }

    /// Add a selection rectangle to the bound layer.
    ///
    /// The marker is drawn with blend `Select` and bypasses the global log;
    /// selections are not edits until committed.
    pub fn add_rect(
        &mut self,
        session: &mut AnnotationSession,
        mut rect: Rectangle,
    ) -> Result<ShapeId, SelectionError> {
        let layer_id = self.layer.ok_or(SelectionError::NoLayerBound)?;
        let layer = session
            .layer_mut(layer_id)
            .ok_or(SelectionError::UnknownLayer(layer_id))?;
        rect.blend = BlendMode::Select;
        let id = layer.add_shape(Shape::Rectangle(rect));
        self.marker_ids.push(id);
        Ok(id)
    }

    /// Snapshot the pixels under every selection rectangle from the layer's
    /// rendered surface and remove the markers.
    ///
    /// The layer surface must be current (rendered at the same page/zoom/
    /// context) before calling. Stored regions paste additively.
    pub fn copy(
        &mut self,
        session: &mut AnnotationSession,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
    ) -> Result<(), SelectionError> {
        let layer_id = self.layer.ok_or(SelectionError::NoLayerBound)?;
        let layer = session
            .layer_mut(layer_id)
            .ok_or(SelectionError::UnknownLayer(layer_id))?;

        for id in self.marker_ids.drain(..) {
            let Some(Shape::Rectangle(rect)) = layer.remove_shape(id) else {
                continue;
            };
            let (x0, y0, width, height) = device_bounds(&rect, zoom, ctx);
            if rect.origin.page != page || width == 0 || height == 0 {
                continue;
            }
            let pixels = layer.surface.copy_region(x0, y0, width, height);
            self.regions.push(Region::new(page, x0, y0, pixels));
        }
        log::debug!(
            "selection copy: {} regions from layer {layer_id:?}",
            self.regions.len()
        );
        Ok(())
    }

    /// Copy, then clear the source regions with a single subtractive
    /// compound action (so the cut itself is undoable).
    pub fn cut(
        &mut self,
        session: &mut AnnotationSession,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
    ) -> Result<(), SelectionError> {
        let layer_id = self.layer.ok_or(SelectionError::NoLayerBound)?;
        let cutouts: Vec<Shape> = {
            let layer = session
                .layer(layer_id)
                .ok_or(SelectionError::UnknownLayer(layer_id))?;
            self.marker_ids
                .iter()
                .filter_map(|&id| match layer.find_shape(id) {
                    Some(Shape::Rectangle(rect)) => Some(Shape::Rectangle(Rectangle::with_blend(
                        rect.origin,
                        rect.width,
                        rect.height,
                        BlendMode::Subtract,
                    ))),
                    _ => None,
                })
                .collect()
        };
        self.copy(session, page, zoom, ctx)?;
        if !cutouts.is_empty() {
            session
                .add_shape(layer_id, Shape::Compound(Compound::new(cutouts)))
                .map_err(|_| SelectionError::UnknownLayer(layer_id))?;
        }
        Ok(())
    }

    /// Paste the stored regions onto a layer, recoloured to its colour.
    ///
    /// Recorded as a single pasted-region action in the global history.
    pub fn paste(
        &self,
        session: &mut AnnotationSession,
        target: LayerId,
    ) -> Result<ShapeId, SelectionError> {
        if self.layer.is_none() {
            return Err(SelectionError::NoLayerBound);
        }
        let colour = session
            .layer(target)
            .ok_or(SelectionError::UnknownLayer(target))?
            .colour;
        let mut pasted = Pasted::new(self.regions.clone());
        pasted.recolour(colour);
        session
            .add_paste(target, pasted)
            .map_err(|_| SelectionError::UnknownLayer(target))
    }
}

/// Device-space bounds of a selection rectangle, matching the rasterizer's
/// pixel rounding.
fn device_bounds(rect: &Rectangle, zoom: f64, ctx: &ViewContext) -> (i64, i64, u32, u32) {
    let bounds = rect.bounds();
    let top_left = PagePoint::new(bounds.x0, bounds.y0, rect.origin.page).to_absolute_padded(zoom, ctx);
    let bottom_right =
        PagePoint::new(bounds.x1, bounds.y1, rect.origin.page).to_absolute_padded(zoom, ctx);
    let x0 = top_left.x.ceil() as i64;
    let y0 = top_left.y.ceil() as i64;
    let width = (bottom_right.x.ceil() as i64 - x0).max(0) as u32;
    let height = (bottom_right.y.ceil() as i64 - y0).max(0) as u32;
    (x0, y0, width, height)
}
