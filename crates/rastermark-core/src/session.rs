//! Annotation session: layer stack plus the global undo/redo log.
//!
//! The session owns every layer and the single cross-layer action history.
//! Layers hold no back-reference to it; operations that need session-wide
//! effects take the session explicitly.

use crate::colour::Colour;
use crate::layer::{Layer, LayerId};
use crate::shapes::{Freehand, Pasted, Shape, ShapeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown layer {0:?}")]
    UnknownLayer(LayerId),
}

/// One entry of the global action log: which layer gained which shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub layer: LayerId,
    pub shape: ShapeId,
}

/// An action popped off the log by undo; holds the shape itself so redo can
/// re-insert the exact same object.
#[derive(Debug, Clone)]
struct UndoneAction {
    layer: LayerId,
    shape: Shape,
}

/// Outcome of an undo/redo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The action was applied; the named layer needs re-rendering.
    Applied(LayerId),
    /// The owning layer is deactivated; the request was ignored.
    Ignored,
    /// Nothing to undo/redo.
    Empty,
}

/// Owns the layer stack and the global, cross-layer action history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationSession {
    layers: Vec<Layer>,
    log: Vec<ActionRecord>,
    /// Redo stack; invalidated by any new edit.
    #[serde(skip)]
    undone: Vec<UndoneAction>,
    next_layer_id: u32,
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer at the top of the stack.
    pub fn create_layer(&mut self, name: impl Into<String>, colour: Colour) -> LayerId {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        self.layers.push(Layer::new(id, name, colour));
        id
    }

    /// Layers in stack order (bottom first).
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// The global action log, oldest first.
    pub fn log(&self) -> &[ActionRecord] {
        &self.log
    }

    /// Delete a layer. All of its history — logged and undone — goes with it.
    pub fn delete_layer(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        self.log.retain(|r| r.layer != id);
        self.undone.retain(|u| u.layer != id);
        log::info!("layer {id:?} deleted, history dropped");
        Some(self.layers.remove(index))
    }

    /// Append a shape to a layer and to the global log.
    ///
    /// Any new edit invalidates the redo history.
    pub fn add_shape(&mut self, layer: LayerId, shape: Shape) -> Result<ShapeId, SessionError> {
        let target = self
            .layer_mut(layer)
            .ok_or(SessionError::UnknownLayer(layer))?;
        let id = target.add_shape(shape);
        self.log.push(ActionRecord { layer, shape: id });
        self.undone.clear();
        Ok(id)
    }

    /// Append a freehand stroke.
    pub fn add_path(&mut self, layer: LayerId, path: Freehand) -> Result<ShapeId, SessionError> {
        self.add_shape(layer, Shape::Freehand(path))
    }

    /// Append pasted pixel regions.
    pub fn add_paste(&mut self, layer: LayerId, pasted: Pasted) -> Result<ShapeId, SessionError> {
        self.add_shape(layer, Shape::Pasted(pasted))
    }

    /// Remove a shape by exact identity from its layer and from the global
    /// history, keeping both logs in lockstep.
    ///
    /// Returns `None` when the layer holds no shape with this id. Selection
    /// markers never enter the global log, so removing one only touches the
    /// layer.
    pub fn remove_shape(
        &mut self,
        layer: LayerId,
        shape: ShapeId,
    ) -> Result<Option<Shape>, SessionError> {
        let target = self
            .layer_mut(layer)
            .ok_or(SessionError::UnknownLayer(layer))?;
        let removed = target.remove_shape(shape);
        if removed.is_some() {
            self.log.retain(|r| r.shape != shape);
            self.undone.retain(|u| u.shape.id() != shape);
        }
        Ok(removed)
    }

    /// Remove a freehand stroke by identity.
    pub fn remove_path(
        &mut self,
        layer: LayerId,
        path: ShapeId,
    ) -> Result<Option<Shape>, SessionError> {
        self.remove_shape(layer, path)
    }

    pub fn can_undo(&self) -> bool {
        !self.log.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Undo the most recent not-yet-undone action across all layers.
    ///
    /// Ignored while the owning layer is deactivated — hidden layers cannot
    /// be edited, so their history cannot be unwound either. The caller
    /// re-renders the returned layer.
    pub fn undo(&mut self) -> UndoOutcome {
        let Some(record) = self.log.last().copied() else {
            return UndoOutcome::Empty;
        };
        let activated = self
            .layer(record.layer)
            .is_some_and(|l| l.is_activated());
        if !activated {
            log::debug!("undo ignored: layer {:?} deactivated", record.layer);
            return UndoOutcome::Ignored;
        }
        self.log.pop();
        if let Some(shape) = self
            .layer_mut(record.layer)
            .and_then(|l| l.remove_shape(record.shape))
        {
            self.undone.push(UndoneAction {
                layer: record.layer,
                shape,
            });
        }
        UndoOutcome::Applied(record.layer)
    }

    /// Re-apply the most recently undone action.
    ///
    /// The same object is re-inserted, so redo restores identity, not just
    /// geometry.
    pub fn redo(&mut self) -> UndoOutcome {
        let Some(undone) = self.undone.last() else {
            return UndoOutcome::Empty;
        };
        let layer = undone.layer;
        let activated = self.layer(layer).is_some_and(|l| l.is_activated());
        if !activated {
            log::debug!("redo ignored: layer {layer:?} deactivated");
            return UndoOutcome::Ignored;
        }
        let Some(undone) = self.undone.pop() else {
            return UndoOutcome::Empty;
        };
        let Some(target) = self.layer_mut(layer) else {
            return UndoOutcome::Empty;
        };
        let id = target.add_shape(undone.shape);
        self.log.push(ActionRecord { layer, shape: id });
        UndoOutcome::Applied(layer)
    }

    /// Serialize the session (layers and log; redo history is transient).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
