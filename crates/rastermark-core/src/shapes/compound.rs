//! Compound shape: several shapes treated as one atomic action.

use super::{BlendMode, Shape, ShapeId};
use crate::coords::ViewContext;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ordered sequence of shapes drawn and undone as a single unit.
///
/// Exists so a multi-rectangle cut can be recorded as one entry in the
/// action log: undoing it restores every cleared region at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compound {
    pub(crate) id: ShapeId,
    /// Child shapes, drawn in order with their own blend modes.
    pub children: Vec<Shape>,
    pub blend: BlendMode,
}

impl Compound {
    pub fn new(children: Vec<Shape>) -> Self {
        Self {
            id: Uuid::new_v4(),
            children,
            blend: BlendMode::Add,
        }
    }

    pub fn children(&self) -> &[Shape] {
        &self.children
    }

    pub(crate) fn for_each_pixel(
        &self,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
        emit: &mut dyn FnMut(i64, i64),
    ) {
        for child in &self.children {
            child.for_each_pixel(page, zoom, ctx, emit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;
    use crate::coords::PagePoint;
    use crate::shapes::Rectangle;
    use crate::surface::Surface;

    #[test]
    fn test_subtractive_compound_clears_all_children() {
        let ctx = ViewContext::default();
        let mut surface = Surface::new(10, 10);
        let base = Shape::Rectangle(Rectangle::new(PagePoint::new(0.0, 0.0, 0), 10.0, 10.0));
        base.draw(Colour::white(), 0, 0.0, &ctx, &mut surface);

        let cut = Shape::Compound(Compound::new(vec![
            Shape::Rectangle(Rectangle::with_blend(
                PagePoint::new(0.0, 0.0, 0),
                2.0,
                2.0,
                BlendMode::Subtract,
            )),
            Shape::Rectangle(Rectangle::with_blend(
                PagePoint::new(6.0, 6.0, 0),
                2.0,
                2.0,
                BlendMode::Subtract,
            )),
        ]));
        cut.draw(Colour::white(), 0, 0.0, &ctx, &mut surface);

        assert!(!surface.is_set(1, 1));
        assert!(!surface.is_set(7, 7));
        assert!(surface.is_set(4, 4));
    }
}
