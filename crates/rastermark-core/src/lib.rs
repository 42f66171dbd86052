//! Rastermark Core Library
//!
//! Geometry, vector shapes, layers and undo history for a layered
//! raster-annotation engine: shapes drawn on transparent layers over a
//! zoomable, paginated image surface, later rasterized into pixel-exact
//! classification data.

pub mod colour;
pub mod coords;
pub mod layer;
pub mod scanfill;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod surface;

pub use colour::{Colour, SIMILAR_TOLERANCE};
pub use coords::{PageLayout, PageOffset, PagePoint, ViewContext, ViewportMetrics, scale_ratio};
pub use layer::{Layer, LayerId};
pub use selection::{Selection, SelectionError};
pub use session::{ActionRecord, AnnotationSession, SessionError, UndoOutcome};
pub use shapes::{
    BlendMode, Circle, Compound, Freehand, Line, Pasted, Rectangle, Region, Shape, ShapeId,
};
pub use surface::Surface;
