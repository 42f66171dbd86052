//! Bitmap import: turn an encoded image into a pasted annotation.
//!
//! An imported bitmap becomes a single [`Pasted`] action anchored at the
//! page origin, recoloured to the destination layer's colour. It enters the
//! session through the normal action log, so importing is undoable like any
//! other edit.

use crate::ExportError;
use rastermark_core::{AnnotationSession, LayerId, Pasted, Region, ShapeId, Surface};

/// Decode `bytes` (PNG or JPEG) and commit the result to `layer` as one
/// pasted action covering the bitmap's extent from the page origin.
///
/// Pixels with zero alpha stay transparent; everything else adopts the
/// layer's colour with the decoded alpha preserved.
pub fn apply_bitmap_to_layer(
    session: &mut AnnotationSession,
    layer: LayerId,
    page: usize,
    bytes: &[u8],
) -> Result<ShapeId, ExportError> {
    let colour = session
        .layer(layer)
        .ok_or(ExportError::UnknownLayer(layer))?
        .colour;
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    let pixels = Surface::from_rgba8(width, height, decoded.into_raw())
        .ok_or(ExportError::MalformedBitmap)?;
    log::info!("importing {width}x{height} bitmap into layer {layer:?}");
    let mut pasted = Pasted::new(vec![Region::new(page, 0, 0, pixels)]);
    pasted.recolour(colour);
    session
        .add_paste(layer, pasted)
        .map_err(|_| ExportError::UnknownLayer(layer))
}
