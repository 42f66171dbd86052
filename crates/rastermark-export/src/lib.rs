//! Rastermark Export Library
//!
//! Turns annotation layers into ground-truth artifacts (label matrices as
//! CSV, per-layer PNGs) through a chunked, cancellable scan, and imports
//! encoded bitmaps back into a session as pasted actions.

pub mod export;
pub mod import;
pub mod matrix;
pub mod scan;

pub use export::{ExportArtifacts, ExportMode, ExportSession, ExportStatus, LayerImage};
pub use import::apply_bitmap_to_layer;
pub use matrix::{LabelMatrix, UNSET_LABEL};
pub use scan::{LayerScan, ScanStatus};

use rastermark_core::LayerId;
use thiserror::Error;

/// Export/import pipeline errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("image-data export requires a rendered source surface")]
    MissingSource,
    #[error("unknown layer {0:?}")]
    UnknownLayer(LayerId),
    #[error("decoded bitmap has inconsistent dimensions")]
    MalformedBitmap,
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("bitmap decoding failed: {0}")]
    Image(#[from] image::ImageError),
}
