//! Chunked, cancellable export of annotation layers.
//!
//! An [`ExportSession`] renders every activated layer off-screen up front,
//! then scans them one row at a time through [`LayerScan`]. The caller
//! drives the session with [`ExportSession::step`] (or [`ExportSession::run`]
//! when blocking is acceptable) and receives progress after every chunk.
//! Layers are scanned in stack order and pixels in row-major order, so the
//! produced artifacts are reproducible for identical input.

use crate::ExportError;
use crate::matrix::LabelMatrix;
use crate::scan::{LayerScan, ScanStatus};
use rastermark_core::{AnnotationSession, LayerId, Surface, ViewContext};

/// What kind of ground-truth artifact to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// One label matrix across all layers, serialized as CSV.
    LabelMatrix,
    /// Per layer, the source image restricted to the annotated pixels.
    ImageData,
    /// Per layer, the rendered annotation surface itself.
    Highlights,
}

/// Result of advancing the session by one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Running,
    Done,
}

/// A finished per-layer PNG artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerImage {
    pub layer: LayerId,
    pub png: Vec<u8>,
}

/// Everything the session produced.
///
/// A cancelled session keeps the artifacts of layers that completed before
/// the cancellation; the in-flight layer's artifact is discarded, and a
/// cancelled label-matrix export produces no matrix or CSV at all.
#[derive(Debug, Clone, Default)]
pub struct ExportArtifacts {
    pub matrix: Option<LabelMatrix>,
    pub csv: Option<Vec<u8>>,
    pub layer_images: Vec<LayerImage>,
}

/// Per-mode accumulation state.
enum ModeState {
    Matrix(LabelMatrix),
    Image {
        source: Surface,
        data: Option<Surface>,
    },
    Highlights,
}

struct QueuedLayer {
    id: LayerId,
    surface: Surface,
}

/// A single export run over one page at one zoom level.
///
/// The session owns snapshots of every layer surface: mutating the live
/// layers while an export is in flight cannot corrupt the artifacts.
pub struct ExportSession {
    mode: ExportMode,
    size: (u32, u32),
    queue: Vec<QueuedLayer>,
    current: usize,
    scan: LayerScan,
    state: ModeState,
    images: Vec<LayerImage>,
    csv: Option<Vec<u8>>,
    layers_remaining: usize,
    cancelled: bool,
    finished: bool,
}

impl ExportSession {
    /// Render every activated layer at the given page/zoom and queue it for
    /// scanning. `source` is the host's rendered image surface; required for
    /// [`ExportMode::ImageData`], ignored otherwise.
    pub fn new(
        session: &AnnotationSession,
        page: usize,
        zoom: f64,
        ctx: &ViewContext,
        size: (u32, u32),
        mode: ExportMode,
        source: Option<&Surface>,
    ) -> Result<Self, ExportError> {
        let state = match mode {
            ExportMode::LabelMatrix => ModeState::Matrix(LabelMatrix::new(size.0, size.1)),
            ExportMode::ImageData => ModeState::Image {
                source: source.ok_or(ExportError::MissingSource)?.clone(),
                data: Some(Surface::new(size.0, size.1)),
            },
            ExportMode::Highlights => ModeState::Highlights,
        };
        let queue: Vec<QueuedLayer> = session
            .layers()
            .iter()
            .filter(|l| l.is_activated())
            .map(|l| QueuedLayer {
                id: l.id,
                surface: l.render_to(page, zoom, ctx, size),
            })
            .collect();
        log::info!(
            "export start: {:?}, {} layers, {}x{} at zoom {zoom}",
            mode,
            queue.len(),
            size.0,
            size.1
        );
        let layers_remaining = queue.len();
        let finished = queue.is_empty();
        let mut export = Self {
            mode,
            size,
            queue,
            current: 0,
            scan: LayerScan::new(size.0, size.1),
            state,
            images: Vec::new(),
            csv: None,
            layers_remaining,
            cancelled: false,
            finished,
        };
        if export.finished {
            export.finalize()?;
        }
        Ok(export)
    }

    /// Layers not yet fully scanned (including the one in flight).
    pub fn layers_remaining(&self) -> usize {
        self.layers_remaining
    }

    pub fn is_done(&self) -> bool {
        self.finished
    }

    /// Request cancellation; honoured at the next chunk boundary.
    pub fn cancel(&mut self) {
        self.scan.cancel();
    }

    /// Advance by one chunk (one row of the current layer).
    ///
    /// `progress` is invoked with the layer being scanned and its percent
    /// complete after the chunk.
    pub fn step(
        &mut self,
        progress: &mut dyn FnMut(LayerId, f64),
    ) -> Result<ExportStatus, ExportError> {
        if self.finished {
            return Ok(ExportStatus::Done);
        }
        let layer = &self.queue[self.current];
        let status = match &mut self.state {
            ModeState::Matrix(matrix) => {
                let label = layer.id.label();
                self.scan.step(&mut |x, y| {
                    if layer.surface.is_set(x as i64, y as i64) {
                        matrix.set(x, y, label);
                    }
                })
            }
            ModeState::Image { source, data } => match data.as_mut() {
                Some(data) => self.scan.step(&mut |x, y| {
                    if layer.surface.is_set(x as i64, y as i64) {
                        if let Some(c) = source.get(x as i64, y as i64) {
                            data.put(x as i64, y as i64, c);
                        }
                    }
                }),
                None => self.scan.step(&mut |_, _| {}),
            },
            // The rendered surface itself is the artifact; the scan only
            // paces progress and cancellation.
            ModeState::Highlights => self.scan.step(&mut |_, _| {}),
        };
        let layer_id = layer.id;
        match status {
            ScanStatus::Running { progress: percent } => {
                progress(layer_id, percent);
                Ok(ExportStatus::Running)
            }
            ScanStatus::Done => {
                progress(layer_id, 100.0);
                self.finish_layer()?;
                Ok(if self.finished {
                    ExportStatus::Done
                } else {
                    ExportStatus::Running
                })
            }
            ScanStatus::Cancelled => {
                // The in-flight layer still decrements the counter so
                // completion bookkeeping stays consistent, but its artifact
                // is discarded along with the unscanned layers.
                self.layers_remaining -= 1;
                self.cancelled = true;
                self.finished = true;
                log::info!(
                    "export cancelled on layer {layer_id:?}; {} layers unscanned",
                    self.layers_remaining
                );
                Ok(ExportStatus::Done)
            }
        }
    }

    /// Drive the session to completion or cancellation.
    pub fn run(
        &mut self,
        progress: &mut dyn FnMut(LayerId, f64),
    ) -> Result<ExportStatus, ExportError> {
        while !self.finished {
            self.step(progress)?;
        }
        Ok(ExportStatus::Done)
    }

    fn finish_layer(&mut self) -> Result<(), ExportError> {
        let layer_id = self.queue[self.current].id;
        self.layers_remaining -= 1;
        match &mut self.state {
            ModeState::Image { data, .. } => {
                if let Some(surface) = data.take() {
                    self.images.push(LayerImage {
                        layer: layer_id,
                        png: encode_png(&surface)?,
                    });
                }
                *data = Some(Surface::new(self.size.0, self.size.1));
            }
            ModeState::Highlights => {
                let png = encode_png(&self.queue[self.current].surface)?;
                self.images.push(LayerImage {
                    layer: layer_id,
                    png,
                });
            }
            ModeState::Matrix(_) => {}
        }
        log::debug!("layer {layer_id:?} scan complete");
        self.current += 1;
        if self.current >= self.queue.len() {
            self.finished = true;
            self.finalize()?;
        } else {
            self.scan = LayerScan::new(self.size.0, self.size.1);
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), ExportError> {
        if !self.cancelled {
            if let ModeState::Matrix(matrix) = &self.state {
                self.csv = Some(matrix.to_csv()?);
            }
        }
        log::info!("export session complete");
        Ok(())
    }

    /// Tear down the session and hand over the finished artifacts.
    pub fn into_artifacts(self) -> ExportArtifacts {
        let matrix = match self.state {
            ModeState::Matrix(matrix) if !self.cancelled => Some(matrix),
            _ => None,
        };
        ExportArtifacts {
            matrix,
            csv: self.csv,
            layer_images: self.images,
        }
    }
}

/// Encode a surface as an RGBA8 PNG.
pub(crate) fn encode_png(surface: &Surface) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, surface.width(), surface.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(surface.data())?;
    writer.finish()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::UNSET_LABEL;
    use rastermark_core::{Colour, PagePoint, Rectangle, Shape};

    fn two_layer_session() -> AnnotationSession {
        let mut session = AnnotationSession::new();
        let below = session.create_layer("below", Colour::rgb(255, 0, 0));
        let above = session.create_layer("above", Colour::rgb(0, 255, 0));
        session
            .add_shape(
                below,
                Shape::Rectangle(Rectangle::new(PagePoint::new(0.0, 0.0, 0), 6.0, 6.0)),
            )
            .unwrap();
        session
            .add_shape(
                above,
                Shape::Rectangle(Rectangle::new(PagePoint::new(4.0, 4.0, 0), 4.0, 4.0)),
            )
            .unwrap();
        session
    }

    fn run_export(session: &AnnotationSession, mode: ExportMode, source: Option<&Surface>) -> ExportArtifacts {
        let mut export = ExportSession::new(
            session,
            0,
            0.0,
            &ViewContext::default(),
            (10, 10),
            mode,
            source,
        )
        .unwrap();
        export.run(&mut |_, _| {}).unwrap();
        export.into_artifacts()
    }

    #[test]
    fn test_label_matrix_later_layers_overwrite() {
        let session = two_layer_session();
        let artifacts = run_export(&session, ExportMode::LabelMatrix, None);
        let matrix = artifacts.matrix.unwrap();
        assert_eq!(matrix.get(0, 0), Some(0));
        // Overlap region belongs to the layer scanned later.
        assert_eq!(matrix.get(5, 5), Some(1));
        assert_eq!(matrix.get(7, 7), Some(1));
        assert_eq!(matrix.get(9, 9), Some(UNSET_LABEL));
        assert!(artifacts.csv.is_some());
    }

    #[test]
    fn test_export_is_deterministic() {
        let session = two_layer_session();
        let first = run_export(&session, ExportMode::LabelMatrix, None);
        let second = run_export(&session, ExportMode::LabelMatrix, None);
        assert_eq!(first.matrix, second.matrix);
        assert_eq!(first.csv, second.csv);
    }

    #[test]
    fn test_highlights_one_png_per_layer() {
        let session = two_layer_session();
        let artifacts = run_export(&session, ExportMode::Highlights, None);
        assert_eq!(artifacts.layer_images.len(), 2);
        assert_eq!(artifacts.layer_images[0].layer, LayerId(0));
        // PNG signature.
        assert_eq!(&artifacts.layer_images[0].png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_image_data_samples_source() {
        let session = two_layer_session();
        let mut source = Surface::new(10, 10);
        for y in 0..10 {
            for x in 0..10 {
                source.put(x, y, Colour::rgb(x as u8 * 10, y as u8 * 10, 77));
            }
        }
        let artifacts = run_export(&session, ExportMode::ImageData, Some(&source));
        assert_eq!(artifacts.layer_images.len(), 2);

        // Decode the first layer's PNG and check the annotated region holds
        // source pixels while uncovered pixels stay transparent.
        let decoder = png::Decoder::new(&artifacts.layer_images[0].png[..]);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (10, 10));
        let pixel = |x: usize, y: usize| {
            let i = (y * 10 + x) * 4;
            (buf[i], buf[i + 1], buf[i + 2], buf[i + 3])
        };
        assert_eq!(pixel(2, 3), (20, 30, 77, 255));
        assert_eq!(pixel(8, 8), (0, 0, 0, 0));
    }

    #[test]
    fn test_image_data_requires_source() {
        let session = two_layer_session();
        let err = ExportSession::new(
            &session,
            0,
            0.0,
            &ViewContext::default(),
            (10, 10),
            ExportMode::ImageData,
            None,
        )
        .err()
        .unwrap();
        assert!(matches!(err, ExportError::MissingSource));
    }

    #[test]
    fn test_progress_reports_per_chunk() {
        let mut session = AnnotationSession::new();
        session.create_layer("only", Colour::black());
        let mut export = ExportSession::new(
            &session,
            0,
            0.0,
            &ViewContext::default(),
            (100, 50),
            ExportMode::LabelMatrix,
            None,
        )
        .unwrap();
        let mut last = 0.0;
        for _ in 0..25 {
            export.step(&mut |_, p| last = p).unwrap();
        }
        assert!((last - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cancellation_discards_in_flight_artifacts() {
        let session = two_layer_session();
        let mut export = ExportSession::new(
            &session,
            0,
            0.0,
            &ViewContext::default(),
            (100, 50),
            ExportMode::Highlights,
            None,
        )
        .unwrap();
        // Ten rows into the first layer, then cancel.
        for _ in 0..10 {
            export.step(&mut |_, _| {}).unwrap();
        }
        export.cancel();
        assert_eq!(export.step(&mut |_, _| {}).unwrap(), ExportStatus::Done);
        assert!(export.is_done());
        // Counter still accounts for the in-flight layer.
        assert_eq!(export.layers_remaining(), 1);
        let artifacts = export.into_artifacts();
        assert!(artifacts.layer_images.is_empty());
    }

    #[test]
    fn test_cancelled_matrix_export_produces_no_csv() {
        let session = two_layer_session();
        let mut export = ExportSession::new(
            &session,
            0,
            0.0,
            &ViewContext::default(),
            (10, 10),
            ExportMode::LabelMatrix,
            None,
        )
        .unwrap();
        export.step(&mut |_, _| {}).unwrap();
        export.cancel();
        export.step(&mut |_, _| {}).unwrap();
        let artifacts = export.into_artifacts();
        assert!(artifacts.matrix.is_none());
        assert!(artifacts.csv.is_none());
    }

    #[test]
    fn test_completed_layers_survive_cancellation() {
        let session = two_layer_session();
        let mut export = ExportSession::new(
            &session,
            0,
            0.0,
            &ViewContext::default(),
            (10, 10),
            ExportMode::Highlights,
            None,
        )
        .unwrap();
        // Scan the first layer fully (10 rows), then cancel during the second.
        for _ in 0..12 {
            export.step(&mut |_, _| {}).unwrap();
        }
        export.cancel();
        export.step(&mut |_, _| {}).unwrap();
        let artifacts = export.into_artifacts();
        assert_eq!(artifacts.layer_images.len(), 1);
        assert_eq!(artifacts.layer_images[0].layer, LayerId(0));
    }

    #[test]
    fn test_deactivated_layers_are_skipped() {
        let mut session = two_layer_session();
        let first = session.layers()[0].id;
        session.layer_mut(first).unwrap().deactivate();
        let artifacts = run_export(&session, ExportMode::LabelMatrix, None);
        let matrix = artifacts.matrix.unwrap();
        // Only the second layer contributed labels.
        assert_eq!(matrix.get(0, 0), Some(UNSET_LABEL));
        assert_eq!(matrix.get(5, 5), Some(1));
    }
}
