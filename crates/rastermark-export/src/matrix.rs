//! Per-pixel label matrix and its CSV form.

use crate::ExportError;

/// Sentinel for pixels no layer covers.
pub const UNSET_LABEL: i32 = -1;

/// A height x width grid mapping each device pixel to the topmost layer id
/// covering it, or [`UNSET_LABEL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatrix {
    width: u32,
    height: u32,
    cells: Vec<i32>,
}

impl LabelMatrix {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![UNSET_LABEL; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<i32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[(y * self.width + x) as usize])
    }

    /// Write a label. Out-of-bounds writes are dropped, matching the
    /// rasterizer's clipping behaviour.
    pub fn set(&mut self, x: u32, y: u32, label: i32) {
        if x >= self.width || y >= self.height {
            return;
        }
        self.cells[(y * self.width + x) as usize] = label;
    }

    /// Serialize as CSV: one record per row, plain integers, `-1` for unset.
    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        for row in self.cells.chunks(self.width as usize) {
            writer.write_record(row.iter().map(|label| label.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| ExportError::Csv(e.into_error().into()))
    }
}
