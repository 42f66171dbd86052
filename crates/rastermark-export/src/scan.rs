//! Resumable, cancellable pixel scan.
//!
//! Long scans must not freeze the host UI, so scanning is an explicit
//! state machine the caller drives: each [`LayerScan::step`] visits exactly
//! one row (the chunk unit) and yields. Cancellation is polled at chunk
//! boundaries only — a request never interrupts a row in flight.

/// Result of advancing a scan by one chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanStatus {
    /// A row was scanned; more remain.
    Running {
        /// Percent complete, rounded to one decimal, clamped to 100.
        progress: f64,
    },
    /// Every row has been scanned.
    Done,
    /// Cancelled before this chunk started; no further rows will be visited.
    Cancelled,
}

/// Row-major scan over a width x height pixel grid.
#[derive(Debug, Clone)]
pub struct LayerScan {
    width: u32,
    height: u32,
    row: u32,
    cancelled: bool,
}

impl LayerScan {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            row: 0,
            cancelled: false,
        }
    }

    /// Request cancellation; takes effect at the next chunk boundary.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_done(&self) -> bool {
        self.cancelled || self.row >= self.height
    }

    /// Percent of pixels scanned so far, rounded to one decimal and clamped
    /// to 100.
    pub fn progress(&self) -> f64 {
        let total = self.width as f64 * self.height as f64;
        if total == 0.0 {
            return 100.0;
        }
        let scanned = self.row as f64 * self.width as f64;
        let percent = (scanned / total * 100.0).min(100.0);
        (percent * 10.0).round() / 10.0
    }

    /// Scan one row, visiting every pixel in it left to right.
    pub fn step(&mut self, visit: &mut dyn FnMut(u32, u32)) -> ScanStatus {
        if self.cancelled {
            return ScanStatus::Cancelled;
        }
        if self.row >= self.height {
            return ScanStatus::Done;
        }
        let y = self.row;
        for x in 0..self.width {
            visit(x, y);
        }
        self.row += 1;
        if self.row >= self.height {
            ScanStatus::Done
        } else {
            ScanStatus::Running {
                progress: self.progress(),
            }
        }
    }
}
