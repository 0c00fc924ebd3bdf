//! Per-device sample buffer.

use std::sync::{Mutex, MutexGuard, PoisonError};

use telemetry_core::Sample;

/// Mutex-guarded, append-only list of samples awaiting the next flush.
///
/// Appends and drains are mutually exclusive, so every sample pushed is
/// returned by exactly one [`drain`](SampleBuffer::drain).
#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: Mutex<Vec<Sample>>,
}

impl SampleBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample.
    pub fn push(&self, sample: Sample) {
        self.lock().push(sample);
    }

    /// Take everything buffered so far, leaving the buffer empty.
    ///
    /// Returns `None` when there is nothing to flush.
    pub fn drain(&self) -> Option<Vec<Sample>> {
        let mut samples = self.lock();
        if samples.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut *samples))
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Sample>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
