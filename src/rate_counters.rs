use std::sync::atomic::{AtomicU64, Ordering};

use crate::led_source::SEGMENT_COUNT;

/// LED writes making up one frame: one per segment of a panel.
const WRITES_PER_FRAME: u64 = SEGMENT_COUNT as u64;

/// Sample and write counts accumulated since each was last queried.
///
/// The control loop increments, any other thread may query; a query resets
/// the counter it reads.
#[derive(Debug, Default)]
pub struct RateCounters {
    samples_since_query: AtomicU64,
    writes_since_query: AtomicU64,
}

impl RateCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample(&self) {
        self.samples_since_query.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes_since_query.fetch_add(1, Ordering::Relaxed);
    }

    /// Sensor reads since the previous call.
    pub fn take_samples(&self) -> u64 {
        self.samples_since_query.swap(0, Ordering::Relaxed)
    }

    /// LED frames since the previous call.
    pub fn take_frames(&self) -> u64 {
        self.writes_since_query.swap(0, Ordering::Relaxed) / WRITES_PER_FRAME
    }
}
