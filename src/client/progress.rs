//! Upload progress tracking.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Upload progress shared between the transport and observers.
///
/// The transport reports bytes handed to the request body; the percentage
/// never goes backwards and stays below 100 until [`complete`] is called,
/// since the last byte being sent is not the same as the server answering.
///
/// [`complete`]: UploadProgress::complete
#[derive(Debug, Default)]
pub struct UploadProgress {
    percent: AtomicU8,
    active: AtomicBool,
}

impl UploadProgress {
    /// Create an idle tracker at 0%.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new upload: reset to 0% and mark active.
    pub fn start(&self) {
        self.percent.store(0, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
    }

    /// Record that `sent` of `total` bytes have been handed to the transport.
    pub fn record(&self, sent: u64, total: u64) {
        if total == 0 {
            return;
        }
        let percent = (sent.min(total).saturating_mul(100) / total).min(99) as u8;
        self.percent.fetch_max(percent, Ordering::SeqCst);
    }

    /// The server answered: force 100%.
    pub fn complete(&self) {
        self.percent.store(100, Ordering::SeqCst);
    }

    /// The upload is over (successfully or not).
    pub fn finish(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Current percentage.
    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::SeqCst)
    }

    /// Whether an upload is in flight.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
