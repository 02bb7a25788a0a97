//! Progress reporting trait for the one-time dataset download.
//!
//! Decouples download progress from any rendering backend. The CLI plugs
//! in `indicatif` bars; the server and tests use [`NullProgress`].

use std::sync::Arc;

/// Trait for reporting progress from a long-running download.
///
/// Implementations must be `Send + Sync` so they can be shared through an
/// [`Arc`] across async tasks.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected bytes (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` bytes.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// A no-op [`ProgressCallback`].
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
