//! Progress reporting with cooperative cancellation.

/// Receives `(message, fraction)` updates.
///
/// Returning `false` from [`report`](ProgressSink::report) asks the
/// orchestrator to stop. It only honours that request between assets, so a
/// cancelled run never leaves an asset half-saved. A run that is not
/// cancelled ends with a `("Done", 1.0)` update.
pub trait ProgressSink {
    /// `fraction` is in `0.0..=1.0`. Returns whether to continue.
    fn report(&mut self, message: &str, fraction: f32) -> bool;

    /// Dismisses the indicator. Called once at the end of every asset run.
    fn clear(&mut self);
}

/// Ignores updates and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _message: &str, _fraction: f32) -> bool {
        true
    }

    fn clear(&mut self) {}
}
