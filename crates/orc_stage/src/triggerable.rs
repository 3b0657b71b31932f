//! `TriggerableStage` capability mixin (spec §4.4): the uniform,
//! cooperative long-running-job protocol every sink implements.
//!
//! Grounded in the original's `TriggerableStage`/`LDSinkStage`: an
//! `AtomicBool` cancel flag polled at natural breakpoints, a boxed
//! progress callback set once before `trigger`, and an `AtomicBool`
//! "in progress" flag (spec §4.4, §5 "Cancellation").

use orc_artifact::{ArtifactHandle, ObservationContext};
use orc_core::ParameterValue;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// `total == 0` means "indeterminate" (spec §4.4).
pub type ProgressCallback = Box<dyn FnMut(u64, u64, &str) + Send>;

/// A sink's capability to perform long-running, cancellable,
/// progress-reporting I/O (spec §4.4). `trigger` must be callable from
/// a single caller at a time; internal concurrency of the caller is
/// external to this contract.
pub trait TriggerableStage {
    /// Performs the full action. Returns `true` on success, `false` on
    /// failure or cancellation — the distinction, if the caller needs
    /// it, is in `trigger_status()`.
    fn trigger(
        &self,
        inputs: &[ArtifactHandle],
        parameters: &BTreeMap<String, ParameterValue>,
        observation_context: &mut ObservationContext,
    ) -> bool;

    /// Human-readable description of the last completed/ongoing operation.
    fn trigger_status(&self) -> String;

    fn set_progress_callback(&self, callback: ProgressCallback);

    fn is_trigger_in_progress(&self) -> bool;

    /// Sets the cancel flag the sink polls at natural breakpoints
    /// (spec §5: "in practice every field or every N fields").
    fn cancel_trigger(&self);
}

/// Shared bookkeeping every `TriggerableStage` implementor in this
/// workspace embeds: the cancel flag, the in-progress flag, the
/// progress callback, and the last status string. Exposed as a plain
/// struct (not a blanket `impl`) because a stage still has to decide
/// *where* in its own I/O loop to poll `should_cancel()` and call
/// `report_progress()` — those breakpoints are domain-specific.
pub struct TriggerState {
    cancel_requested: AtomicBool,
    in_progress: AtomicBool,
    status: parking_lot::Mutex<String>,
    progress: parking_lot::Mutex<Option<ProgressCallback>>,
}

impl Default for TriggerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancel_requested: AtomicBool::new(false),
            in_progress: AtomicBool::new(false),
            status: parking_lot::Mutex::new(String::from("idle")),
            progress: parking_lot::Mutex::new(None),
        }
    }

    pub fn set_progress_callback(&self, callback: ProgressCallback) {
        *self.progress.lock() = Some(callback);
    }

    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn should_cancel(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn status(&self) -> String {
        self.status.lock().clone()
    }

    fn set_status(&self, message: impl Into<String>) {
        *self.status.lock() = message.into();
    }

    /// Call once at the start of `trigger`; resets the cancel flag and
    /// marks the job in progress.
    pub fn begin(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
        self.in_progress.store(true, Ordering::SeqCst);
        self.set_status("running");
    }

    /// Call at natural breakpoints (spec §4.4: "every field or every
    /// N fields"). Reports progress and returns whether the caller
    /// should stop.
    #[must_use]
    pub fn poll(&self, current: u64, total: u64, message: &str) -> bool {
        if let Some(callback) = self.progress.lock().as_mut() {
            callback(current, total, message);
        }
        self.should_cancel()
    }

    /// Call once at the end of `trigger`, whatever the outcome.
    pub fn finish(&self, success: bool) {
        self.in_progress.store(false, Ordering::SeqCst);
        if self.should_cancel() {
            self.set_status("cancelled by caller");
        } else if success {
            self.set_status("completed successfully");
        } else {
            self.set_status("failed");
        }
    }
}

pub type SharedTriggerState = Arc<TriggerState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_clears_a_stale_cancel_flag() {
        let state = TriggerState::new();
        state.cancel();
        state.begin();
        assert!(!state.should_cancel());
        assert!(state.is_in_progress());
    }

    #[test]
    fn finish_after_cancel_reports_cancel_in_status() {
        let state = TriggerState::new();
        state.begin();
        state.cancel();
        state.finish(false);
        assert!(!state.is_in_progress());
        assert!(state.status().contains("cancel"));
    }

    #[test]
    fn poll_invokes_callback_and_reflects_cancel_state() {
        let state = TriggerState::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        state.set_progress_callback(Box::new(move |cur, total, msg| {
            seen_clone.lock().push((cur, total, msg.to_string()));
        }));
        state.begin();
        assert!(!state.poll(5, 1000, "field 5"));
        state.cancel();
        assert!(state.poll(6, 1000, "field 6"));
        assert_eq!(seen.lock().len(), 2);
    }
}
