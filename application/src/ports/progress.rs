//! Progress notification port
//!
//! Defines the interface for reporting debate progress to callers.

use ensemble_domain::CouncilPhase;

/// Callback for phase progress during a council debate.
///
/// Each phase reports `progress = 0.0` when it starts and `progress = 1.0`
/// when it completes, with a human-readable message. Advisory telemetry
/// only; implementations live in the presentation layer and must never
/// influence control flow.
pub trait ProgressNotifier: Send + Sync {
    fn on_phase(&self, phase: CouncilPhase, progress: f64, message: &str);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase(&self, _phase: CouncilPhase, _progress: f64, _message: &str) {}
}
