//! Telemetry Port - Gateway Operation Recording
//!
//! The gateway reports each finished operation here; the metrics
//! adapter turns that into Prometheus counters.

/// Outcome label of a finished gateway operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Ok,
  /// Rejected by a rule (duplicate name, not found).
  Rejected,
  /// The store failed.
  Failed,
}

impl Outcome {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Ok => "ok",
      Self::Rejected => "rejected",
      Self::Failed => "failed",
    }
  }
}

/// Sink for gateway operation counts.
pub trait OperationRecorder: Send + Sync + 'static {
  fn record(&self, operation: &'static str, outcome: Outcome);
}
