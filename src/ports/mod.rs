//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the gateway requires from the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `DocumentStore`: Collection persistence (remote REST or local JSON)
//! - `OperationRecorder`: Per-operation outcome counting

pub mod store;
pub mod telemetry;
