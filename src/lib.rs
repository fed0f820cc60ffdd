//! Arena Portal — Library Root
//!
//! Persistence gateway for a team-tournament community portal.
//! Re-exports all modules for integration tests and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
