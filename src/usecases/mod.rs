//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain rules with port interfaces. The portal has a
//! single use-case surface: the persistence gateway the UI calls into.
//!
//! Use cases:
//! - `PortalGateway`: Teams, hub feed, messages, news, ads, matches

pub mod gateway;

pub use gateway::PortalGateway;
