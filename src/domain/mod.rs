//! Domain layer - Portal entities and consistency rules.
//!
//! Pure data types and rule functions. No I/O here (hexagonal
//! architecture inner ring); all types are serde-serializable so the
//! gateway can move them through the store port as JSON records.

pub mod bracket;
pub mod error;
pub mod hub;
pub mod message;
pub mod rules;
pub mod site;
pub mod team;

// Re-export core types for convenience
pub use bracket::{Match, MatchDraft, pair_bracket};
pub use error::{PortalError, PortalResult};
pub use hub::{Comment, Post, PostId, TeamSnapshot};
pub use message::Message;
pub use site::{NewsItem, SiteAd};
pub use team::{DEFAULT_BIO, NewTeam, Team, TeamId, TeamPatch};
