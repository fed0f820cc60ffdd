//! Site content managed by admins: news items and ad zones.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append/delete-only news entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One ad slot. `zone` is the unique key; last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAd {
    pub zone: String,
    pub content: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
