//! Team entity and its registration/profile inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Team identifier (UUID v4 string).
pub type TeamId = String;

/// Bio written on registration until the team edits its profile.
pub const DEFAULT_BIO: &str = "No bio yet.";

/// A registered team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    /// Display name, unique case-insensitively at registration.
    pub team_name: String,
    /// Contact email, also the login key.
    pub email: String,
    /// Opaque image reference (URL or data URL).
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub bio: String,
    /// Ordered image references.
    #[serde(default)]
    pub gallery: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Registration input: a team without id, timestamp or counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTeam {
    pub team_name: String,
    pub email: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewTeam {
    pub fn new(team_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            email: email.into(),
            logo_url: None,
        }
    }

    #[must_use]
    pub fn with_logo(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }
}

/// Partial profile update. Unset fields are left untouched.
///
/// Serializes only the fields that are set, so the JSON form doubles as
/// a shallow merge patch for the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wins: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub losses: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
}

impl TeamPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::store::merge_fields;

    fn team() -> Team {
        Team {
            id: "t1".to_string(),
            team_name: "Eagles".to_string(),
            email: "a@x.com".to_string(),
            logo_url: None,
            wins: 0,
            losses: 0,
            bio: DEFAULT_BIO.to_string(),
            gallery: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_merges_into_stored_record() {
        let mut record = serde_json::to_value(team()).unwrap();
        let patch = TeamPatch {
            bio: Some("We fly".to_string()),
            wins: Some(3),
            ..TeamPatch::default()
        };
        merge_fields(&mut record, &serde_json::to_value(&patch).unwrap());

        let merged: Team = serde_json::from_value(record).unwrap();
        assert_eq!(merged.bio, "We fly");
        assert_eq!(merged.wins, 3);
        assert_eq!(merged.team_name, "Eagles");
        assert_eq!(merged.losses, 0);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = TeamPatch {
            gallery: Some(vec!["img1".to_string()]),
            ..TeamPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "gallery": ["img1"] }));
        assert!(TeamPatch::default().is_empty());
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let json = r#"{"id":"t9","team_name":"Owls","email":"o@x.com","created_at":"2024-01-01T00:00:00Z"}"#;
        let t: Team = serde_json::from_str(json).unwrap();
        assert_eq!(t.wins, 0);
        assert!(t.gallery.is_empty());
        assert!(t.logo_url.is_none());
    }
}
