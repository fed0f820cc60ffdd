//! Hub feed: posts, comments and the author snapshots they carry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::team::{Team, TeamId};

/// Post identifier (UUID v4 string).
pub type PostId = String;

/// Author fields copied onto a post or comment when it is created.
///
/// Not re-synced when the team later renames itself or swaps its logo:
/// old posts keep showing the name they were written under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub team_id: TeamId,
    pub team_name: String,
    #[serde(default)]
    pub team_logo: Option<String>,
}

impl From<&Team> for TeamSnapshot {
    fn from(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            team_name: team.team_name.clone(),
            team_logo: team.logo_url.clone(),
        }
    }
}

/// A comment, owned by exactly one post. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(flatten)]
    pub author: TeamSnapshot,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A hub post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(flatten)]
    pub author: TeamSnapshot,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Team ids that liked the post. Set semantics, insertion order kept.
    #[serde(default)]
    pub likes: Vec<TeamId>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn is_liked_by(&self, team_id: &str) -> bool {
        self.likes.iter().any(|id| id == team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_flattened_into_post_json() {
        let post = Post {
            id: "p1".to_string(),
            author: TeamSnapshot {
                team_id: "t1".to_string(),
                team_name: "Eagles".to_string(),
                team_logo: None,
            },
            content: "GG".to_string(),
            image_url: None,
            likes: vec!["t2".to_string()],
            comments: Vec::new(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["team_name"], "Eagles");
        assert_eq!(json["team_id"], "t1");
        assert!(post.is_liked_by("t2"));
        assert!(!post.is_liked_by("t1"));
        assert_eq!(post.like_count(), 1);
    }
}
