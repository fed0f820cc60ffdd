//! Direct messages between teams.
//!
//! There is no thread entity: a conversation is the set of messages
//! whose sender/receiver pair matches, in either direction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::team::TeamId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: TeamId,
    pub receiver_id: TeamId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

impl Message {
    /// Whether `team_id` sent or received this message.
    pub fn involves(&self, team_id: &str) -> bool {
        self.sender_id == team_id || self.receiver_id == team_id
    }

    /// Whether this message belongs to the conversation between `a` and `b`.
    pub fn between(&self, a: &str, b: &str) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_matches_both_directions() {
        let msg = Message {
            id: "m1".to_string(),
            sender_id: "a".to_string(),
            receiver_id: "b".to_string(),
            content: "hi".to_string(),
            created_at: Utc::now(),
            read: false,
        };

        assert!(msg.between("a", "b"));
        assert!(msg.between("b", "a"));
        assert!(!msg.between("a", "c"));
        assert!(msg.involves("b"));
        assert!(!msg.involves("c"));
    }
}
