//! Tournament matches produced by a draw.
//!
//! A draw replaces the whole match set; no earlier bracket is kept.

use serde::{Deserialize, Serialize};

use super::team::TeamId;

/// A stored match. Either slot may be empty (bye or not yet drawn).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    #[serde(default)]
    pub team1_id: Option<TeamId>,
    #[serde(default)]
    pub team2_id: Option<TeamId>,
    #[serde(default)]
    pub score1: Option<u32>,
    #[serde(default)]
    pub score2: Option<u32>,
}

/// A match before it is saved: no id yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDraft {
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub score1: Option<u32>,
    pub score2: Option<u32>,
}

impl MatchDraft {
    pub fn pairing(team1_id: impl Into<TeamId>, team2_id: Option<TeamId>) -> Self {
        Self {
            team1_id: Some(team1_id.into()),
            team2_id,
            score1: None,
            score2: None,
        }
    }

    pub(crate) fn into_match(self, id: String) -> Match {
        Match {
            id,
            team1_id: self.team1_id,
            team2_id: self.team2_id,
            score1: self.score1,
            score2: self.score2,
        }
    }
}

/// Pair neighbouring teams in the given order: (0,1), (2,3), ...
///
/// With an odd count the last team gets a bye (`team2_id = None`).
/// Callers shuffle before drawing if they want a random bracket.
pub fn pair_bracket(team_ids: &[TeamId]) -> Vec<MatchDraft> {
    team_ids
        .chunks(2)
        .map(|pair| match pair {
            [a, b] => MatchDraft::pairing(a.clone(), Some(b.clone())),
            [a] => MatchDraft::pairing(a.clone(), None),
            _ => MatchDraft::default(),
        })
        .collect()
}
