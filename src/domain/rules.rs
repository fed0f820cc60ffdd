//! Consistency rules applied by the gateway regardless of backend.
//!
//! Pure functions over already-loaded collections. Linear scans are
//! fine at portal scale (hundreds of teams).

use super::team::{Team, TeamId};

/// Base URL for generated avatars when a team registers without a logo.
const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

/// Whether `candidate` collides with an existing team name,
/// ignoring case and surrounding whitespace.
///
/// `except_id` excludes one team from the scan (a team renaming itself
/// to a different casing of its own name is not a collision).
pub fn name_taken(teams: &[Team], candidate: &str, except_id: Option<&str>) -> bool {
    let wanted = normalize(candidate);
    teams
        .iter()
        .filter(|t| except_id != Some(t.id.as_str()))
        .any(|t| normalize(&t.team_name) == wanted)
}

/// Find the team whose contact email matches exactly, ignoring case.
pub fn find_by_email<'a>(teams: &'a [Team], email: &str) -> Option<&'a Team> {
    let wanted = normalize(email);
    teams.iter().find(|t| normalize(&t.email) == wanted)
}

/// Set or clear `team_id` in a like-set.
///
/// Returns `true` when the set changed. A team id is never present twice.
pub fn apply_like(likes: &mut Vec<TeamId>, team_id: &str, liked: bool) -> bool {
    let present = likes.iter().any(|id| id == team_id);
    match (liked, present) {
        (true, false) => {
            likes.push(team_id.to_string());
            true
        }
        (false, true) => {
            likes.retain(|id| id != team_id);
            true
        }
        _ => false,
    }
}

/// Flip `team_id`'s membership. Returns the new membership.
pub fn toggle_like(likes: &mut Vec<TeamId>, team_id: &str) -> bool {
    let liked = !likes.iter().any(|id| id == team_id);
    apply_like(likes, team_id, liked);
    liked
}

/// Generated avatar URL for a team without a logo.
pub fn default_avatar(team_name: &str) -> String {
    format!(
        "{AVATAR_BASE_URL}?name={}&background=random",
        encode_query_value(team_name.trim())
    )
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::team::DEFAULT_BIO;

    fn team(id: &str, name: &str, email: &str) -> Team {
        Team {
            id: id.to_string(),
            team_name: name.to_string(),
            email: email.to_string(),
            logo_url: None,
            wins: 0,
            losses: 0,
            bio: DEFAULT_BIO.to_string(),
            gallery: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_name_taken_ignores_case() {
        let teams = vec![team("1", "Eagles", "a@x.com")];
        assert!(name_taken(&teams, "eagles", None));
        assert!(name_taken(&teams, "  EAGLES ", None));
        assert!(!name_taken(&teams, "Hawks", None));
    }

    #[test]
    fn test_name_taken_skips_excepted_team() {
        let teams = vec![team("1", "Eagles", "a@x.com")];
        assert!(!name_taken(&teams, "EAGLES", Some("1")));
        assert!(name_taken(&teams, "EAGLES", Some("2")));
    }

    #[test]
    fn test_find_by_email_is_exact_but_case_insensitive() {
        let teams = vec![team("1", "Eagles", "A@X.com"), team("2", "Owls", "o@x.com")];
        assert_eq!(find_by_email(&teams, "a@x.COM").map(|t| t.id.as_str()), Some("1"));
        assert!(find_by_email(&teams, "a@x.co").is_none());
    }

    #[test]
    fn test_apply_like_is_idempotent() {
        let mut likes = Vec::new();
        assert!(apply_like(&mut likes, "t1", true));
        assert!(!apply_like(&mut likes, "t1", true));
        assert_eq!(likes, vec!["t1".to_string()]);

        assert!(apply_like(&mut likes, "t1", false));
        assert!(!apply_like(&mut likes, "t1", false));
        assert!(likes.is_empty());
    }

    #[test]
    fn test_toggle_like_flips_membership() {
        let mut likes = vec!["t2".to_string()];
        assert!(toggle_like(&mut likes, "t1"));
        assert!(!toggle_like(&mut likes, "t2"));
        assert_eq!(likes, vec!["t1".to_string()]);
    }

    #[test]
    fn test_default_avatar_encodes_name() {
        let url = default_avatar("Red Fox & Co");
        assert_eq!(
            url,
            "https://ui-avatars.com/api/?name=Red+Fox+%26+Co&background=random"
        );
    }
}
