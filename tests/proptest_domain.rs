//! Property-Based Tests — Consistency Rule Invariants
//!
//! Uses `proptest` to verify that the name, like-set and bracket rules
//! hold across random inputs, both as pure functions and through the
//! gateway on an in-memory store.

use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;

use arena_portal::adapters::persistence::LocalStore;
use arena_portal::domain::rules::{apply_like, name_taken, toggle_like};
use arena_portal::domain::{DEFAULT_BIO, NewTeam, PortalError, Team, pair_bracket};
use arena_portal::ports::store::StoreMode;
use arena_portal::usecases::PortalGateway;

fn team(id: &str, name: &str) -> Team {
    Team {
        id: id.to_string(),
        team_name: name.to_string(),
        email: format!("{id}@x.com"),
        logo_url: None,
        wins: 0,
        losses: 0,
        bio: DEFAULT_BIO.to_string(),
        gallery: Vec::new(),
        created_at: Utc::now(),
    }
}

/// Re-case `name` using one flag per character.
fn recase(name: &str, upper: &[bool]) -> String {
    name.chars()
        .zip(upper.iter().cycle())
        .map(|(c, up)| {
            if *up {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/// One step of a like/unlike sequence.
#[derive(Debug, Clone)]
enum LikeOp {
    Set(usize, bool),
    Toggle(usize),
}

fn like_op() -> impl Strategy<Value = LikeOp> {
    prop_oneof![
        (0usize..4, any::<bool>()).prop_map(|(t, liked)| LikeOp::Set(t, liked)),
        (0usize..4).prop_map(LikeOp::Toggle),
    ]
}

// ── Name uniqueness ─────────────────────────────────────────

proptest! {
    /// Any re-casing of an existing name is taken.
    #[test]
    fn recased_name_is_always_taken(
        name in "[a-zA-Z][a-zA-Z ]{0,15}",
        upper in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let teams = vec![team("t1", &name)];
        let variant = recase(&name, &upper);
        prop_assert!(name_taken(&teams, &variant, None));
        prop_assert!(!name_taken(&teams, &variant, Some("t1")));
    }

    /// The gateway rejects the second registration and keeps one team.
    #[test]
    fn gateway_rejects_recased_duplicates(
        name in "[a-z]{3,12}",
        upper in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let gw = PortalGateway::new(Arc::new(LocalStore::in_memory()), StoreMode::Fallback);
        let variant = recase(&name, &upper);

        let (second, teams) = tokio_test::block_on(async {
            gw.register_team(NewTeam::new(name.clone(), "a@x.com")).await.unwrap();
            let second = gw.register_team(NewTeam::new(variant, "b@x.com")).await;
            (second, gw.get_teams().await.unwrap())
        });

        prop_assert!(matches!(second, Err(PortalError::DuplicateName)));
        prop_assert_eq!(teams.len(), 1);
    }
}

// ── Like-set semantics ──────────────────────────────────────

proptest! {
    /// No sequence of like operations puts a team in twice.
    #[test]
    fn likes_hold_each_team_at_most_once(ops in prop::collection::vec(like_op(), 0..40)) {
        let teams = ["t0", "t1", "t2", "t3"];
        let mut likes = Vec::new();
        for op in &ops {
            match op {
                LikeOp::Set(t, liked) => {
                    apply_like(&mut likes, teams[*t], *liked);
                }
                LikeOp::Toggle(t) => {
                    toggle_like(&mut likes, teams[*t]);
                }
            }
        }

        let mut deduped = likes.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), likes.len());
    }

    /// `set_like(true)` twice leaves exactly one entry.
    #[test]
    fn set_like_is_idempotent(existing in prop::collection::vec("[a-z]{2}", 0..6)) {
        let mut likes = existing;
        likes.sort();
        likes.dedup();

        apply_like(&mut likes, "fan", true);
        let changed = apply_like(&mut likes, "fan", true);
        prop_assert!(!changed);
        prop_assert_eq!(likes.iter().filter(|id| *id == "fan").count(), 1);
    }
}

// ── Bracket pairing ─────────────────────────────────────────

proptest! {
    /// Every team lands in exactly one match; only the last can be a bye.
    #[test]
    fn pairing_covers_every_team_once(count in 0usize..40) {
        let ids: Vec<String> = (0..count).map(|i| format!("t{i}")).collect();
        let drafts = pair_bracket(&ids);

        prop_assert_eq!(drafts.len(), count.div_ceil(2));
        let placed: Vec<&String> = drafts
            .iter()
            .flat_map(|d| d.team1_id.iter().chain(d.team2_id.iter()))
            .collect();
        prop_assert_eq!(placed.len(), count);

        let byes = drafts.iter().filter(|d| d.team2_id.is_none()).count();
        prop_assert_eq!(byes, count % 2);
    }
}
