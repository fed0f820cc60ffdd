//! Consistency Rule Benchmarks — Scan Cost at Portal Scale
//!
//! Benchmarks the rule functions that scan a whole collection on every
//! registration, login and like.
//!
//! Run with: cargo bench --bench rules_bench

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arena_portal::domain::rules::{apply_like, default_avatar, find_by_email, name_taken};
use arena_portal::domain::{DEFAULT_BIO, Team, pair_bracket};

fn teams(count: usize) -> Vec<Team> {
    (0..count)
        .map(|i| Team {
            id: format!("team-{i}"),
            team_name: format!("Team Number {i}"),
            email: format!("captain{i}@example.com"),
            logo_url: None,
            wins: 0,
            losses: 0,
            bio: DEFAULT_BIO.to_string(),
            gallery: Vec::new(),
            created_at: Utc::now(),
        })
        .collect()
}

/// Benchmark a miss (worst case) against 1000 registered names.
fn bench_name_taken(c: &mut Criterion) {
    let teams = teams(1000);

    c.bench_function("name_taken_1000_miss", |b| {
        b.iter(|| {
            let _taken = name_taken(black_box(&teams), black_box("  brand new TEAM "), None);
        });
    });
}

/// Benchmark login lookup of the last team.
fn bench_find_by_email(c: &mut Criterion) {
    let teams = teams(1000);

    c.bench_function("find_by_email_1000_last", |b| {
        b.iter(|| {
            let _team = find_by_email(black_box(&teams), black_box("CAPTAIN999@example.com"));
        });
    });
}

/// Benchmark like + unlike on a post with 500 likes.
fn bench_apply_like(c: &mut Criterion) {
    let mut likes: Vec<String> = (0..500).map(|i| format!("team-{i}")).collect();

    c.bench_function("apply_like_500", |b| {
        b.iter(|| {
            apply_like(&mut likes, black_box("fan"), true);
            apply_like(&mut likes, black_box("fan"), false);
        });
    });
}

/// Benchmark avatar URL generation.
fn bench_default_avatar(c: &mut Criterion) {
    c.bench_function("default_avatar", |b| {
        b.iter(|| {
            let _url = default_avatar(black_box("Los Ángeles Eagles"));
        });
    });
}

/// Benchmark drawing a 64-team bracket.
fn bench_pair_bracket(c: &mut Criterion) {
    let ids: Vec<String> = (0..64).map(|i| format!("team-{i}")).collect();

    c.bench_function("pair_bracket_64", |b| {
        b.iter(|| {
            let _drafts = pair_bracket(black_box(&ids));
        });
    });
}

criterion_group!(
    benches,
    bench_name_taken,
    bench_find_by_email,
    bench_apply_like,
    bench_default_avatar,
    bench_pair_bracket,
);
criterion_main!(benches);
