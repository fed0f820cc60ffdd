//! Local Store Tests - File-Backed Fallback Persistence
//!
//! Exercises the JSON bucket files through the gateway: data written by
//! one store instance must be visible after reopening the directory.

use std::sync::Arc;

use arena_portal::adapters::connect_store;
use arena_portal::adapters::persistence::LocalStore;
use arena_portal::config::StoreConfig;
use arena_portal::domain::{MatchDraft, NewTeam, PortalError};
use arena_portal::ports::store::StoreMode;
use arena_portal::usecases::PortalGateway;

async fn open_gateway(dir: &std::path::Path) -> PortalGateway {
    let store = LocalStore::open(dir).await.unwrap();
    assert!(store.is_persistent());
    PortalGateway::new(Arc::new(store), StoreMode::Fallback)
}

#[tokio::test]
async fn test_buckets_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let team_id = {
        let gw = open_gateway(dir.path()).await;
        let team = gw.register_team(NewTeam::new("Eagles", "a@x.com")).await.unwrap();
        gw.update_ad("banner-top", "Hello").await.unwrap();
        gw.save_matches(vec![MatchDraft::pairing(team.id.clone(), None)])
            .await
            .unwrap();
        team.id
    };

    assert!(dir.path().join("teams.json").exists());
    assert!(dir.path().join("site_ads.json").exists());
    assert!(!dir.path().join("teams.json.tmp").exists());

    let gw = open_gateway(dir.path()).await;
    let team = gw.get_team(&team_id).await.unwrap();
    assert_eq!(team.team_name, "Eagles");

    let ads = gw.get_ads().await.unwrap();
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].content, "Hello");

    let matches = gw.get_matches().await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].team1_id.as_deref(), Some(team_id.as_str()));

    let err = gw
        .register_team(NewTeam::new("EAGLES", "b@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::DuplicateName));
}

#[tokio::test]
async fn test_bucket_file_is_a_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let gw = open_gateway(dir.path()).await;
    gw.add_news("Season opens", "Welcome").await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("news.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Season opens");
}

#[tokio::test]
async fn test_corrupt_bucket_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("teams.json"), "{not json").unwrap();

    assert!(LocalStore::open(dir.path()).await.is_err());
}

#[tokio::test]
async fn test_connect_store_uses_data_dir_without_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        url: Some("https://proj.example.co".to_string()),
        key: Some("   ".to_string()),
        data_dir: Some(dir.path().display().to_string()),
        ..StoreConfig::default()
    };

    let (store, mode) = connect_store(&config).await.unwrap();
    assert_eq!(mode, StoreMode::Fallback);

    let gw = PortalGateway::new(store, mode);
    gw.send_message("a", "b", "hi").await.unwrap();
    assert!(dir.path().join("messages.json").exists());
}
