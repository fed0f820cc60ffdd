//! Portal Gateway - The Single Persistence Façade
//!
//! Every domain operation the UI may call: team registration, login
//! and profile edits, the hub feed (posts, likes, comments), direct
//! messages, news, ad zones and match draws.
//!
//! The backend is bound once at construction and never re-decided.
//! Business rules (name uniqueness, like-set semantics, ad upsert by
//! zone, replace-all draws) live here and run the same on either store.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::{PortalError, PortalResult};
use crate::domain::rules;
use crate::domain::{
  Comment, DEFAULT_BIO, Match, MatchDraft, Message, NewTeam, NewsItem, Post, SiteAd, Team,
  TeamPatch, TeamSnapshot, pair_bracket,
};
use crate::ports::store::{
  Collection, ConflictCheck, DocumentStore, Filter, RecordChange, StoreError, StoreMode,
};
use crate::ports::telemetry::{OperationRecorder, Outcome};

/// Key field of the ad collection.
const AD_ZONE_FIELD: &str = "zone";
/// Login lookup field of the team collection.
const EMAIL_FIELD: &str = "email";
/// Participant fields of the message collection.
const PARTICIPANT_FIELDS: &[&str] = &["sender_id", "receiver_id"];

/// Persistence façade over one store strategy.
pub struct PortalGateway {
  /// Store chosen at startup.
  store: Arc<dyn DocumentStore>,
  /// Which kind of store that is.
  mode: StoreMode,
  /// Optional operation counter sink.
  recorder: Option<Arc<dyn OperationRecorder>>,
}

impl PortalGateway {
  /// Bind a gateway to a store for its whole lifetime.
  pub fn new(store: Arc<dyn DocumentStore>, mode: StoreMode) -> Self {
    info!(mode = %mode, "Portal gateway bound to store");
    Self {
      store,
      mode,
      recorder: None,
    }
  }

  /// Count every finished operation in `recorder`.
  #[must_use]
  pub fn with_recorder(mut self, recorder: Arc<dyn OperationRecorder>) -> Self {
    self.recorder = Some(recorder);
    self
  }

  /// Backend this gateway was bound to.
  pub fn mode(&self) -> StoreMode {
    self.mode
  }

  /// Whether the underlying store is reachable.
  pub async fn is_healthy(&self) -> bool {
    self.store.is_healthy().await
  }

  // ── Teams ───────────────────────────────────────────────

  /// Register a team. Fails with `DuplicateName` on a case-insensitive
  /// name collision; the collection is left unchanged.
  #[instrument(skip(self, new_team), fields(team_name = %new_team.team_name))]
  pub async fn register_team(&self, new_team: NewTeam) -> PortalResult<Team> {
    let result = self.try_register_team(new_team).await;
    self.observe("register_team", result)
  }

  /// Look a team up by contact email (case-insensitive, exact).
  ///
  /// This is an identity lookup, not authentication: no credential is
  /// checked.
  #[instrument(skip(self))]
  pub async fn login(&self, email: &str) -> PortalResult<Team> {
    let result = self.try_login(email).await;
    self.observe("login", result)
  }

  /// Merge `patch` into team `id` and return the merged record.
  #[instrument(skip(self, patch), fields(team_id = %id))]
  pub async fn update_profile(&self, id: &str, patch: TeamPatch) -> PortalResult<Team> {
    let result = self.try_update_profile(id, patch).await;
    self.observe("update_profile", result)
  }

  /// All teams, newest first.
  pub async fn get_teams(&self) -> PortalResult<Vec<Team>> {
    let result = self.load_all::<Team>(Collection::Teams).await.map(|mut teams| {
      teams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
      teams
    });
    self.observe("get_teams", result)
  }

  /// One team by id.
  pub async fn get_team(&self, id: &str) -> PortalResult<Team> {
    let result = self.load_one(Collection::Teams, id, "Team").await;
    self.observe("get_team", result)
  }

  // ── Messages ────────────────────────────────────────────

  /// Every message sent or received by `participant_id`, oldest first.
  pub async fn get_messages(&self, participant_id: &str) -> PortalResult<Vec<Message>> {
    let result = self
      .load_messages(participant_id, |m| m.involves(participant_id))
      .await;
    self.observe("get_messages", result)
  }

  /// Messages between `a` and `b` in either direction, oldest first.
  pub async fn get_conversation(&self, a: &str, b: &str) -> PortalResult<Vec<Message>> {
    let result = self.load_messages(a, |m| m.between(a, b)).await;
    self.observe("get_conversation", result)
  }

  /// Send an unread message stamped with the current time.
  #[instrument(skip(self, content))]
  pub async fn send_message(
    &self,
    sender_id: &str,
    receiver_id: &str,
    content: &str,
  ) -> PortalResult<Message> {
    let message = Message {
      id: new_id(),
      sender_id: sender_id.to_string(),
      receiver_id: receiver_id.to_string(),
      content: content.to_string(),
      created_at: Utc::now(),
      read: false,
    };
    let result = self.insert(Collection::Messages, &message).await;
    self.observe("send_message", result)
  }

  /// Flag a message as read.
  #[instrument(skip(self))]
  pub async fn mark_read(&self, message_id: &str) -> PortalResult<Message> {
    let result = self
      .update(Collection::Messages, message_id, json!({ "read": true }), "Message")
      .await;
    self.observe("mark_read", result)
  }

  // ── Hub feed ────────────────────────────────────────────

  /// Publish a post under the author's current name and logo.
  #[instrument(skip(self, content, image_url), fields(team_id = %author_id))]
  pub async fn create_post(
    &self,
    author_id: &str,
    content: &str,
    image_url: Option<String>,
  ) -> PortalResult<Post> {
    let result = self.try_create_post(author_id, content, image_url).await;
    self.observe("create_post", result)
  }

  /// All posts, newest first.
  pub async fn get_posts(&self) -> PortalResult<Vec<Post>> {
    let result = self.load_all::<Post>(Collection::Posts).await.map(|mut posts| {
      posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
      posts
    });
    self.observe("get_posts", result)
  }

  /// Put `team_id` in (`liked = true`) or out of the post's like-set.
  ///
  /// Idempotent: repeating a call changes nothing and writes nothing.
  #[instrument(skip(self))]
  pub async fn set_like(&self, post_id: &str, team_id: &str, liked: bool) -> PortalResult<Post> {
    let team_id = team_id.to_string();
    let result = self
      .modify_post(post_id, move |post| rules::apply_like(&mut post.likes, &team_id, liked))
      .await;
    self.observe("set_like", result)
  }

  /// Like if not yet liked by `team_id`, unlike otherwise.
  #[instrument(skip(self))]
  pub async fn toggle_like(&self, post_id: &str, team_id: &str) -> PortalResult<Post> {
    let team_id = team_id.to_string();
    let result = self
      .modify_post(post_id, move |post| {
        rules::toggle_like(&mut post.likes, &team_id);
        true
      })
      .await;
    self.observe("toggle_like", result)
  }

  /// Append a comment under the author's current name and logo.
  #[instrument(skip(self, text), fields(team_id = %author_id))]
  pub async fn add_comment(&self, post_id: &str, author_id: &str, text: &str) -> PortalResult<Post> {
    let result = self.try_add_comment(post_id, author_id, text).await;
    self.observe("add_comment", result)
  }

  // ── News ────────────────────────────────────────────────

  /// All news items, newest first.
  pub async fn get_news(&self) -> PortalResult<Vec<NewsItem>> {
    let result = self.load_all::<NewsItem>(Collection::News).await.map(|mut news| {
      news.sort_by(|a, b| b.created_at.cmp(&a.created_at));
      news
    });
    self.observe("get_news", result)
  }

  /// Append a news item.
  #[instrument(skip(self, content))]
  pub async fn add_news(&self, title: &str, content: &str) -> PortalResult<NewsItem> {
    let item = NewsItem {
      id: new_id(),
      title: title.to_string(),
      content: content.to_string(),
      created_at: Utc::now(),
    };
    let result = self.insert(Collection::News, &item).await;
    self.observe("add_news", result)
  }

  /// Hard-delete a news item. Missing ids are ignored.
  #[instrument(skip(self))]
  pub async fn delete_news(&self, id: &str) -> PortalResult<()> {
    let result = self
      .store
      .delete(Collection::News, id)
      .await
      .map_err(PortalError::from);
    self.observe("delete_news", result)
  }

  // ── Ads ─────────────────────────────────────────────────

  /// All ad zones.
  pub async fn get_ads(&self) -> PortalResult<Vec<SiteAd>> {
    let result = self.load_all(Collection::SiteAds).await;
    self.observe("get_ads", result)
  }

  /// Set the content of an ad zone, creating it (active) if new.
  ///
  /// An existing zone keeps its `is_active` flag.
  #[instrument(skip(self, content))]
  pub async fn update_ad(&self, zone: &str, content: &str) -> PortalResult<SiteAd> {
    let result = self.try_update_ad(zone, content).await;
    self.observe("update_ad", result)
  }

  // ── Matches ─────────────────────────────────────────────

  /// The current bracket.
  pub async fn get_matches(&self) -> PortalResult<Vec<Match>> {
    let result = self.load_all(Collection::Matches).await;
    self.observe("get_matches", result)
  }

  /// Replace the whole bracket with `drafts`, each given a fresh id.
  ///
  /// Destructive: earlier matches are deleted, not archived.
  #[instrument(skip(self, drafts), fields(count = drafts.len()))]
  pub async fn save_matches(&self, drafts: Vec<MatchDraft>) -> PortalResult<Vec<Match>> {
    let result = self.try_save_matches(drafts).await;
    self.observe("save_matches", result)
  }

  /// Pair `team_ids` in order (odd one out gets a bye) and save the
  /// result as the new bracket.
  pub async fn draw_matches(&self, team_ids: &[String]) -> PortalResult<Vec<Match>> {
    self.save_matches(pair_bracket(team_ids)).await
  }

  // ── Operation bodies ────────────────────────────────────

  async fn try_register_team(&self, new_team: NewTeam) -> PortalResult<Team> {
    let team_name = new_team.team_name.trim().to_string();
    let logo_url = new_team
      .logo_url
      .filter(|logo| !logo.trim().is_empty())
      .unwrap_or_else(|| rules::default_avatar(&team_name));

    let team = Team {
      id: new_id(),
      team_name,
      email: new_team.email.trim().to_string(),
      logo_url: Some(logo_url),
      wins: 0,
      losses: 0,
      bio: DEFAULT_BIO.to_string(),
      gallery: Vec::new(),
      created_at: Utc::now(),
    };

    let record = encode(Collection::Teams, &team)?;
    let guard = name_guard(team.team_name.clone(), None);
    let stored = match self.store.insert_unless(Collection::Teams, record, guard).await {
      // Either our check or a unique index on the store side.
      Err(StoreError::Conflict { .. }) => {
        info!("Registration rejected: name taken");
        return Err(PortalError::DuplicateName);
      }
      other => other?,
    };
    let created: Team = decode(Collection::Teams, stored)?;
    info!(team_id = %created.id, "Team registered");
    Ok(created)
  }

  async fn try_login(&self, email: &str) -> PortalResult<Team> {
    let email = email.trim();
    let filter = Filter::EqIgnoreCase {
      field: EMAIL_FIELD,
      value: email.to_string(),
    };
    let teams = self.load_where::<Team>(Collection::Teams, &filter).await?;
    rules::find_by_email(&teams, email)
      .cloned()
      .ok_or_else(|| PortalError::not_found("Team", email))
  }

  async fn try_update_profile(&self, id: &str, mut patch: TeamPatch) -> PortalResult<Team> {
    if patch.is_empty() {
      return self.load_one(Collection::Teams, id, "Team").await;
    }

    let Some(name) = patch.team_name.take() else {
      let fields = encode(Collection::Teams, &patch)?;
      return self.update(Collection::Teams, id, fields, "Team").await;
    };

    let name = name.trim().to_string();
    let guard = name_guard(name.clone(), Some(id.to_string()));
    patch.team_name = Some(name);
    let fields = encode(Collection::Teams, &patch)?;

    match self.store.update_unless(Collection::Teams, id, fields, guard).await {
      Err(StoreError::Conflict { .. }) => {
        info!("Rename rejected: name taken");
        Err(PortalError::DuplicateName)
      }
      Ok(Some(record)) => decode(Collection::Teams, record),
      Ok(None) => Err(PortalError::not_found("Team", id)),
      Err(e) => Err(e.into()),
    }
  }

  async fn try_create_post(
    &self,
    author_id: &str,
    content: &str,
    image_url: Option<String>,
  ) -> PortalResult<Post> {
    let author: Team = self.load_one(Collection::Teams, author_id, "Team").await?;
    let post = Post {
      id: new_id(),
      author: TeamSnapshot::from(&author),
      content: content.to_string(),
      image_url: image_url.filter(|url| !url.trim().is_empty()),
      likes: Vec::new(),
      comments: Vec::new(),
      created_at: Utc::now(),
    };
    self.insert(Collection::Posts, &post).await
  }

  async fn try_add_comment(&self, post_id: &str, author_id: &str, text: &str) -> PortalResult<Post> {
    let author: Team = self.load_one(Collection::Teams, author_id, "Team").await?;
    let comment = Comment {
      id: new_id(),
      author: TeamSnapshot::from(&author),
      text: text.to_string(),
      created_at: Utc::now(),
    };

    self
      .modify_post(post_id, move |post| {
        post.comments.push(comment);
        true
      })
      .await
  }

  /// Let `change` edit a post in one store-side read-modify-write.
  ///
  /// A record that does not decode as a `Post` is left untouched and
  /// reported as `InvalidRecord`.
  async fn modify_post<F>(&self, post_id: &str, change: F) -> PortalResult<Post>
  where
    F: FnOnce(&mut Post) -> bool + Send + 'static,
  {
    let edit: RecordChange = Box::new(move |record: &mut Value| {
      let Ok(mut post) = Post::deserialize(&*record) else {
        return false;
      };
      if !change(&mut post) {
        return false;
      }
      match serde_json::to_value(&post) {
        Ok(updated) => {
          *record = updated;
          true
        }
        Err(_) => false,
      }
    });

    match self.store.modify(Collection::Posts, post_id, edit).await? {
      Some(record) => decode(Collection::Posts, record),
      None => Err(PortalError::not_found("Post", post_id)),
    }
  }

  async fn try_update_ad(&self, zone: &str, content: &str) -> PortalResult<SiteAd> {
    let stored = self
      .store
      .upsert(
        Collection::SiteAds,
        AD_ZONE_FIELD,
        json!({ AD_ZONE_FIELD: zone, "content": content }),
        json!({ "is_active": true }),
      )
      .await?;
    decode(Collection::SiteAds, stored)
  }

  async fn try_save_matches(&self, drafts: Vec<MatchDraft>) -> PortalResult<Vec<Match>> {
    let records = drafts
      .into_iter()
      .map(|draft| encode(Collection::Matches, &draft.into_match(new_id())))
      .collect::<PortalResult<Vec<_>>>()?;

    let stored = self.store.replace_all(Collection::Matches, records).await?;
    info!(count = stored.len(), "Bracket replaced");
    stored
      .into_iter()
      .map(|record| decode(Collection::Matches, record))
      .collect()
  }

  // ── Store helpers ───────────────────────────────────────

  async fn load_all<T: DeserializeOwned>(&self, collection: Collection) -> PortalResult<Vec<T>> {
    self
      .store
      .list(collection)
      .await?
      .into_iter()
      .map(|record| decode(collection, record))
      .collect()
  }

  async fn load_one<T: DeserializeOwned>(
    &self,
    collection: Collection,
    id: &str,
    entity: &'static str,
  ) -> PortalResult<T> {
    match self.store.get(collection, id).await? {
      Some(record) => decode(collection, record),
      None => Err(PortalError::not_found(entity, id)),
    }
  }

  async fn load_where<T: DeserializeOwned>(
    &self,
    collection: Collection,
    filter: &Filter,
  ) -> PortalResult<Vec<T>> {
    self
      .store
      .list_where(collection, filter)
      .await?
      .into_iter()
      .map(|record| decode(collection, record))
      .collect()
  }

  /// Messages of `participant_id` that pass `keep`, oldest first.
  async fn load_messages<F>(&self, participant_id: &str, keep: F) -> PortalResult<Vec<Message>>
  where
    F: Fn(&Message) -> bool,
  {
    let filter = Filter::AnyEq {
      fields: PARTICIPANT_FIELDS,
      value: participant_id.to_string(),
    };
    let mut messages: Vec<Message> = self
      .load_where::<Message>(Collection::Messages, &filter)
      .await?
      .into_iter()
      .filter(|m| keep(m))
      .collect();
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(messages)
  }

  async fn insert<T: Serialize + DeserializeOwned>(
    &self,
    collection: Collection,
    value: &T,
  ) -> PortalResult<T> {
    let record = encode(collection, value)?;
    let stored = self.store.insert(collection, record).await?;
    decode(collection, stored)
  }

  async fn update<T: DeserializeOwned>(
    &self,
    collection: Collection,
    id: &str,
    fields: Value,
    entity: &'static str,
  ) -> PortalResult<T> {
    match self.store.update(collection, id, fields).await? {
      Some(record) => decode(collection, record),
      None => Err(PortalError::not_found(entity, id)),
    }
  }

  /// Count the outcome and log store failures; pass the result through.
  fn observe<T>(&self, operation: &'static str, result: PortalResult<T>) -> PortalResult<T> {
    let outcome = match &result {
      Ok(_) => Outcome::Ok,
      Err(PortalError::DuplicateName | PortalError::NotFound { .. }) => Outcome::Rejected,
      Err(e) => {
        warn!(operation, error = %e, "Gateway operation failed");
        Outcome::Failed
      }
    };
    if let Some(recorder) = &self.recorder {
      recorder.record(operation, outcome);
    }
    result
  }
}

/// Refuse a write when another team already holds `candidate`
/// (case-insensitively). `except_id` is the team being renamed.
fn name_guard(candidate: String, except_id: Option<String>) -> ConflictCheck {
  Box::new(move |records: &[Value]| {
    let teams: Vec<Team> = records
      .iter()
      .filter_map(|r| Team::deserialize(r).ok())
      .collect();
    rules::name_taken(&teams, &candidate, except_id.as_deref())
  })
}

fn new_id() -> String {
  Uuid::new_v4().to_string()
}

fn decode<T: DeserializeOwned>(collection: Collection, record: Value) -> PortalResult<T> {
  serde_json::from_value(record).map_err(|source| PortalError::InvalidRecord { collection, source })
}

fn encode<T: Serialize>(collection: Collection, value: &T) -> PortalResult<Value> {
  serde_json::to_value(value).map_err(|source| PortalError::InvalidRecord { collection, source })
}
