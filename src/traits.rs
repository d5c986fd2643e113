//! Collaborator seams for the reminder core.
//!
//! The store, permission source, and notification presenter are injected as
//! trait objects so tests can substitute in-memory fakes and so no
//! module-level singleton state exists anywhere in the crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{AppData, Circle, CircleUpdate, Contact, ContactUpdate, NewContact, Settings};
use crate::types::PermissionStatus;

/// Persistence contract over the single contact document.
///
/// The scheduler only ever calls `load_all` and `save_settings`; the rest of
/// the surface serves the API layer. Writes are serialized internally, so
/// concurrent settings edits resolve last-writer-wins.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn load_all(&self) -> anyhow::Result<AppData>;

    /// Partial update: replaces the settings section, leaving contacts and
    /// circles untouched.
    async fn save_settings(&self, settings: &Settings) -> anyhow::Result<()>;

    async fn create_contact(&self, draft: NewContact) -> anyhow::Result<Contact>;

    /// Merge-updates a contact. Ok(None) when the id is unknown.
    async fn update_contact(
        &self,
        id: &str,
        update: ContactUpdate,
    ) -> anyhow::Result<Option<Contact>>;

    /// Returns whether a contact was actually removed.
    async fn delete_contact(&self, id: &str) -> anyhow::Result<bool>;

    /// Stamps `lastContacted` with the current time. Ok(None) when unknown.
    async fn mark_contacted(&self, id: &str) -> anyhow::Result<Option<Contact>>;

    async fn update_circle(
        &self,
        id: &str,
        update: CircleUpdate,
    ) -> anyhow::Result<Option<Circle>>;

    /// Legacy whole-document replacement (the `/api/data` surface).
    async fn replace_all(&self, data: AppData) -> anyhow::Result<()>;
}

/// Source of truth for notification permission.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    fn current_permission(&self) -> PermissionStatus;

    async fn request_permission(&self) -> anyhow::Result<PermissionStatus>;
}

/// Thin wrapper over the platform notification capability. May fail; the
/// dispatcher catches and logs.
pub trait NotificationPresenter: Send + Sync {
    fn present(
        &self,
        title: &str,
        body: &str,
        opts: &PresentOptions,
    ) -> anyhow::Result<NotificationHandle>;
}

/// Presentation knobs the dispatcher sets per category.
#[derive(Debug, Clone, Default)]
pub struct PresentOptions {
    /// Coalescing tag, e.g. "nudge-overdue".
    pub tag: String,
    /// Keep the notification on screen until acted on.
    pub require_interaction: bool,
}

/// Receipt for a presented (or about-to-be-presented) notification.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationHandle {
    pub id: String,
    pub title: String,
    pub body: String,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

impl NotificationHandle {
    pub fn new(title: &str, body: &str, tag: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            tag: tag.to_string(),
            created_at: Utc::now(),
        }
    }
}
