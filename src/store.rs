//! JSON file persistence for the contact document.
//!
//! One document, one file. Every write serializes the whole document to a
//! sibling temp file and renames it into place, so a crash mid-write never
//! leaves a truncated document behind. A single async mutex covers each
//! read-modify-write cycle.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{AppData, Circle, CircleUpdate, Contact, ContactUpdate, NewContact, Settings};
use crate::traits::DataStore;

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store, seeding a fresh document with the default circles and
    /// settings when the file does not exist yet.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating data directory {}", parent.display()))?;
            }
        }
        let store = Self {
            path,
            lock: Mutex::new(()),
        };
        if tokio::fs::try_exists(&store.path).await? {
            // Fail fast on an unreadable document instead of at first tick.
            store.read_document().await?;
        } else {
            info!(path = %store.path.display(), "Seeding new data file");
            store.write_document(&AppData::default()).await?;
        }
        Ok(store)
    }

    async fn read_document(&self) -> anyhow::Result<AppData> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    async fn write_document(&self, data: &AppData) -> anyhow::Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serialized)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl DataStore for JsonFileStore {
    async fn load_all(&self) -> anyhow::Result<AppData> {
        let _guard = self.lock.lock().await;
        self.read_document().await
    }

    async fn save_settings(&self, settings: &Settings) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut data = self.read_document().await?;
        data.settings = settings.clone();
        self.write_document(&data).await
    }

    async fn create_contact(&self, draft: NewContact) -> anyhow::Result<Contact> {
        let _guard = self.lock.lock().await;
        let mut data = self.read_document().await?;
        let contact = draft.into_contact(Utc::now());
        data.contacts.push(contact.clone());
        self.write_document(&data).await?;
        Ok(contact)
    }

    async fn update_contact(
        &self,
        id: &str,
        update: ContactUpdate,
    ) -> anyhow::Result<Option<Contact>> {
        let _guard = self.lock.lock().await;
        let mut data = self.read_document().await?;
        let Some(contact) = data.contacts.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        update.apply(contact);
        let updated = contact.clone();
        self.write_document(&data).await?;
        Ok(Some(updated))
    }

    async fn delete_contact(&self, id: &str) -> anyhow::Result<bool> {
        let _guard = self.lock.lock().await;
        let mut data = self.read_document().await?;
        let before = data.contacts.len();
        data.contacts.retain(|c| c.id != id);
        if data.contacts.len() == before {
            return Ok(false);
        }
        self.write_document(&data).await?;
        Ok(true)
    }

    async fn mark_contacted(&self, id: &str) -> anyhow::Result<Option<Contact>> {
        let _guard = self.lock.lock().await;
        let mut data = self.read_document().await?;
        let Some(contact) = data.contacts.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        contact.last_contacted = Some(Utc::now());
        let updated = contact.clone();
        self.write_document(&data).await?;
        Ok(Some(updated))
    }

    async fn update_circle(
        &self,
        id: &str,
        update: CircleUpdate,
    ) -> anyhow::Result<Option<Circle>> {
        let _guard = self.lock.lock().await;
        let mut data = self.read_document().await?;
        let Some(circle) = data.circles.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        update.apply(circle);
        let updated = circle.clone();
        self.write_document(&data).await?;
        Ok(Some(updated))
    }

    async fn replace_all(&self, data: AppData) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        self.write_document(&data).await
    }
}
