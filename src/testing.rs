//! In-memory fakes shared across unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{AppData, Circle, CircleUpdate, Contact, ContactUpdate, NewContact, Settings};
use crate::traits::{
    DataStore, NotificationHandle, NotificationPresenter, PermissionProvider, PresentOptions,
};
use crate::types::PermissionStatus;

pub fn contact_named(name: &str) -> Contact {
    Contact {
        id: format!("id-{}", name),
        name: name.to_string(),
        phone: None,
        email: None,
        notes: None,
        birthday: None,
        last_contacted: None,
        circle_id: "family".to_string(),
        created_at: Utc::now(),
    }
}

/// DataStore over a plain mutex, mirroring the file store's semantics.
pub struct MemoryStore {
    data: Mutex<AppData>,
    fail: bool,
}

impl MemoryStore {
    pub fn new(data: AppData) -> Self {
        Self {
            data: Mutex::new(data),
            fail: false,
        }
    }

    /// A store whose every operation errors, for failure-path tests.
    pub fn failing() -> Self {
        Self {
            data: Mutex::new(AppData::default()),
            fail: true,
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn load_all(&self) -> anyhow::Result<AppData> {
        self.check()?;
        Ok(self.data.lock().unwrap().clone())
    }

    async fn save_settings(&self, settings: &Settings) -> anyhow::Result<()> {
        self.check()?;
        self.data.lock().unwrap().settings = settings.clone();
        Ok(())
    }

    async fn create_contact(&self, draft: NewContact) -> anyhow::Result<Contact> {
        self.check()?;
        let contact = draft.into_contact(Utc::now());
        self.data.lock().unwrap().contacts.push(contact.clone());
        Ok(contact)
    }

    async fn update_contact(
        &self,
        id: &str,
        update: ContactUpdate,
    ) -> anyhow::Result<Option<Contact>> {
        self.check()?;
        let mut data = self.data.lock().unwrap();
        let Some(contact) = data.contacts.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        update.apply(contact);
        Ok(Some(contact.clone()))
    }

    async fn delete_contact(&self, id: &str) -> anyhow::Result<bool> {
        self.check()?;
        let mut data = self.data.lock().unwrap();
        let before = data.contacts.len();
        data.contacts.retain(|c| c.id != id);
        Ok(data.contacts.len() != before)
    }

    async fn mark_contacted(&self, id: &str) -> anyhow::Result<Option<Contact>> {
        self.check()?;
        let mut data = self.data.lock().unwrap();
        let Some(contact) = data.contacts.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        contact.last_contacted = Some(Utc::now());
        Ok(Some(contact.clone()))
    }

    async fn update_circle(
        &self,
        id: &str,
        update: CircleUpdate,
    ) -> anyhow::Result<Option<Circle>> {
        self.check()?;
        let mut data = self.data.lock().unwrap();
        let Some(circle) = data.circles.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        update.apply(circle);
        Ok(Some(circle.clone()))
    }

    async fn replace_all(&self, data: AppData) -> anyhow::Result<()> {
        self.check()?;
        *self.data.lock().unwrap() = data;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PresentCall {
    pub title: String,
    pub body: String,
    pub tag: String,
}

/// Presenter that records calls instead of showing anything.
pub struct MockPresenter {
    calls: Mutex<Vec<PresentCall>>,
    fail: bool,
}

impl MockPresenter {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Records the call, then fails, like a dead notification daemon.
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<PresentCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl NotificationPresenter for MockPresenter {
    fn present(
        &self,
        title: &str,
        body: &str,
        opts: &PresentOptions,
    ) -> anyhow::Result<NotificationHandle> {
        self.calls.lock().unwrap().push(PresentCall {
            title: title.to_string(),
            body: body.to_string(),
            tag: opts.tag.clone(),
        });
        if self.fail {
            anyhow::bail!("notification service unavailable");
        }
        Ok(NotificationHandle::new(title, body, &opts.tag))
    }
}

/// Permission provider pinned to one status.
pub struct StaticPermissions {
    status: PermissionStatus,
}

impl StaticPermissions {
    pub fn new(status: PermissionStatus) -> Self {
        Self { status }
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissions {
    fn current_permission(&self) -> PermissionStatus {
        self.status
    }

    async fn request_permission(&self) -> anyhow::Result<PermissionStatus> {
        Ok(self.status)
    }
}
