//! Notification dispatch: one batched desktop notification per category.

use std::sync::Arc;

use async_trait::async_trait;
use notify_rust::Notification;
use tracing::{debug, error, info};

use crate::models::Contact;
use crate::traits::{NotificationHandle, NotificationPresenter, PermissionProvider, PresentOptions};
use crate::types::{NotificationCategory, PermissionStatus};

/// How many display names a notification body lists before collapsing the
/// rest into " and N more".
const MAX_NAMED_CONTACTS: usize = 3;

/// First `MAX_NAMED_CONTACTS` names joined by ", ", then " and N more" when
/// the set is larger. Bounds the body length regardless of contact count.
pub fn recipient_summary(contacts: &[Contact]) -> String {
    let names: Vec<&str> = contacts
        .iter()
        .take(MAX_NAMED_CONTACTS)
        .map(|c| c.name.as_str())
        .collect();
    let mut summary = names.join(", ");
    if contacts.len() > MAX_NAMED_CONTACTS {
        summary.push_str(&format!(" and {} more", contacts.len() - MAX_NAMED_CONTACTS));
    }
    summary
}

/// Turns a non-empty overdue/birthday set into at most one notification,
/// gated on permission state. Presenter failures are swallowed here; the
/// scheduler must never see them.
pub struct NotificationDispatcher {
    permissions: Arc<dyn PermissionProvider>,
    presenter: Arc<dyn NotificationPresenter>,
}

impl NotificationDispatcher {
    pub fn new(
        permissions: Arc<dyn PermissionProvider>,
        presenter: Arc<dyn NotificationPresenter>,
    ) -> Self {
        Self {
            permissions,
            presenter,
        }
    }

    /// One batched notification for the category, or None when the set is
    /// empty, permission is not granted, or presentation fails.
    pub fn dispatch(
        &self,
        category: NotificationCategory,
        contacts: &[Contact],
    ) -> Option<NotificationHandle> {
        if contacts.is_empty() {
            return None;
        }
        if self.permissions.current_permission() != PermissionStatus::Granted {
            debug!(
                category = category.as_str(),
                permission = self.permissions.current_permission().as_str(),
                "Skipping dispatch, notification permission not granted"
            );
            return None;
        }

        let summary = recipient_summary(contacts);
        let (title, body) = match category {
            NotificationCategory::Overdue => (
                "Nudge Reminder".to_string(),
                format!("Time to reach out to: {}", summary),
            ),
            NotificationCategory::Birthday => (
                "🎂 Birthday Reminder!".to_string(),
                if contacts.len() == 1 {
                    format!("It's {}", summary)
                } else {
                    format!("Birthdays today: {}", summary)
                },
            ),
        };

        let opts = PresentOptions {
            tag: category.tag().to_string(),
            require_interaction: true,
        };
        match self.presenter.present(&title, &body, &opts) {
            Ok(handle) => {
                info!(
                    category = category.as_str(),
                    count = contacts.len(),
                    "Dispatched notification"
                );
                Some(handle)
            }
            Err(e) => {
                error!(
                    category = category.as_str(),
                    error = %e,
                    "Failed to present notification"
                );
                None
            }
        }
    }

    /// Ad-hoc test notification, exposed through the API for users checking
    /// their notification setup.
    pub fn dispatch_test(&self, kind: &str, message: &str) -> Option<NotificationHandle> {
        if self.permissions.current_permission() != PermissionStatus::Granted {
            return None;
        }
        let title = match kind {
            "daily" => "Nudge Test - Daily Reminder",
            "birthday" => "🎂 Nudge Test - Birthday Reminder",
            "overdue" => "Nudge Test - Overdue Contacts",
            _ => "Nudge Test",
        };
        let opts = PresentOptions {
            tag: format!("nudge-test-{}", uuid::Uuid::new_v4().simple()),
            require_interaction: false,
        };
        match self.presenter.present(title, message, &opts) {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!(error = %e, "Failed to present test notification");
                None
            }
        }
    }
}

/// Desktop presenter backed by the platform notification service.
pub struct DesktopPresenter;

impl NotificationPresenter for DesktopPresenter {
    fn present(
        &self,
        title: &str,
        body: &str,
        opts: &PresentOptions,
    ) -> anyhow::Result<NotificationHandle> {
        let mut notification = Notification::new();
        notification
            .summary(title)
            .body(body)
            .appname("nudge")
            .icon("address-book-new");
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            if opts.require_interaction {
                notification.urgency(notify_rust::Urgency::Critical);
            }
        }
        notification.show()?;
        Ok(NotificationHandle::new(title, body, &opts.tag))
    }
}

/// Permission provider driven by configuration: desktop environments have no
/// runtime permission prompt, so "enabled" in config.toml is the grant.
pub struct ConfigPermissions {
    enabled: bool,
}

impl ConfigPermissions {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl PermissionProvider for ConfigPermissions {
    fn current_permission(&self) -> PermissionStatus {
        if self.enabled {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn request_permission(&self) -> anyhow::Result<PermissionStatus> {
        Ok(self.current_permission())
    }
}
