use serde::{Deserialize, Serialize};

/// Notification permission state, mirroring the platform permission model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Default,
    Unsupported,
}

impl PermissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
            PermissionStatus::Default => "default",
            PermissionStatus::Unsupported => "unsupported",
        }
    }
}

/// The two reminder categories. Each gets at most one batched notification
/// per scheduler trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Overdue,
    Birthday,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Overdue => "overdue",
            NotificationCategory::Birthday => "birthday",
        }
    }

    /// Stable notification tag so the platform can coalesce repeats.
    pub fn tag(&self) -> &'static str {
        match self {
            NotificationCategory::Overdue => "nudge-overdue",
            NotificationCategory::Birthday => "nudge-birthday",
        }
    }
}
