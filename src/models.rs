//! Typed records for the contact document.
//!
//! Field names serialize in camelCase so the on-disk document and API
//! payloads match the original `data.json` layout. Malformed records are
//! rejected at the write boundary (see [`NewContact::validate`]) rather than
//! deep inside the evaluators.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A person the user wants to keep in touch with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Calendar date; the year is only used for age display, never for
    /// matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    /// None means "never contacted", which is always overdue.
    #[serde(default)]
    pub last_contacted: Option<DateTime<Utc>>,
    pub circle_id: String,
    pub created_at: DateTime<Utc>,
}

/// A named grouping of contacts sharing a reminder cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub id: String,
    pub name: String,
    pub color: String,
    /// Days after which a contact in this circle becomes overdue. Minimum 1.
    pub reminder_days: u32,
}

/// App-wide settings. `last_check` is the only field the scheduler mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub notification_times: Vec<String>,
    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_times: vec!["09:00".to_string()],
            last_check: None,
            theme: default_theme(),
        }
    }
}

fn default_theme() -> String {
    "auto".to_string()
}

pub const MAX_NOTIFICATION_TIMES: usize = 4;

impl Settings {
    /// Validation messages for a settings update; empty means valid.
    /// Invariant: 1..=4 notification times, each a zero-padded 24h "HH:MM".
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.notification_times.is_empty() {
            errors.push("At least one notification time is required".to_string());
        }
        if self.notification_times.len() > MAX_NOTIFICATION_TIMES {
            errors.push(format!(
                "At most {} notification times are allowed",
                MAX_NOTIFICATION_TIMES
            ));
        }
        for time in &self.notification_times {
            if !is_valid_wall_clock(time) {
                errors.push(format!("Invalid notification time '{}'", time));
            }
        }
        errors
    }
}

fn is_valid_wall_clock(s: &str) -> bool {
    if let Ok(re) = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$") {
        re.is_match(s)
    } else {
        false
    }
}

/// The whole persisted document: what the data file holds and what
/// `DataStore::load_all` returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    pub contacts: Vec<Contact>,
    pub circles: Vec<Circle>,
    pub settings: Settings,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            contacts: Vec::new(),
            circles: default_circles(),
            settings: Settings::default(),
        }
    }
}

/// The five seeded circles. Fully user-editable afterwards.
pub fn default_circles() -> Vec<Circle> {
    [
        ("family", "Family", "#BF616A", 7),
        ("close-friends", "Close Friends", "#D08770", 14),
        ("friends", "Friends", "#A3BE8C", 30),
        ("colleagues", "Colleagues", "#5E81AC", 60),
        ("acquaintances", "Acquaintances", "#B48EAD", 90),
    ]
    .into_iter()
    .map(|(id, name, color, reminder_days)| Circle {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        reminder_days,
    })
    .collect()
}

/// Millisecond-derived contact id with a random suffix, so contacts created
/// within the same millisecond cannot collide.
pub fn new_contact_id(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.timestamp_millis(), &suffix[..8])
}

/// Write-side payload for contact creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    pub circle_id: String,
}

impl NewContact {
    /// Validation messages; empty means valid. `today` bounds the birthday.
    pub fn validate(&self, today: NaiveDate) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        if self.circle_id.trim().is_empty() {
            errors.push("Circle is required".to_string());
        }
        if let Some(email) = self.email.as_deref() {
            if !email.trim().is_empty() && !is_valid_email(email) {
                errors.push("Invalid email format".to_string());
            }
        }
        if let Some(phone) = self.phone.as_deref() {
            if !phone.trim().is_empty() && !is_valid_phone(phone) {
                errors.push("Invalid phone number format".to_string());
            }
        }
        if let Some(birthday) = self.birthday {
            if birthday > today {
                errors.push("Birthday cannot be in the future".to_string());
            }
        }
        errors
    }

    /// Materialize the contact. New contacts are stamped as just-contacted,
    /// matching the original server behavior.
    pub fn into_contact(self, now: DateTime<Utc>) -> Contact {
        Contact {
            id: new_contact_id(now),
            name: self.name.trim().to_string(),
            phone: normalize_optional(self.phone),
            email: normalize_optional(self.email),
            notes: normalize_optional(self.notes),
            birthday: self.birthday,
            last_contacted: Some(now),
            circle_id: self.circle_id,
            created_at: now,
        }
    }
}

/// Write-side payload for contact edits. `Some` replaces the stored value;
/// an empty string clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub circle_id: Option<String>,
    #[serde(default)]
    pub last_contacted: Option<DateTime<Utc>>,
}

impl ContactUpdate {
    pub fn validate(&self, today: NaiveDate) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(name) = self.name.as_deref() {
            if name.trim().is_empty() {
                errors.push("Name is required".to_string());
            }
        }
        if let Some(circle_id) = self.circle_id.as_deref() {
            if circle_id.trim().is_empty() {
                errors.push("Circle is required".to_string());
            }
        }
        if let Some(email) = self.email.as_deref() {
            if !email.trim().is_empty() && !is_valid_email(email) {
                errors.push("Invalid email format".to_string());
            }
        }
        if let Some(phone) = self.phone.as_deref() {
            if !phone.trim().is_empty() && !is_valid_phone(phone) {
                errors.push("Invalid phone number format".to_string());
            }
        }
        if let Some(birthday) = self.birthday {
            if birthday > today {
                errors.push("Birthday cannot be in the future".to_string());
            }
        }
        errors
    }

    /// Merge into an existing record, original-server style: supplied fields
    /// replace stored ones.
    pub fn apply(self, contact: &mut Contact) {
        if let Some(name) = self.name {
            contact.name = name.trim().to_string();
        }
        if let Some(phone) = self.phone {
            contact.phone = normalize_optional(Some(phone));
        }
        if let Some(email) = self.email {
            contact.email = normalize_optional(Some(email));
        }
        if let Some(notes) = self.notes {
            contact.notes = normalize_optional(Some(notes));
        }
        if let Some(birthday) = self.birthday {
            contact.birthday = Some(birthday);
        }
        if let Some(circle_id) = self.circle_id {
            contact.circle_id = circle_id;
        }
        if let Some(last_contacted) = self.last_contacted {
            contact.last_contacted = Some(last_contacted);
        }
    }
}

/// Write-side payload for circle edits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub reminder_days: Option<u32>,
}

impl CircleUpdate {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(name) = self.name.as_deref() {
            if name.trim().is_empty() {
                errors.push("Circle name is required".to_string());
            }
        }
        if let Some(days) = self.reminder_days {
            if days < 1 {
                errors.push("Reminder interval must be at least 1 day".to_string());
            }
        }
        errors
    }

    pub fn apply(self, circle: &mut Circle) {
        if let Some(name) = self.name {
            circle.name = name.trim().to_string();
        }
        if let Some(color) = self.color {
            circle.color = color;
        }
        if let Some(days) = self.reminder_days {
            circle.reminder_days = days;
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_valid_email(email: &str) -> bool {
    if let Ok(re) = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$") {
        re.is_match(email)
    } else {
        false
    }
}

fn is_valid_phone(phone: &str) -> bool {
    if let Ok(re) = Regex::new(r"^[\d\s\-\+\(\)]+$") {
        re.is_match(phone)
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft(name: &str, circle_id: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            phone: None,
            email: None,
            notes: None,
            birthday: None,
            circle_id: circle_id.to_string(),
        }
    }

    #[test]
    fn test_default_circles_seed() {
        let circles = default_circles();
        assert_eq!(circles.len(), 5);
        assert_eq!(circles[0].id, "family");
        assert_eq!(circles[0].reminder_days, 7);
        assert_eq!(circles[4].id, "acquaintances");
        assert_eq!(circles[4].reminder_days, 90);
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.notification_times, vec!["09:00".to_string()]);
        assert!(settings.last_check.is_none());
        assert_eq!(settings.theme, "auto");
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings {
            notification_times: vec![],
            ..Settings::default()
        };
        assert!(!settings.validate().is_empty());

        settings.notification_times = vec!["9:00".to_string()];
        assert!(!settings.validate().is_empty(), "must be zero-padded");

        settings.notification_times = vec!["24:00".to_string()];
        assert!(!settings.validate().is_empty());

        settings.notification_times = vec![
            "00:00".to_string(),
            "09:30".to_string(),
            "13:05".to_string(),
            "23:59".to_string(),
        ];
        assert!(settings.validate().is_empty());

        settings.notification_times.push("08:00".to_string());
        assert!(!settings.validate().is_empty(), "at most 4 times");
    }

    #[test]
    fn test_new_contact_validation() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();

        assert!(draft("Ann", "family").validate(today).is_empty());
        assert!(!draft("   ", "family").validate(today).is_empty());
        assert!(!draft("Ann", "").validate(today).is_empty());

        let mut c = draft("Ann", "family");
        c.email = Some("not-an-email".to_string());
        assert_eq!(c.validate(today), vec!["Invalid email format"]);
        c.email = Some("ann@example.com".to_string());
        assert!(c.validate(today).is_empty());

        c.phone = Some("call me".to_string());
        assert_eq!(c.validate(today), vec!["Invalid phone number format"]);
        c.phone = Some("+1 (555) 123-4567".to_string());
        assert!(c.validate(today).is_empty());

        c.birthday = NaiveDate::from_ymd_opt(2027, 1, 1);
        assert_eq!(c.validate(today), vec!["Birthday cannot be in the future"]);
    }

    #[test]
    fn test_into_contact_stamps_creation() {
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap();
        let mut c = draft("  Ann  ", "family");
        c.phone = Some("   ".to_string());
        let contact = c.into_contact(now);
        assert_eq!(contact.name, "Ann");
        assert!(contact.phone.is_none(), "blank optional fields are dropped");
        assert_eq!(contact.last_contacted, Some(now));
        assert_eq!(contact.created_at, now);
        assert!(contact.id.starts_with(&now.timestamp_millis().to_string()));
    }

    #[test]
    fn test_contact_ids_unique_within_millisecond() {
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(new_contact_id(now)));
        }
    }

    #[test]
    fn test_update_merge() {
        let now = Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap();
        let mut contact = draft("Ann", "family").into_contact(now);
        contact.email = Some("ann@example.com".to_string());

        let update = ContactUpdate {
            name: Some("Ann B".to_string()),
            email: Some("".to_string()),
            circle_id: Some("friends".to_string()),
            ..ContactUpdate::default()
        };
        update.apply(&mut contact);

        assert_eq!(contact.name, "Ann B");
        assert!(contact.email.is_none(), "empty string clears the field");
        assert_eq!(contact.circle_id, "friends");
        assert_eq!(contact.last_contacted, Some(now), "untouched fields survive");
    }

    #[test]
    fn test_circle_update_validation() {
        let update = CircleUpdate {
            reminder_days: Some(0),
            ..CircleUpdate::default()
        };
        assert!(!update.validate().is_empty());

        let update = CircleUpdate {
            reminder_days: Some(1),
            ..CircleUpdate::default()
        };
        assert!(update.validate().is_empty());
    }

    #[test]
    fn test_document_round_trips_camel_case() {
        let data = AppData::default();
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("notificationTimes"));
        assert!(json.contains("reminderDays"));
        assert!(json.contains("lastCheck"));
        let back: AppData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_contact_accepts_legacy_document_fields() {
        // Documents written by the original app carry camelCase fields and
        // may omit optional ones entirely.
        let contact: Contact = serde_json::from_str(
            r#"{
                "id": "1700000000000-ab12cd34",
                "name": "Ann",
                "birthday": "1990-03-15",
                "lastContacted": "2026-08-01T09:00:00Z",
                "circleId": "family",
                "createdAt": "2026-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(contact.circle_id, "family");
        assert_eq!(contact.birthday, NaiveDate::from_ymd_opt(1990, 3, 15));
        assert!(contact.phone.is_none());
    }
}
