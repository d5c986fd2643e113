//! Overdue and birthday evaluation over the contact set.
//!
//! All functions here are pure: they never touch the clock directly (callers
//! pass the instant) and never fail. Anomalous records degrade to
//! conservative answers: a never-contacted contact is always due, a contact
//! whose circle is missing is never due.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::models::{Circle, Contact};
use crate::time_utils::{days_since_at, is_birthday_today_at};

/// Overdue determination for a single contact against its circle.
///
/// Never-contacted contacts are due unconditionally. A missing circle fails
/// open: the contact is excluded rather than evaluated against a dangling
/// reference. The threshold is inclusive: exactly `reminder_days` elapsed
/// counts as overdue.
pub fn is_overdue_at(now: DateTime<Utc>, contact: &Contact, circle: Option<&Circle>) -> bool {
    if contact.last_contacted.is_none() {
        return true;
    }
    let Some(circle) = circle else {
        return false;
    };
    match days_since_at(now, contact.last_contacted) {
        Some(days) => days >= i64::from(circle.reminder_days),
        None => false,
    }
}

/// Same-day birthday match; no circle dependency.
pub fn is_birthday_match_at(today: NaiveDate, contact: &Contact) -> bool {
    is_birthday_today_at(today, contact.birthday)
}

pub fn circle_by_id<'a>(circles: &'a [Circle], id: &str) -> Option<&'a Circle> {
    circles.iter().find(|c| c.id == id)
}

/// All currently overdue contacts, in input order.
pub fn collect_overdue_at(
    now: DateTime<Utc>,
    contacts: &[Contact],
    circles: &[Circle],
) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|c| is_overdue_at(now, c, circle_by_id(circles, &c.circle_id)))
        .cloned()
        .collect()
}

pub fn collect_overdue(contacts: &[Contact], circles: &[Circle]) -> Vec<Contact> {
    collect_overdue_at(Utc::now(), contacts, circles)
}

/// All contacts whose birthday falls on `today`, in input order.
pub fn collect_birthdays_at(today: NaiveDate, contacts: &[Contact]) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|c| is_birthday_match_at(today, c))
        .cloned()
        .collect()
}

pub fn collect_birthdays(contacts: &[Contact]) -> Vec<Contact> {
    collect_birthdays_at(Local::now().date_naive(), contacts)
}
