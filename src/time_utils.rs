//! Pure time helpers for reminder evaluation.
//!
//! Day counting is elapsed-duration based, not calendar-boundary based:
//! crossing midnight does not by itself increment the count, and exactly 24
//! elapsed hours does. Time-dependent functions take an explicit instant in
//! their `_at` form; plain forms delegate with the current time.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};

const SECS_PER_DAY: i64 = 86_400;

/// Whole days between `now` and `t` as `floor(|now - t| / 86400s)`.
/// None when there is no timestamp.
pub fn days_since_at(now: DateTime<Utc>, t: Option<DateTime<Utc>>) -> Option<i64> {
    let t = t?;
    Some((now - t).num_seconds().abs() / SECS_PER_DAY)
}

/// Month/day comparison only; the year is ignored. False without a birthday.
pub fn is_birthday_today_at(today: NaiveDate, birthday: Option<NaiveDate>) -> bool {
    match birthday {
        Some(b) => b.month() == today.month() && b.day() == today.day(),
        None => false,
    }
}

/// Age in whole years, decremented when the birthday month/day has not yet
/// occurred this calendar year.
pub fn age_in_years_at(today: NaiveDate, birthday: Option<NaiveDate>) -> Option<i32> {
    let b = birthday?;
    let mut age = today.year() - b.year();
    if (today.month(), today.day()) < (b.month(), b.day()) {
        age -= 1;
    }
    Some(age)
}

pub fn age_in_years(birthday: Option<NaiveDate>) -> Option<i32> {
    age_in_years_at(Local::now().date_naive(), birthday)
}

/// Zero-padded wall-clock time for an instant, e.g. "09:05".
pub fn wall_clock_hhmm(now: DateTime<Local>) -> String {
    now.format("%H:%M").to_string()
}

/// Whether `now` exactly matches one of the configured "HH:MM" entries.
/// No tolerance window: string equality only.
pub fn is_notification_time(now: &str, times: &[String]) -> bool {
    times.iter().any(|t| t == now)
}

/// Duplicate-suppression predicate: true when no previous check exists or at
/// least `window_mins` minutes have elapsed since it.
pub fn should_run_check_at(
    now: DateTime<Utc>,
    last_check: Option<DateTime<Utc>>,
    window_mins: i64,
) -> bool {
    match last_check {
        None => true,
        Some(last) => (now - last).num_seconds().abs() >= window_mins * 60,
    }
}

/// Human label for a last-contacted timestamp: "Never", "Today",
/// "Yesterday", then day/week/month/year buckets with plural handling.
pub fn relative_time_label_at(now: DateTime<Utc>, t: Option<DateTime<Utc>>) -> String {
    let days = match days_since_at(now, t) {
        None => return "Never".to_string(),
        Some(d) => d,
    };
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{} days ago", d),
        d if d < 30 => plural_label(d / 7, "week"),
        d if d < 365 => plural_label(d / 30, "month"),
        d => plural_label(d / 365, "year"),
    }
}

pub fn relative_time_label(t: Option<DateTime<Utc>>) -> String {
    relative_time_label_at(Utc::now(), t)
}

fn plural_label(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
