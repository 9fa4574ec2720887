//! Email-derived display names and session lifetime.

use chrono::{DateTime, Months, Utc};

const SESSION_MONTHS: u32 = 6;

/// Derives a display name from the local part of an email address.
///
/// `nicolas_balbontin@trimble.com` → `Nicolas`, `john.doe@example.com` → `John`.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let name = local.split(['.', '_', '-']).next().unwrap_or_default();

    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn session_expiry(login: DateTime<Utc>) -> DateTime<Utc> {
    login
        .checked_add_months(Months::new(SESSION_MONTHS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// True if `last_login` lies within the last six months.
pub fn is_session_valid(last_login: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match now.checked_sub_months(Months::new(SESSION_MONTHS)) {
        Some(cutoff) => last_login > cutoff,
        None => true,
    }
}
