//! Email view logic: reconciling the recent and starred listings, category
//! filtering, and sender header helpers.

#[cfg(test)]
#[path = "email_merge_test.rs"]
mod email_merge_test;

use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};

use crate::net::types::Email;

/// Merge the recent and starred listings into one list.
///
/// An email in both lists appears once, carrying the union of both copies'
/// labels (and the starred copy's body when the recent one has none).
/// Starred-only emails are appended. The result is sorted unread first, then
/// starred, then newest first; ties keep input order and undated emails sink.
#[must_use]
pub fn merge_email_lists(recent: &[Email], starred: &[Email]) -> Vec<Email> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged: Vec<Email> = Vec::with_capacity(recent.len() + starred.len());

    for email in recent {
        if !seen.insert(email.id.as_str()) {
            continue;
        }
        let mut email = email.clone();
        if let Some(copy) = starred.iter().find(|s| s.id == email.id) {
            email.union_labels(&copy.labels);
            if email.body.is_none() {
                email.body.clone_from(&copy.body);
            }
        }
        merged.push(email);
    }
    for email in starred {
        if seen.insert(email.id.as_str()) {
            merged.push(email.clone());
        }
    }

    merged.sort_by_cached_key(|e| (!e.is_unread(), !e.is_starred(), Reverse(parse_email_date(&e.date))));
    merged
}

/// Parse an RFC 2822 `Date` header (trailing `(comment)` allowed) or an
/// RFC 3339 timestamp.
#[must_use]
pub fn parse_email_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    let header = match trimmed.rfind(" (") {
        Some(idx) if trimmed.ends_with(')') => &trimmed[..idx],
        _ => trimmed,
    };
    DateTime::parse_from_rfc2822(header)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .ok()
}

/// Which email categories are shown.
///
/// An email is unread, else starred, else read; the first matching category
/// decides visibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmailFilter {
    pub show_unread: bool,
    pub show_starred: bool,
    pub show_read: bool,
}

impl Default for EmailFilter {
    fn default() -> Self {
        Self { show_unread: true, show_starred: true, show_read: true }
    }
}

impl EmailFilter {
    #[must_use]
    pub fn allows(&self, email: &Email) -> bool {
        if email.is_unread() {
            self.show_unread
        } else if email.is_starred() {
            self.show_starred
        } else {
            self.show_read
        }
    }
}

#[must_use]
pub fn filter_emails(emails: Vec<Email>, filter: EmailFilter) -> Vec<Email> {
    emails.into_iter().filter(|e| filter.allows(e)).collect()
}

/// Display name from a `From` header: the text before `<`, unquoted.
/// Falls back to the address when there is no name.
#[must_use]
pub fn sender_name(from: &str) -> String {
    let name = from.split('<').next().unwrap_or_default().trim().trim_matches('"').trim();
    if name.is_empty() {
        sender_address(from).unwrap_or_else(|| from.trim().to_owned())
    } else {
        name.to_owned()
    }
}

/// Address between `<` and `>`, if present.
#[must_use]
pub fn sender_address(from: &str) -> Option<String> {
    let start = from.find('<')? + 1;
    let len = from[start..].find('>')?;
    let addr = from[start..start + len].trim();
    (!addr.is_empty()).then(|| addr.to_owned())
}

/// Web link to the message in Gmail.
#[must_use]
pub fn gmail_url(id: &str) -> String {
    format!("https://mail.google.com/mail/u/0/#inbox/{id}")
}
