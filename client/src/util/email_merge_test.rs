use super::*;
use crate::net::types::{LABEL_STARRED, LABEL_UNREAD};
use crate::test_support::sample_email;

fn ids(emails: &[Email]) -> Vec<&str> {
    emails.iter().map(|e| e.id.as_str()).collect()
}

const MON: &str = "Mon, 04 Mar 2024 09:00:00 +0000";
const TUE: &str = "Tue, 05 Mar 2024 09:00:00 +0000";
const WED: &str = "Wed, 06 Mar 2024 09:00:00 +0000";

// =============================================================
// merge_email_lists
// =============================================================

#[test]
fn same_id_in_both_lists_appears_once_with_label_union() {
    let recent = vec![sample_email("m1", MON, &["INBOX", LABEL_UNREAD])];
    let starred = vec![sample_email("m1", MON, &[LABEL_STARRED, "IMPORTANT"])];
    let merged = merge_email_lists(&recent, &starred);
    assert_eq!(merged.len(), 1);
    for label in ["INBOX", LABEL_UNREAD, LABEL_STARRED, "IMPORTANT"] {
        assert!(merged[0].has_label(label), "missing {label}");
    }
}

#[test]
fn starred_only_emails_are_included() {
    let recent = vec![sample_email("r", TUE, &[])];
    let starred = vec![sample_email("s", MON, &[LABEL_STARRED])];
    let merged = merge_email_lists(&recent, &starred);
    assert_eq!(ids(&merged), vec!["s", "r"]);
}

#[test]
fn starred_copy_supplies_missing_body() {
    let recent = vec![sample_email("m1", MON, &[])];
    let mut copy = sample_email("m1", MON, &[LABEL_STARRED]);
    copy.body = Some("<p>full</p>".to_owned());
    let merged = merge_email_lists(&recent, &[copy]);
    assert_eq!(merged[0].body.as_deref(), Some("<p>full</p>"));
}

#[test]
fn sorts_unread_then_starred_then_newest() {
    let recent = vec![
        sample_email("read-old", MON, &[]),
        sample_email("starred", MON, &[LABEL_STARRED]),
        sample_email("read-new", WED, &[]),
        sample_email("unread-old", MON, &[LABEL_UNREAD]),
        sample_email("unread-new", TUE, &[LABEL_UNREAD]),
    ];
    let merged = merge_email_lists(&recent, &[]);
    assert_eq!(ids(&merged), vec!["unread-new", "unread-old", "starred", "read-new", "read-old"]);
}

#[test]
fn equal_keys_keep_input_order_and_undated_sink() {
    let recent = vec![
        sample_email("undated", "not a date", &[]),
        sample_email("first", MON, &[]),
        sample_email("second", MON, &[]),
    ];
    let merged = merge_email_lists(&recent, &[]);
    assert_eq!(ids(&merged), vec!["first", "second", "undated"]);
}

#[test]
fn duplicate_recent_ids_are_collapsed() {
    let recent = vec![sample_email("m1", MON, &[]), sample_email("m1", TUE, &[])];
    assert_eq!(merge_email_lists(&recent, &[]).len(), 1);
}

// =============================================================
// Dates
// =============================================================

#[test]
fn parse_email_date_accepts_header_forms() {
    assert!(parse_email_date(MON).is_some());
    assert!(parse_email_date("Mon, 4 Mar 2024 09:00:00 +0000 (UTC)").is_some());
    assert!(parse_email_date("2024-03-04T09:00:00Z").is_some());
    assert!(parse_email_date("yesterday").is_none());
}

// =============================================================
// Filtering
// =============================================================

#[test]
fn filter_uses_first_matching_category() {
    let emails = vec![
        sample_email("unread-starred", MON, &[LABEL_UNREAD, LABEL_STARRED]),
        sample_email("starred", MON, &[LABEL_STARRED]),
        sample_email("read", MON, &[]),
    ];
    let only_starred = EmailFilter { show_unread: false, show_starred: true, show_read: false };
    assert_eq!(ids(&filter_emails(emails.clone(), only_starred)), vec!["starred"]);

    let only_unread = EmailFilter { show_unread: true, show_starred: false, show_read: false };
    assert_eq!(ids(&filter_emails(emails.clone(), only_unread)), vec!["unread-starred"]);

    assert_eq!(filter_emails(emails.clone(), EmailFilter::default()).len(), 3);
}

// =============================================================
// Sender helpers
// =============================================================

#[test]
fn sender_name_and_address_split_header() {
    assert_eq!(sender_name("Ada Lovelace <ada@example.com>"), "Ada Lovelace");
    assert_eq!(sender_name("\"Lovelace, Ada\" <ada@example.com>"), "Lovelace, Ada");
    assert_eq!(sender_address("Ada Lovelace <ada@example.com>").as_deref(), Some("ada@example.com"));
}

#[test]
fn sender_name_falls_back_to_address() {
    assert_eq!(sender_name("<noreply@example.com>"), "noreply@example.com");
    assert_eq!(sender_name("plain@example.com"), "plain@example.com");
    assert_eq!(sender_address("plain@example.com"), None);
}

#[test]
fn gmail_url_points_at_inbox_message() {
    assert_eq!(gmail_url("18e0"), "https://mail.google.com/mail/u/0/#inbox/18e0");
}
