//! Email slice: the recent and starred lists plus optimistic label edits.
//!
//! DESIGN
//! ======
//! An email can sit in both lists at once, so every label mutation is applied
//! to each copy with a matching id. Optimistic edits are tracked per
//! `(email id, field)` with a sequence number. Each pair keeps a confirmed
//! baseline, the value the server last acknowledged, which every commit
//! advances, stale ones included. Only the newest write decides what is
//! displayed: its failure restores the confirmed baseline, never the value of
//! an older write that may itself fail.

#[cfg(test)]
#[path = "email_test.rs"]
mod email_test;

use std::collections::{BTreeMap, HashMap};

use crate::net::types::{Email, LABEL_STARRED, LABEL_UNREAD};

/// A boolean email attribute backed by a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelField {
    /// `true` means read (no `UNREAD` label).
    Read,
    /// `true` means starred (`STARRED` label present).
    Star,
}

impl LabelField {
    #[must_use]
    pub fn value_of(self, email: &Email) -> bool {
        match self {
            Self::Read => !email.is_unread(),
            Self::Star => email.is_starred(),
        }
    }

    fn apply(self, email: &mut Email, value: bool) {
        match self {
            Self::Read => email.set_label(LABEL_UNREAD, !value),
            Self::Star => email.set_label(LABEL_STARRED, value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationStatus {
    Pending,
    Committed,
    RolledBack,
}

/// The newest optimistic write for one `(id, field)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation {
    pub seq: u64,
    pub value: bool,
    pub status: MutationStatus,
    /// Last value the server acknowledged; restored on rollback.
    pub confirmed: bool,
    /// Sequence of the commit that set `confirmed`; 0 until one lands.
    pub confirmed_seq: u64,
    /// Unresolved writes by sequence.
    pub in_flight: BTreeMap<u64, bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmailState {
    /// Recent inbox listing.
    pub emails: Vec<Email>,
    /// Separately fetched starred listing.
    pub starred: Vec<Email>,
    pub loading: bool,
    pub error: Option<String>,
    pub mutations: HashMap<(String, LabelField), Mutation>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EmailAction {
    SetEmails(Vec<Email>),
    SetStarred(Vec<Email>),
    SetLoading(bool),
    SetError(Option<String>),
    MarkRead(String),
    ToggleStar(String),
    SetBody { id: String, body: String },
    ApplyOptimistic { id: String, field: LabelField, value: bool, seq: u64 },
    Commit { id: String, field: LabelField, seq: u64 },
    Rollback { id: String, field: LabelField, seq: u64 },
}

impl EmailState {
    /// Apply `action` and return the next state.
    #[must_use]
    pub fn reduce(mut self, action: EmailAction) -> Self {
        match action {
            EmailAction::SetEmails(emails) => {
                self.emails = emails;
                self.loading = false;
                self.reapply_pending();
            }
            EmailAction::SetStarred(starred) => {
                self.starred = starred;
                self.reapply_pending();
            }
            EmailAction::SetLoading(loading) => self.loading = loading,
            EmailAction::SetError(error) => {
                if error.is_some() {
                    self.loading = false;
                }
                self.error = error;
            }
            EmailAction::MarkRead(id) => self.set_field(&id, LabelField::Read, true),
            EmailAction::ToggleStar(id) => {
                if let Some(starred) = self.field_value(&id, LabelField::Star) {
                    self.set_field(&id, LabelField::Star, !starred);
                }
            }
            EmailAction::SetBody { id, body } => {
                for email in self.copies_mut(&id) {
                    email.body = Some(body.clone());
                }
            }
            EmailAction::ApplyOptimistic { id, field, value, seq } => {
                self.apply_optimistic(id, field, value, seq);
            }
            EmailAction::Commit { id, field, seq } => self.commit(id, field, seq),
            EmailAction::Rollback { id, field, seq } => self.rollback(id, field, seq),
        }
        self
    }

    /// Look up an email by id, preferring the recent list.
    #[must_use]
    pub fn email(&self, id: &str) -> Option<&Email> {
        self.emails
            .iter()
            .chain(self.starred.iter())
            .find(|e| e.id == id)
    }

    /// Current displayed value of `field` for `id`, if the email is known.
    #[must_use]
    pub fn field_value(&self, id: &str, field: LabelField) -> Option<bool> {
        self.email(id).map(|e| field.value_of(e))
    }

    #[must_use]
    pub fn mutation(&self, id: &str, field: LabelField) -> Option<&Mutation> {
        self.mutations.get(&(id.to_owned(), field))
    }

    fn apply_optimistic(&mut self, id: String, field: LabelField, value: bool, seq: u64) {
        let Some(displayed) = self.field_value(&id, field) else {
            return;
        };
        let key = (id, field);
        let mutation = match self.mutations.remove(&key) {
            Some(existing) if existing.seq > seq => {
                self.mutations.insert(key, existing);
                return;
            }
            Some(mut existing) => {
                existing.in_flight.insert(seq, value);
                Mutation { seq, value, status: MutationStatus::Pending, ..existing }
            }
            None => Mutation {
                seq,
                value,
                status: MutationStatus::Pending,
                confirmed: displayed,
                confirmed_seq: 0,
                in_flight: BTreeMap::from([(seq, value)]),
            },
        };
        self.set_field(&key.0, field, value);
        self.mutations.insert(key, mutation);
    }

    fn commit(&mut self, id: String, field: LabelField, seq: u64) {
        let key = (id, field);
        let Some(m) = self.mutations.get_mut(&key) else {
            return;
        };
        let Some(value) = m.in_flight.remove(&seq) else {
            return;
        };
        if seq >= m.confirmed_seq {
            m.confirmed = value;
            m.confirmed_seq = seq;
        }
        let restore = match m.status {
            MutationStatus::Pending if m.seq == seq => {
                m.status = MutationStatus::Committed;
                None
            }
            // The newest write already failed; an older one landing changes
            // what the server holds.
            MutationStatus::RolledBack => Some(m.confirmed),
            _ => None,
        };
        if let Some(confirmed) = restore {
            self.set_field(&key.0, field, confirmed);
        }
    }

    fn rollback(&mut self, id: String, field: LabelField, seq: u64) {
        let key = (id, field);
        let Some(m) = self.mutations.get_mut(&key) else {
            return;
        };
        if m.in_flight.remove(&seq).is_none() {
            return;
        }
        if m.seq != seq || m.status != MutationStatus::Pending {
            return;
        }
        m.status = MutationStatus::RolledBack;
        let confirmed = m.confirmed;
        self.set_field(&key.0, field, confirmed);
    }

    fn reapply_pending(&mut self) {
        let pending: Vec<(String, LabelField, bool)> = self
            .mutations
            .iter()
            .filter(|(_, m)| m.status == MutationStatus::Pending)
            .map(|((id, field), m)| (id.clone(), *field, m.value))
            .collect();
        for (id, field, value) in pending {
            self.set_field(&id, field, value);
        }
    }

    fn set_field(&mut self, id: &str, field: LabelField, value: bool) {
        for email in self.copies_mut(id) {
            field.apply(email, value);
        }
    }

    fn copies_mut<'a>(&'a mut self, id: &'a str) -> impl Iterator<Item = &'a mut Email> + 'a {
        self.emails
            .iter_mut()
            .chain(self.starred.iter_mut())
            .filter(move |e| e.id == id)
    }
}
