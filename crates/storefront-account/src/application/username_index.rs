//! Username → account id projection.
//!
//! The index is derived state: it can always be rebuilt by replaying the
//! global feed, and `AccountRepository::open` does exactly that at startup.
//! When two accounts claim the same username, the one recorded last wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use storefront_core::aggregate::{AggregateRoot, aggregate_id_from_stream};
use storefront_core::event::DomainEvent;

use crate::domain::account::Account;
use crate::domain::fields::TextField;

#[derive(Debug, Default)]
struct Entries {
    by_username: HashMap<String, String>,
    by_account: HashMap<String, String>,
}

impl Entries {
    fn record(&mut self, username: &str, account_id: &str) {
        if let Some(previous) = self.by_account.get(account_id) {
            if previous == username {
                self.by_username
                    .insert(username.to_owned(), account_id.to_owned());
                return;
            }
            if self.by_username.get(previous).map(String::as_str) == Some(account_id) {
                self.by_username.remove(previous);
            }
        }

        if let Some(displaced) = self
            .by_username
            .insert(username.to_owned(), account_id.to_owned())
            .filter(|displaced| displaced != account_id)
        {
            tracing::warn!(
                username,
                account_id,
                displaced = %displaced,
                "username claimed by another account; last writer wins"
            );
        }
        self.by_account
            .insert(account_id.to_owned(), username.to_owned());
    }
}

/// Returns `(username, account_id)` if `event` sets an account's username.
fn username_claim(event: &DomainEvent) -> Option<(&str, &str)> {
    let DomainEvent::AttributeUpdated(update) = event else {
        return None;
    };
    if event.entity_type() != Account::ENTITY_TYPE || update.name() != TextField::Username.name() {
        return None;
    }
    Some((
        update.value().as_text()?,
        aggregate_id_from_stream(Account::ENTITY_TYPE, event.stream_id())?,
    ))
}

/// Maps usernames to account ids.
#[derive(Debug, Default)]
pub struct UsernameIndex {
    entries: RwLock<Entries>,
}

impl UsernameIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index by folding a global feed in order. Only username
    /// updates of accounts are considered.
    #[must_use]
    pub fn rebuild(feed: &[DomainEvent]) -> Self {
        let index = Self::new();
        index.apply_all(feed);
        index
    }

    /// Folds the account username updates among `events`, in order. Each
    /// update points the username at its account and drops the account's
    /// previous username if that still points at the account.
    pub fn apply_all(&self, events: &[DomainEvent]) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for (username, account_id) in events.iter().filter_map(username_claim) {
            entries.record(username, account_id);
        }
    }

    /// Returns the account id currently holding `username`.
    #[must_use]
    pub fn lookup(&self, username: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_username
            .get(username)
            .cloned()
    }

    /// Number of indexed usernames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_username
            .len()
    }

    /// Returns `true` if no username is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
