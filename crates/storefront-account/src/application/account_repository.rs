//! Event-sourced account repository.
//!
//! Wraps the generic repository with the username projection needed for
//! credential lookups.

use std::sync::Arc;

use storefront_core::aggregate::AggregateRoot;
use storefront_core::error::DomainError;
use storefront_core::event_log::EventLog;
use storefront_core::repository::EventSourcedRepository;

use super::username_index::UsernameIndex;
use crate::domain::account::Account;

/// Persists accounts to an event log and loads them back by replay.
#[derive(Clone)]
pub struct AccountRepository {
    accounts: EventSourcedRepository<Account>,
    usernames: Arc<UsernameIndex>,
}

impl AccountRepository {
    /// Opens a repository, rebuilding the username index from the global
    /// feed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the global feed cannot be read.
    pub async fn open(log: Arc<dyn EventLog>) -> Result<Self, DomainError> {
        let feed = log.get_all_stream().await?;
        let usernames = UsernameIndex::rebuild(&feed);
        tracing::info!(
            events = feed.len(),
            usernames = usernames.len(),
            "rebuilt username index from event log"
        );
        Ok(Self::with_index(log, Arc::new(usernames)))
    }

    /// Creates a repository around an index owned by the caller.
    #[must_use]
    pub fn with_index(log: Arc<dyn EventLog>, usernames: Arc<UsernameIndex>) -> Self {
        Self {
            accounts: EventSourcedRepository::new(log),
            usernames,
        }
    }

    /// Returns the username index.
    #[must_use]
    pub fn usernames(&self) -> &Arc<UsernameIndex> {
        &self.usernames
    }

    /// Appends the account's pending events and, once all of them are
    /// durable, folds the username changes among them into the index, the
    /// same way [`UsernameIndex::rebuild`] folds them from the log. Returns
    /// the stream written to, or `None` when nothing was pending.
    ///
    /// Pending events are not cleared here.
    ///
    /// # Errors
    ///
    /// Propagates the first append failure; the index is left untouched.
    pub async fn save(&self, account: &Account) -> Result<Option<String>, DomainError> {
        let stream_id = self.accounts.save(account).await?;
        self.usernames.apply_all(account.uncommitted_events());
        Ok(stream_id)
    }

    /// Loads an account by replaying its stream. An unknown id yields an
    /// account with every attribute unset.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the id is invalid, the read fails, or replay
    /// fails.
    pub async fn find_by(&self, account_id: &str) -> Result<Account, DomainError> {
        self.accounts.find_by(account_id).await
    }

    /// Loads an account as of the 0-based `revision` of its stream.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the id is invalid, the read fails, or replay
    /// fails.
    pub async fn find_by_version(
        &self,
        account_id: &str,
        revision: i64,
    ) -> Result<Account, DomainError> {
        self.accounts.find_by_version(account_id, revision).await
    }

    /// Loads the account holding `username` if its password matches exactly.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the account cannot be loaded.
    pub async fn find_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>, DomainError> {
        let Some(account_id) = self.usernames.lookup(username) else {
            return Ok(None);
        };

        let account = self.accounts.find_by(&account_id).await?;
        if account.username() != Some(username) {
            tracing::warn!(
                username,
                account_id = %account_id,
                "username index points at an account that no longer holds it"
            );
            return Ok(None);
        }

        Ok((account.password() == Some(password)).then_some(account))
    }

    /// Materializes every account in the event log.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the global feed cannot be read or any stream
    /// fails to replay.
    pub async fn find_all(&self) -> Result<Vec<Account>, DomainError> {
        self.accounts.find_all().await
    }
}
