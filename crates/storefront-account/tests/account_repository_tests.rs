//! Integration tests for `AccountRepository` over an in-memory event log.

use std::sync::Arc;

use storefront_account::application::account_repository::AccountRepository;
use storefront_account::application::username_index::UsernameIndex;
use storefront_account::domain::account::Account;
use storefront_core::aggregate::AggregateRoot;
use storefront_core::error::DomainError;
use storefront_core::event::{AttributeUpdated, DomainEvent, EntityCreated};
use storefront_core::event_log::EventLog;
use storefront_event_store::InMemoryEventLog;
use storefront_test_support::{FailingEventLog, FixedClock, RecordingEventLog};

fn clock() -> FixedClock {
    FixedClock::at_millis(1_768_471_200_000)
}

fn repository(log: &Arc<InMemoryEventLog>) -> AccountRepository {
    AccountRepository::with_index(log.clone(), Arc::new(UsernameIndex::new()))
}

fn sample_account(clock: &FixedClock, username: &str) -> Account {
    let mut account = Account::create(clock);
    account.set_username(username, clock);
    account.set_password("j2ee", clock);
    account.set_email("yourname@yourdomain.com", clock);
    account.set_first_name("ABC", clock);
    account.set_last_name("XYX", clock);
    account.set_status("OK", clock);
    account.set_address1("901 San Antonio Road", clock);
    account.set_address2("MS UCUP02-206", clock);
    account.set_city("Palo Alto", clock);
    account.set_state("CA", clock);
    account.set_zip("94303", clock);
    account.set_country("USA", clock);
    account.set_phone("555-555-5555", clock);
    account.set_favourite_category_id("DOGS", clock);
    account.set_language_preference("english", clock);
    account.set_banner_name("<image src=\"../images/banner_dogs.gif\">", clock);
    account.set_list_option(true, clock);
    account.set_banner_option(true, clock);
    account
}

fn assert_same_attributes(actual: &Account, expected: &Account) {
    assert_eq!(actual.id(), expected.id());
    assert_eq!(actual.username(), expected.username());
    assert_eq!(actual.password(), expected.password());
    assert_eq!(actual.email(), expected.email());
    assert_eq!(actual.first_name(), expected.first_name());
    assert_eq!(actual.last_name(), expected.last_name());
    assert_eq!(actual.status(), expected.status());
    assert_eq!(actual.address1(), expected.address1());
    assert_eq!(actual.address2(), expected.address2());
    assert_eq!(actual.city(), expected.city());
    assert_eq!(actual.state(), expected.state());
    assert_eq!(actual.zip(), expected.zip());
    assert_eq!(actual.country(), expected.country());
    assert_eq!(actual.phone(), expected.phone());
    assert_eq!(actual.favourite_category_id(), expected.favourite_category_id());
    assert_eq!(actual.language_preference(), expected.language_preference());
    assert_eq!(actual.banner_name(), expected.banner_name());
    assert_eq!(actual.list_option(), expected.list_option());
    assert_eq!(actual.banner_option(), expected.banner_option());
}

// --- save ---

#[tokio::test]
async fn test_save_appends_pending_events_in_emission_order() {
    // Arrange
    let clock = clock();
    let log = Arc::new(RecordingEventLog::default());
    let repo = AccountRepository::with_index(log.clone(), Arc::new(UsernameIndex::new()));
    let mut account = Account::create(&clock);
    account.set_username("j2ee", &clock);
    account.set_city("Palo Alto", &clock);

    // Act
    let stream_id = repo.save(&account).await.unwrap();

    // Assert
    assert_eq!(stream_id, Some(account.stream_id()));
    let appended = log.appended_events();
    let expected: Vec<(String, DomainEvent)> = account
        .uncommitted_events()
        .iter()
        .map(|event| (account.stream_id(), event.clone()))
        .collect();
    assert_eq!(appended, expected);
    assert_eq!(account.uncommitted_events().len(), 3);
}

#[tokio::test]
async fn test_save_after_clearing_writes_nothing() {
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let repo = repository(&log);
    let mut account = sample_account(&clock, "j2ee");
    repo.save(&account).await.unwrap();
    account.clear_uncommitted_events();
    let records = log.len();

    let stream_id = repo.save(&account).await.unwrap();

    assert_eq!(stream_id, None);
    assert_eq!(log.len(), records);
}

#[tokio::test]
async fn test_save_failure_keeps_pending_events_and_skips_index() {
    // Arrange
    let clock = clock();
    let log = Arc::new(FailingEventLog::after_appends(1));
    let repo = AccountRepository::with_index(log.clone(), Arc::new(UsernameIndex::new()));
    let mut account = Account::create(&clock);
    account.set_username("j2ee", &clock);
    account.set_password("secret", &clock);

    // Act
    let result = repo.save(&account).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    assert_eq!(log.appended_events().len(), 1);
    assert_eq!(account.uncommitted_events().len(), 3);
    assert_eq!(repo.usernames().lookup("j2ee"), None);
}

// --- find_by ---

#[tokio::test]
async fn test_replay_reproduces_every_attribute() {
    // Arrange
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let account = sample_account(&clock, "j2ee");
    repository(&log).save(&account).await.unwrap();

    // Act
    let loaded = repository(&log)
        .find_by(account.id().as_str())
        .await
        .unwrap();

    // Assert
    assert_same_attributes(&loaded, &account);
    assert_eq!(loaded.version(), account.version());
    assert_eq!(loaded.stream_id(), account.stream_id());
    assert!(loaded.uncommitted_events().is_empty());
}

#[tokio::test]
async fn test_replay_across_several_saves() {
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let repo = repository(&log);
    let mut account = sample_account(&clock, "j2ee");
    repo.save(&account).await.unwrap();
    account.clear_uncommitted_events();

    account.set_city("Oslo", &clock);
    account.set_banner_option(false, &clock);
    account.set_status("OK", &clock);
    repo.save(&account).await.unwrap();

    let loaded = repo.find_by(account.id().as_str()).await.unwrap();
    assert_same_attributes(&loaded, &account);
    assert_eq!(loaded.city(), Some("Oslo"));
    assert_eq!(loaded.banner_option(), Some(false));
}

#[tokio::test]
async fn test_find_by_unknown_id_returns_unset_account() {
    let log = Arc::new(InMemoryEventLog::new());

    let account = repository(&log).find_by("does-not-exist").await.unwrap();

    assert_eq!(account.aggregate_id(), "does-not-exist");
    assert_eq!(account.username(), None);
    assert_eq!(account.list_option(), None);
    assert_eq!(account.version(), 0);
}

#[tokio::test]
async fn test_find_by_rejects_id_with_separator() {
    let log = Arc::new(InMemoryEventLog::new());

    let result = repository(&log).find_by("a.b").await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_find_by_propagates_read_failure() {
    let repo = AccountRepository::with_index(
        Arc::new(FailingEventLog::new()),
        Arc::new(UsernameIndex::new()),
    );

    let result = repo.find_by("acct-1").await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}

#[tokio::test]
async fn test_find_by_version_replays_a_prefix_of_the_stream() {
    // Arrange
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let repo = repository(&log);
    let mut account = Account::create(&clock);
    account.set_username("first", &clock);
    account.set_username("second", &clock);
    account.set_email("late@example.com", &clock);
    repo.save(&account).await.unwrap();
    let id = account.id().as_str();

    // Act
    let at_one = repo.find_by_version(id, 1).await.unwrap();
    let at_two = repo.find_by_version(id, 2).await.unwrap();
    let latest = repo.find_by_version(id, 100).await.unwrap();

    // Assert
    assert_eq!(at_one.username(), Some("first"));
    assert_eq!(at_one.email(), None);
    assert_eq!(at_one.version(), 2);
    assert_eq!(at_two.username(), Some("second"));
    assert_eq!(at_two.email(), None);
    assert_eq!(latest.email(), Some("late@example.com"));
}

#[tokio::test]
async fn test_find_by_version_at_last_revision_matches_current_version() {
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let repo = repository(&log);
    let account = sample_account(&clock, "j2ee");
    repo.save(&account).await.unwrap();
    let last_revision = account.version() - 1;

    let loaded = repo
        .find_by_version(account.id().as_str(), last_revision)
        .await
        .unwrap();

    assert_eq!(loaded.version(), account.version());
    assert_same_attributes(&loaded, &account);
}

#[tokio::test]
async fn test_find_by_fails_loudly_on_unknown_attribute_in_history() {
    let log = Arc::new(InMemoryEventLog::new());
    let stream_id = format!("{}.acct-1", Account::ENTITY_TYPE);
    let event: DomainEvent =
        AttributeUpdated::new(&*stream_id, Account::ENTITY_TYPE, 1, "shoeSize", "44").into();
    log.append_to_stream(&stream_id, &event).await.unwrap();

    let result = repository(&log).find_by("acct-1").await;

    assert!(matches!(result, Err(DomainError::Replay(_))));
}

// --- find_all ---

#[tokio::test]
async fn test_find_all_regroups_interleaved_streams() {
    // Arrange
    let log = Arc::new(InMemoryEventLog::new());
    let stream_a = format!("{}.acct-a", Account::ENTITY_TYPE);
    let stream_b = format!("{}.acct-b", Account::ENTITY_TYPE);
    let update = |stream: &str, name: &str, value: &str| -> DomainEvent {
        AttributeUpdated::new(stream, Account::ENTITY_TYPE, 2, name, value).into()
    };
    let feed: Vec<DomainEvent> = vec![
        EntityCreated::new(&*stream_a, Account::ENTITY_TYPE, 1).into(),
        EntityCreated::new(&*stream_b, Account::ENTITY_TYPE, 1).into(),
        update(stream_a.as_str(), "username", "alice"),
        update(stream_b.as_str(), "username", "bob"),
        update(stream_a.as_str(), "email", "alice@example.com"),
        EntityCreated::new("storefront.catalog.Product.p1", "storefront.catalog.Product", 3).into(),
    ];
    for event in &feed {
        log.append_to_stream(event.stream_id(), event).await.unwrap();
    }

    // Act
    let mut accounts = repository(&log).find_all().await.unwrap();
    accounts.sort_by(|x, y| x.aggregate_id().cmp(y.aggregate_id()));

    // Assert
    assert_eq!(accounts.len(), 2);
    let (a, b) = (&accounts[0], &accounts[1]);
    assert_eq!(a.aggregate_id(), "acct-a");
    assert_eq!(a.username(), Some("alice"));
    assert_eq!(a.email(), Some("alice@example.com"));
    assert_eq!(a.version(), 3);
    assert_eq!(b.aggregate_id(), "acct-b");
    assert_eq!(b.username(), Some("bob"));
    assert_eq!(b.email(), None);
    assert_eq!(b.version(), 2);
}

#[tokio::test]
async fn test_find_all_on_empty_log_is_empty() {
    let log = Arc::new(InMemoryEventLog::new());

    let accounts = repository(&log).find_all().await.unwrap();

    assert!(accounts.is_empty());
}

#[tokio::test]
async fn test_find_all_propagates_feed_failure() {
    let repo = AccountRepository::with_index(
        Arc::new(FailingEventLog::new()),
        Arc::new(UsernameIndex::new()),
    );

    let result = repo.find_all().await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}

// --- find_by_username_and_password ---

#[tokio::test]
async fn test_credentials_lookup_after_save() {
    // Arrange
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let repo = repository(&log);
    let account = sample_account(&clock, "j2ee");
    repo.save(&account).await.unwrap();

    // Act
    let found = repo
        .find_by_username_and_password("j2ee", "j2ee")
        .await
        .unwrap();
    let wrong_password = repo
        .find_by_username_and_password("j2ee", "J2EE")
        .await
        .unwrap();
    let unknown_user = repo
        .find_by_username_and_password("ACID", "j2ee")
        .await
        .unwrap();

    // Assert
    let found = found.expect("account should be found");
    assert_eq!(found.id(), account.id());
    assert_same_attributes(&found, &account);
    assert!(wrong_password.is_none());
    assert!(unknown_user.is_none());
}

#[tokio::test]
async fn test_open_rebuilds_username_index_from_the_log() {
    // Arrange
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let account = sample_account(&clock, "j2ee");
    repository(&log).save(&account).await.unwrap();

    // Act: a "restarted" process starts from nothing but the log.
    let reopened = AccountRepository::open(log.clone()).await.unwrap();

    // Assert
    assert_eq!(reopened.usernames().len(), 1);
    let found = reopened
        .find_by_username_and_password("j2ee", "j2ee")
        .await
        .unwrap();
    assert_eq!(found.map(|a| a.id().clone()), Some(account.id().clone()));
}

#[tokio::test]
async fn test_renamed_account_is_found_only_under_its_new_username() {
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let repo = repository(&log);
    let mut account = sample_account(&clock, "old-name");
    repo.save(&account).await.unwrap();
    account.clear_uncommitted_events();

    account.set_username("new-name", &clock);
    repo.save(&account).await.unwrap();

    assert!(
        repo.find_by_username_and_password("old-name", "j2ee")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.find_by_username_and_password("new-name", "j2ee")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_duplicate_username_resolves_to_last_saved_account() {
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let repo = repository(&log);
    let first = sample_account(&clock, "shared");
    let mut second = Account::create(&clock);
    second.set_username("shared", &clock);
    second.set_password("other", &clock);

    repo.save(&first).await.unwrap();
    repo.save(&second).await.unwrap();

    let found = repo
        .find_by_username_and_password("shared", "other")
        .await
        .unwrap()
        .expect("second account should hold the username");
    assert_eq!(found.id(), second.id());
    assert!(
        repo.find_by_username_and_password("shared", "j2ee")
            .await
            .unwrap()
            .is_none()
    );

    let reopened = AccountRepository::open(log.clone()).await.unwrap();
    assert_eq!(
        reopened.usernames().lookup("shared").as_deref(),
        Some(second.id().as_str())
    );
}

#[tokio::test]
async fn test_saving_other_attributes_does_not_reclaim_a_lost_username() {
    // Arrange
    let clock = clock();
    let log = Arc::new(InMemoryEventLog::new());
    let repo = repository(&log);
    let mut first = sample_account(&clock, "shared");
    let mut second = Account::create(&clock);
    second.set_username("shared", &clock);
    second.set_password("other", &clock);
    repo.save(&first).await.unwrap();
    first.clear_uncommitted_events();
    repo.save(&second).await.unwrap();
    second.clear_uncommitted_events();

    // Act
    first.set_email("first@example.com", &clock);
    repo.save(&first).await.unwrap();

    // Assert
    let reopened = AccountRepository::open(log.clone()).await.unwrap();
    assert_eq!(
        repo.usernames().lookup("shared"),
        reopened.usernames().lookup("shared")
    );
    assert_eq!(
        repo.usernames().lookup("shared").as_deref(),
        Some(second.id().as_str())
    );
    assert!(
        repo.find_by_username_and_password("shared", "j2ee")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_open_over_existing_history_serves_credential_lookups() {
    // Arrange
    let clock = clock();
    let account = sample_account(&clock, "j2ee");
    let log = Arc::new(RecordingEventLog::new(account.uncommitted_events().to_vec()));

    // Act
    let repo = AccountRepository::open(log.clone()).await.unwrap();
    let found = repo
        .find_by_username_and_password("j2ee", "j2ee")
        .await
        .unwrap();

    // Assert
    let found = found.expect("account should be found");
    assert_same_attributes(&found, &account);
    assert!(log.appended_events().is_empty());
}
