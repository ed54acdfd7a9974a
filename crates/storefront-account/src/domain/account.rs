//! The account aggregate root.

use std::fmt;

use storefront_core::aggregate::{AggregateRoot, STREAM_SEPARATOR};
use storefront_core::clock::Clock;
use storefront_core::error::DomainError;
use storefront_core::event::{AttributeUpdated, AttributeValue, DomainEvent, EntityCreated};
use uuid::Uuid;

use super::fields::{AccountField, FlagField, TextField};

/// Identity of an account. Never contains the stream separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    /// Generates a fresh identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validates an identity read from outside.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `raw` is empty or contains the
    /// stream separator.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::Validation("account id must not be empty".into()));
        }
        if raw.contains(STREAM_SEPARATOR) {
            return Err(DomainError::Validation(format!(
                "account id must not contain {STREAM_SEPARATOR:?}: {raw}"
            )));
        }
        Ok(Self(raw.to_owned()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The aggregate root for a customer account.
///
/// Attributes start unset. Setters cause an `AttributeUpdated` event only
/// when the value actually changes; `mutate` applies recorded events without
/// that check.
pub struct Account {
    id: AccountId,
    version: i64,
    username: Option<String>,
    password: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    status: Option<String>,
    address1: Option<String>,
    address2: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    country: Option<String>,
    phone: Option<String>,
    favourite_category_id: Option<String>,
    language_preference: Option<String>,
    banner_name: Option<String>,
    list_option: Option<bool>,
    banner_option: Option<bool>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<DomainEvent>,
}

impl Account {
    /// Creates a brand-new account with a fresh identity, causing an
    /// `EntityCreated` event.
    #[must_use]
    pub fn create(clock: &dyn Clock) -> Self {
        let mut account = Self::with_id(AccountId::generate());
        let event = EntityCreated::new(account.stream_id(), Self::ENTITY_TYPE, clock.now_millis());
        account.cause(event.into());
        account
    }

    /// Creates an empty replay target bound to `id`.
    #[must_use]
    pub fn with_id(id: AccountId) -> Self {
        Self {
            id,
            version: 0,
            username: None,
            password: None,
            email: None,
            first_name: None,
            last_name: None,
            status: None,
            address1: None,
            address2: None,
            city: None,
            state: None,
            zip: None,
            country: None,
            phone: None,
            favourite_category_id: None,
            language_preference: None,
            banner_name: None,
            list_option: None,
            banner_option: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the account identity.
    #[must_use]
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Returns a text attribute.
    #[must_use]
    pub fn text(&self, field: TextField) -> Option<&str> {
        self.text_slot(field).as_deref()
    }

    /// Returns a boolean attribute.
    #[must_use]
    pub fn flag(&self, field: FlagField) -> Option<bool> {
        *self.flag_slot(field)
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    #[must_use]
    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    #[must_use]
    pub fn address1(&self) -> Option<&str> {
        self.address1.as_deref()
    }

    #[must_use]
    pub fn address2(&self) -> Option<&str> {
        self.address2.as_deref()
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    #[must_use]
    pub fn zip(&self) -> Option<&str> {
        self.zip.as_deref()
    }

    #[must_use]
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub fn favourite_category_id(&self) -> Option<&str> {
        self.favourite_category_id.as_deref()
    }

    #[must_use]
    pub fn language_preference(&self) -> Option<&str> {
        self.language_preference.as_deref()
    }

    #[must_use]
    pub fn banner_name(&self) -> Option<&str> {
        self.banner_name.as_deref()
    }

    #[must_use]
    pub fn list_option(&self) -> Option<bool> {
        self.list_option
    }

    #[must_use]
    pub fn banner_option(&self) -> Option<bool> {
        self.banner_option
    }

    pub fn set_username(&mut self, username: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::Username, username.into(), clock);
    }

    pub fn set_password(&mut self, password: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::Password, password.into(), clock);
    }

    pub fn set_email(&mut self, email: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::Email, email.into(), clock);
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::FirstName, first_name.into(), clock);
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::LastName, last_name.into(), clock);
    }

    pub fn set_status(&mut self, status: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::Status, status.into(), clock);
    }

    pub fn set_address1(&mut self, address1: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::Address1, address1.into(), clock);
    }

    pub fn set_address2(&mut self, address2: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::Address2, address2.into(), clock);
    }

    pub fn set_city(&mut self, city: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::City, city.into(), clock);
    }

    pub fn set_state(&mut self, state: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::State, state.into(), clock);
    }

    pub fn set_zip(&mut self, zip: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::Zip, zip.into(), clock);
    }

    pub fn set_country(&mut self, country: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::Country, country.into(), clock);
    }

    pub fn set_phone(&mut self, phone: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::Phone, phone.into(), clock);
    }

    pub fn set_favourite_category_id(&mut self, category_id: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::FavouriteCategoryId, category_id.into(), clock);
    }

    pub fn set_language_preference(&mut self, language: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::LanguagePreference, language.into(), clock);
    }

    pub fn set_banner_name(&mut self, banner_name: impl Into<String>, clock: &dyn Clock) {
        self.set_text(TextField::BannerName, banner_name.into(), clock);
    }

    pub fn set_list_option(&mut self, list_option: bool, clock: &dyn Clock) {
        self.set_flag(FlagField::ListOption, list_option, clock);
    }

    pub fn set_banner_option(&mut self, banner_option: bool, clock: &dyn Clock) {
        self.set_flag(FlagField::BannerOption, banner_option, clock);
    }

    /// Sets a text attribute, causing an event only if the value changes.
    pub fn set_text(&mut self, field: TextField, value: String, clock: &dyn Clock) {
        if self.text(field) == Some(value.as_str()) {
            return;
        }
        let event = self.attribute_updated(field.name(), value, clock);
        self.cause(event);
    }

    /// Sets a boolean attribute, causing an event only if the value changes.
    pub fn set_flag(&mut self, field: FlagField, value: bool, clock: &dyn Clock) {
        if self.flag(field) == Some(value) {
            return;
        }
        let event = self.attribute_updated(field.name(), value, clock);
        self.cause(event);
    }

    fn attribute_updated(
        &self,
        name: &str,
        value: impl Into<AttributeValue>,
        clock: &dyn Clock,
    ) -> DomainEvent {
        AttributeUpdated::new(
            self.stream_id(),
            Self::ENTITY_TYPE,
            clock.now_millis(),
            name,
            value,
        )
        .into()
    }

    /// Applies a new event through `mutate` and queues it for persistence.
    /// An event the account itself rejects is never queued.
    fn cause(&mut self, event: DomainEvent) {
        match self.mutate(&event) {
            Ok(()) => self.uncommitted_events.push(event),
            Err(e) => {
                tracing::error!(
                    account_id = %self.id,
                    error = %e,
                    "account rejected its own event"
                );
            }
        }
    }

    fn text_slot(&self, field: TextField) -> &Option<String> {
        match field {
            TextField::Username => &self.username,
            TextField::Password => &self.password,
            TextField::Email => &self.email,
            TextField::FirstName => &self.first_name,
            TextField::LastName => &self.last_name,
            TextField::Status => &self.status,
            TextField::Address1 => &self.address1,
            TextField::Address2 => &self.address2,
            TextField::City => &self.city,
            TextField::State => &self.state,
            TextField::Zip => &self.zip,
            TextField::Country => &self.country,
            TextField::Phone => &self.phone,
            TextField::FavouriteCategoryId => &self.favourite_category_id,
            TextField::LanguagePreference => &self.language_preference,
            TextField::BannerName => &self.banner_name,
        }
    }

    fn text_slot_mut(&mut self, field: TextField) -> &mut Option<String> {
        match field {
            TextField::Username => &mut self.username,
            TextField::Password => &mut self.password,
            TextField::Email => &mut self.email,
            TextField::FirstName => &mut self.first_name,
            TextField::LastName => &mut self.last_name,
            TextField::Status => &mut self.status,
            TextField::Address1 => &mut self.address1,
            TextField::Address2 => &mut self.address2,
            TextField::City => &mut self.city,
            TextField::State => &mut self.state,
            TextField::Zip => &mut self.zip,
            TextField::Country => &mut self.country,
            TextField::Phone => &mut self.phone,
            TextField::FavouriteCategoryId => &mut self.favourite_category_id,
            TextField::LanguagePreference => &mut self.language_preference,
            TextField::BannerName => &mut self.banner_name,
        }
    }

    fn flag_slot(&self, field: FlagField) -> &Option<bool> {
        match field {
            FlagField::ListOption => &self.list_option,
            FlagField::BannerOption => &self.banner_option,
        }
    }

    fn flag_slot_mut(&mut self, field: FlagField) -> &mut Option<bool> {
        match field {
            FlagField::ListOption => &mut self.list_option,
            FlagField::BannerOption => &mut self.banner_option,
        }
    }

    fn apply_update(&mut self, update: &AttributeUpdated) -> Result<(), DomainError> {
        let mismatch = |expected: &str| {
            DomainError::Replay(format!(
                "attribute {} of {} expects a {expected} value, got {}",
                update.name(),
                self.id,
                update.value().kind()
            ))
        };

        match AccountField::from_name(update.name()) {
            Some(AccountField::Text(field)) => {
                let value = update.value().as_text().ok_or_else(|| mismatch("text"))?;
                *self.text_slot_mut(field) = Some(value.to_owned());
            }
            Some(AccountField::Flag(field)) => {
                let value = update.value().as_flag().ok_or_else(|| mismatch("boolean"))?;
                *self.flag_slot_mut(field) = Some(value);
            }
            None => {
                return Err(DomainError::Replay(format!(
                    "account {} has no attribute named {:?}",
                    self.id,
                    update.name()
                )));
            }
        }
        Ok(())
    }
}

impl AggregateRoot for Account {
    const ENTITY_TYPE: &'static str = "storefront.account.Account";

    fn shell(aggregate_id: &str) -> Result<Self, DomainError> {
        Ok(Self::with_id(AccountId::parse(aggregate_id)?))
    }

    fn aggregate_id(&self) -> &str {
        self.id.as_str()
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn mutate(&mut self, event: &DomainEvent) -> Result<(), DomainError> {
        if event.entity_type() != Self::ENTITY_TYPE || event.stream_id() != self.stream_id() {
            return Err(DomainError::Replay(format!(
                "event for {} ({}) cannot be applied to account {}",
                event.stream_id(),
                event.entity_type(),
                self.id
            )));
        }

        match event {
            DomainEvent::EntityCreated(_) => {}
            DomainEvent::AttributeUpdated(update) => self.apply_update(update)?,
        }
        self.version += 1;
        Ok(())
    }

    fn uncommitted_events(&self) -> &[DomainEvent] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("status", &self.status)
            .field("address1", &self.address1)
            .field("address2", &self.address2)
            .field("city", &self.city)
            .field("state", &self.state)
            .field("zip", &self.zip)
            .field("country", &self.country)
            .field("phone", &self.phone)
            .field("favourite_category_id", &self.favourite_category_id)
            .field("language_preference", &self.language_preference)
            .field("banner_name", &self.banner_name)
            .field("list_option", &self.list_option)
            .field("banner_option", &self.banner_option)
            .field("uncommitted_events", &self.uncommitted_events.len())
            .finish()
    }
}
