//! The event-sourced attributes of an account.
//!
//! Each attribute travels on the wire under a fixed name. Text and boolean
//! attributes are separate enums so the aggregate can store each kind in a
//! typed slot.

/// Account attributes holding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Username,
    Password,
    Email,
    FirstName,
    LastName,
    Status,
    Address1,
    Address2,
    City,
    State,
    Zip,
    Country,
    Phone,
    FavouriteCategoryId,
    LanguagePreference,
    BannerName,
}

/// Account attributes holding a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagField {
    ListOption,
    BannerOption,
}

/// Any account attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountField {
    /// A text attribute.
    Text(TextField),
    /// A boolean attribute.
    Flag(FlagField),
}

impl TextField {
    /// Every text attribute.
    pub const ALL: [Self; 16] = [
        Self::Username,
        Self::Password,
        Self::Email,
        Self::FirstName,
        Self::LastName,
        Self::Status,
        Self::Address1,
        Self::Address2,
        Self::City,
        Self::State,
        Self::Zip,
        Self::Country,
        Self::Phone,
        Self::FavouriteCategoryId,
        Self::LanguagePreference,
        Self::BannerName,
    ];

    /// Wire name of the attribute.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::Email => "email",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Status => "status",
            Self::Address1 => "address1",
            Self::Address2 => "address2",
            Self::City => "city",
            Self::State => "state",
            Self::Zip => "zip",
            Self::Country => "country",
            Self::Phone => "phone",
            Self::FavouriteCategoryId => "favouriteCategoryId",
            Self::LanguagePreference => "languagePreference",
            Self::BannerName => "bannerName",
        }
    }
}

impl FlagField {
    /// Every boolean attribute.
    pub const ALL: [Self; 2] = [Self::ListOption, Self::BannerOption];

    /// Wire name of the attribute.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ListOption => "listOption",
            Self::BannerOption => "bannerOption",
        }
    }
}

impl AccountField {
    /// Wire name of the attribute.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Text(field) => field.name(),
            Self::Flag(field) => field.name(),
        }
    }

    /// Looks an attribute up by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        TextField::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .map(Self::Text)
            .or_else(|| {
                FlagField::ALL
                    .into_iter()
                    .find(|field| field.name() == name)
                    .map(Self::Flag)
            })
    }
}
