//! Account domain model.

pub mod account;
pub mod fields;
