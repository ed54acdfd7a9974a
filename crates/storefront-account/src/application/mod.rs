//! Account persistence: repository and username projection.

pub mod account_repository;
pub mod username_index;
