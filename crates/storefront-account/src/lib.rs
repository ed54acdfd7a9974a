//! Storefront: customer accounts.
//!
//! The `Account` aggregate keeps no mutable row anywhere: every attribute
//! change is an event in the account's stream, and an account is rebuilt by
//! replaying that stream.

pub mod application;
pub mod domain;
