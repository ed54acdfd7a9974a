//! Storefront Core: event-sourcing abstractions.
//!
//! This crate defines the event taxonomy, its wire encoding, the event log
//! client contract, the aggregate contract and the generic repository that
//! connects them. It contains no storage engine code.

pub mod aggregate;
pub mod clock;
pub mod codec;
pub mod error;
pub mod event;
pub mod event_log;
pub mod repository;
