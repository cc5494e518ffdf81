//! # Data access
//!
//! Handlers only talk to the [`DatabaseClient`] trait; backends live in [`clients`].
//!
//! [`DatabaseClient`]: interface::DatabaseClient

pub mod clients;
pub mod interface;
