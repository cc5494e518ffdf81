//! # Credentials
//!
//! Local password hashing and third-party identity providers.

pub mod oauth;
pub mod password;
