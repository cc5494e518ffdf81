//! # chcemvediet
//!
//! Server of a freedom-of-information request portal: accounts, the obligee directory,
//! information requests with their attachments and deadlines, and the localized pages
//! around them.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod i18n;
pub mod jobs;
pub mod models;
pub mod search;
pub mod ui;
pub mod views;
pub mod workdays;
