//! Core domain + application logic for Bot Top.
//!
//! This crate is intentionally framework-agnostic. Telegram lives behind the
//! `MessagingPort` trait implemented in the adapter crate.

pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod handler;
pub mod logging;
pub mod menu;
pub mod messaging;
pub mod security;
pub mod templates;

pub use errors::{Error, Result};
