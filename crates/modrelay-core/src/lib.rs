//! Core relay logic for the moderator question bot.
//!
//! This crate is intentionally framework-agnostic. The Telegram transport lives
//! behind the `MessagingPort` trait, implemented in the adapter crate.

pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod identity;
pub mod logging;
pub mod messaging;
pub mod relay;

pub use errors::{Error, Result};
