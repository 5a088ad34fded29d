//! # AVR Common Library
//!
//! Shared code for the annotation video review tools:
//! - Error type and result alias
//! - Configuration loading (TOML + environment + defaults)
//! - Database bootstrap for the session store
//! - Review event types and EventBus

pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{EventBus, ReviewEvent, ReviewPhase};
