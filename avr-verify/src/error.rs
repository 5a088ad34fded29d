//! Error types for avr-verify
//!
//! Every failure leaves the navigator in its last valid state; nothing here
//! is fatal to a review session.

use crate::gateway::GatewayError;
use thiserror::Error;

/// Navigator error type
#[derive(Error, Debug)]
pub enum NavigatorError {
    /// Gateway call rejected or timed out; state unchanged, retry is manual
    #[error("Network failure: {0}")]
    Network(#[from] GatewayError),

    /// Session state could not be persisted or loaded; state unchanged
    #[error("Session store error: {0}")]
    Store(#[from] avr_common::Error),

    /// Operation not legal in the current phase
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Convenience Result type using NavigatorError
pub type Result<T> = std::result::Result<T, NavigatorError>;
