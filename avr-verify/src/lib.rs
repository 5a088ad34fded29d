//! # avr-verify
//!
//! Annotation Review Navigator: walks a reviewer through server-supplied
//! video annotations one frame at a time, commits verified frames to the
//! backend and persists session progress so a restart resumes in place.
//!
//! - `frames`: frame grouping at a fixed 29.97 fps
//! - `ignore_list`: per-frame exclusions
//! - `session_store` / `db`: durable session state
//! - `gateway`: backend boundary (HTTP in production)
//! - `navigator`: the state machine
//! - `console`: terminal driver used by the `avr-verify` binary

pub mod build_info;
pub mod config;
pub mod console;
pub mod db;
pub mod error;
pub mod frames;
pub mod gateway;
pub mod ignore_list;
pub mod logging;
pub mod models;
pub mod navigator;
pub mod prompt;
pub mod session_store;
pub mod utils;
pub mod view;

pub use error::{NavigatorError, Result};
pub use gateway::{GatewayError, HttpGateway, VerificationGateway};
pub use models::{Annotation, SessionState};
pub use navigator::{
    reconcile_index, AdvanceOutcome, FetchTicket, Navigator, ResumeOutcome, StartOutcome,
};
pub use prompt::{PromptResponse, Question, ReviewPrompt, ScriptedPrompt};
pub use session_store::{MemorySessionStore, SessionStore};
pub use view::{FrameView, ReviewView, SelectionView};
