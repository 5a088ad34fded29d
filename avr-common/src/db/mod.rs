//! Database bootstrap for the session store

pub mod init;

pub use init::{create_review_session_table, init_database};
