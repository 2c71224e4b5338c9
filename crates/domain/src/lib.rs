//! Shared types for the single-session authority crates: the error type,
//! the configuration tree, session records and structured trace events.

pub mod config;
pub mod error;
pub mod session;
pub mod trace;
