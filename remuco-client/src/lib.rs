//! # remuco-client — Media Player Remote Control
//!
//! The client binary. Loads configuration, negotiates a session with a
//! player adapter host via `remuco-core`, and hands the established
//! player session to the selected main screen.

pub mod config;
pub mod session;
pub mod ui;
