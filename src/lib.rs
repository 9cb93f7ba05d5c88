//! # seraface-rs
//!
//! Startup configuration for the Seraface AI server.
//!
//! Reads a dotenv file and the process environment, coerces and validates
//! every setting, and hands back one immutable [`config::Settings`] value
//! to be shared with the rest of the application.

pub mod config;
pub mod error;
pub mod telemetry;
