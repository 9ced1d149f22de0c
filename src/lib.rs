//! Skycast Library
//!
//! This module exposes the CLI and data modules for use in integration tests.

pub mod cli;
pub mod data;
