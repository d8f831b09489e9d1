//! Common utilities for the Wallaby layout engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - colored terminal output for unsupported inputs

pub mod warning;

pub use warning::{clear_warnings, warn_once};
