//! Foundation types for tally.
//!
//! This crate contains the error type shared by all tally crates and the
//! `Result` alias the rest of the workspace uses.

pub mod error;
