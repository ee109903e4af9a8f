//! `fieldcheck-cli` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod check;
pub mod config;
pub mod error;
