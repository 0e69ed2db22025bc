//! Integration test suite for the exporter
//!
//! End-to-end tests driving the full export pipeline with a scripted game
//! runner, and smoke tests of the `fie` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: Commands of the `fie` binary, exit codes and output
//! - **pipeline**: Mod discovery, export, reduction and reconstruction

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod pipeline;
