//! Integration test suite for depgather
//!
//! End-to-end gather runs over scripted and file-backed sources.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! RUST_LOG=depgather=debug cargo test --test integration -- --nocapture
//! ```
//!
//! # Test Organization
//!
//! - **scenarios**: the basic single- and cross-source gather scenarios
//! - **properties**: uniqueness, termination bounds and the dependency-visited shortcut
//! - **failures**: cancellation and upstream query failures
//! - **feeds**: configuration files and TOML feeds driven through the public API

mod common;

mod failures;
mod feeds;
mod properties;
