//! Core types for depgather
//!
//! This module holds the vocabulary every other module speaks:
//!
//! - [`PackageId`] - case-insensitive package id
//! - [`PackageIdentity`] - an exact `(id, version)` pair
//! - [`GatherError`] - the failure modes of a gather run
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI-facing error rendering
//!
//! # Examples
//!
//! ```rust
//! use depgather::core::{PackageId, PackageIdentity};
//!
//! let identity: PackageIdentity = "Serilog@3.1.1".parse().unwrap();
//! assert_eq!(identity.id, PackageId::new("serilog"));
//! ```

pub mod error;
pub mod identity;

pub use error::{ErrorContext, GatherError, user_friendly_error};
pub use identity::{PackageId, PackageIdentity};
