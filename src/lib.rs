//! depgather - cross-source dependency metadata gathering
//!
//! Before a version resolver can pick concrete package versions it needs the dependency
//! metadata of every package that might take part in the solution. That metadata is spread
//! over several independently queryable sources, and a source that knows a package may not
//! know the packages it depends on. depgather keeps querying every source for every id
//! discovered anywhere until no source has an id left to check, and returns the
//! deduplicated set of `(dependency info, source)` records.
//!
//! # Core Modules
//!
//! - [`gather`] - seeding, verification and the fixpoint expansion loop
//! - [`source`] - source handles, the dependency-query capability and local TOML feeds
//! - [`models`] - dependency metadata records
//! - [`core`] - package ids, identities and errors
//! - [`config`] - resolution context and the `depgather.toml` file
//! - [`cli`] - the `depgather` command-line front-end
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use depgather::config::ResolutionContext;
//! use depgather::core::PackageIdentity;
//! use depgather::gather::{GatherRequest, gather};
//! use depgather::models::Framework;
//! use depgather::source::{FeedSource, LocalFeed, PackageSource};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let main: Arc<dyn PackageSource> =
//!     Arc::new(FeedSource::new("main", Some(LocalFeed::load("main.toml".as_ref()).await?)));
//! let mirror: Arc<dyn PackageSource> =
//!     Arc::new(FeedSource::new("mirror", Some(LocalFeed::load("mirror.toml".as_ref()).await?)));
//!
//! let targets: Vec<PackageIdentity> = vec!["Contoso.Core@1.2.0".parse()?];
//! let gathered = gather(
//!     &ResolutionContext::default(),
//!     GatherRequest {
//!         primary_targets: &targets,
//!         all_targets: &targets,
//!         framework: &Framework::new("net8.0"),
//!         primary_sources: &[main.clone()],
//!         all_sources: &[main, mirror],
//!     },
//!     &CancellationToken::new(),
//! )
//! .await?;
//!
//! for record in &gathered {
//!     println!("{} from {}", record.identity(), record.source);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod gather;
pub mod models;
pub mod source;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
