//! Streamvault catalog database
//!
//! Durable record of every published video. [`VideoRepository`] is the Postgres
//! implementation of the [`Catalog`] trait the pipeline's recorder depends on.

pub mod catalog;
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
pub mod setup;
pub mod video;

pub use catalog::{Catalog, CatalogError};
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::InMemoryCatalog;
pub use setup::{connect, run_migrations};
pub use video::VideoRepository;
