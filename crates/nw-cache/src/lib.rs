//! nw-cache: build-once storage for named nodeweave graphs.
//!
//! Builders are requested by logical name. The first request populates a
//! fresh graph, validates it, lays it out and stores it; later requests with
//! the same interface get the stored handle back. A builder may request
//! other names through the cache it is handed, and a name that (directly or
//! indirectly) requests itself fails with [`CacheError::BuildCycle`].

pub mod cache;
pub mod error;
pub mod recipe;

pub use cache::{ArtifactCache, CacheStats};
pub use error::{CacheError, CacheResult};
pub use recipe::{register, GraphRecipe, Registered};
