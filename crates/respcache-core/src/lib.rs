//! respcache core
//!
//! Shared vocabulary for the response-cache storage layer: the error
//! taxonomy, the persisted `CachedResponse` entity and the
//! `CacheInteractor` contract every backend implements.
//! This crate has minimal dependencies and knows nothing about any
//! concrete store.

pub mod error;
pub mod interactor;
pub mod response;

pub use error::{Error, Result};
pub use interactor::{CacheInteractor, ORIGIN_IN_MEMORY, ORIGIN_REDIS};
pub use response::CachedResponse;
