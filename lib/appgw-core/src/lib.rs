//! Application metadata resolution
//!
//! This library provides:
//! - A read-through cache of Application resources with time-based expiry
//! - Resolution of (application, service[, entry]) into a routable API descriptor
//! - Classification of backing store failures into caller-facing errors

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod normalization;
pub mod resolver;
pub mod store;

pub use cache::ApplicationCache;
pub use config::CacheConfig;
pub use descriptor::{ApiDescriptor, Credentials};
pub use error::{AppError, ErrorKind, Result, StoreError};
pub use normalization::normalize_name;
pub use resolver::ApplicationMetadataResolver;
pub use store::{ApplicationStore, KubeApplicationStore};
