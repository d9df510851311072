//! Kubernetes Secret storage for credentials referenced by application APIs
pub mod error;
pub mod manager;
pub mod repository;

pub use error::{Result, SecretError};
pub use manager::{KubeSecretManager, SecretManager};
pub use repository::{NamespacedName, SecretData, SecretRepository};
