//! Credential storage on top of Kubernetes Secrets

use crate::{Result, SecretManager};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Decoded key/value content of a Secret
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Namespace and name of a Secret
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NamespacedName {
    pub namespace: String,
    pub name: String,
}

impl NamespacedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespacedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// SecretRepository stores client credentials as Secrets
pub struct SecretRepository {
    manager: Arc<dyn SecretManager>,
}

impl SecretRepository {
    pub fn new(manager: Arc<dyn SecretManager>) -> Self {
        Self { manager }
    }

    /// Check whether the Secret exists
    pub async fn exists(&self, name: &NamespacedName) -> Result<bool> {
        match self.manager.get(&name.namespace, &name.name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read the data of the Secret
    pub async fn get(&self, name: &NamespacedName) -> Result<SecretData> {
        let secret = self.manager.get(&name.namespace, &name.name).await?;
        Ok(decode(secret))
    }

    /// Create the Secret, replacing any existing Secret with the same name
    pub async fn upsert_with_replace(&self, name: &NamespacedName, data: SecretData) -> Result<()> {
        let secret = make_secret(name, data);

        match self.manager.create(&name.namespace, &secret).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_already_exists() => self.replace(name, &secret).await,
            Err(e) => Err(e.context(format!("Replacing {} secret failed", name))),
        }
    }

    /// Merge `data` into the Secret's existing data, creating the Secret if needed.
    /// Keys present in both keep the new value.
    pub async fn upsert_with_merge(&self, name: &NamespacedName, data: SecretData) -> Result<()> {
        let existing = match self.get(name).await {
            Ok(existing) => existing,
            Err(e) if e.is_not_found() => SecretData::new(),
            Err(e) => return Err(e.context("Failed to upsert secret data")),
        };

        let merged = merge(existing, data);
        self.upsert(name, merged).await
    }

    pub async fn delete(&self, name: &NamespacedName) -> Result<()> {
        self.manager.delete(&name.namespace, &name.name).await
    }

    async fn replace(&self, name: &NamespacedName, secret: &Secret) -> Result<()> {
        debug!("Secret {} exists, replacing it", name);
        self.manager
            .delete(&name.namespace, &name.name)
            .await
            .map_err(|e| e.context(format!("Deleting {} secret failed", name)))?;
        self.manager.create(&name.namespace, secret).await?;
        Ok(())
    }

    async fn upsert(&self, name: &NamespacedName, data: SecretData) -> Result<()> {
        let secret = make_secret(name, data);

        match self.manager.update(&name.namespace, &secret).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                self.manager.create(&name.namespace, &secret).await?;
                Ok(())
            }
            Err(e) => Err(e.context(format!("Updating {} secret failed while upserting", name))),
        }
    }
}

fn make_secret(name: &NamespacedName, data: SecretData) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.name.clone()),
            namespace: Some(name.namespace.clone()),
            ..Default::default()
        },
        data: Some(data.into_iter().map(|(k, v)| (k, ByteString(v))).collect()),
        ..Default::default()
    }
}

fn decode(secret: Secret) -> SecretData {
    secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.0))
        .collect()
}

fn merge(mut base: SecretData, update: SecretData) -> SecretData {
    base.extend(update);
    base
}
