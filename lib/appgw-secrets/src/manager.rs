//! Kubernetes client for Secret resources

use crate::{Result, SecretError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client};

/// Basic Secret operations in a namespace
#[async_trait]
pub trait SecretManager: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret>;
    async fn create(&self, namespace: &str, secret: &Secret) -> Result<Secret>;
    async fn update(&self, namespace: &str, secret: &Secret) -> Result<Secret>;
    async fn delete(&self, namespace: &str, name: &str) -> Result<()>;
}

/// SecretManager backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeSecretManager {
    client: Client,
}

impl KubeSecretManager {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a manager using the in-cluster or kubeconfig client
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self { client })
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn secret_name(secret: &Secret) -> String {
    secret.metadata.name.clone().unwrap_or_default()
}

fn classify(err: kube::Error, name: &str) -> SecretError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => SecretError::NotFound(name.to_string()),
        kube::Error::Api(ae) if ae.code == 409 => SecretError::AlreadyExists(name.to_string()),
        e => e.into(),
    }
}

#[async_trait]
impl SecretManager for KubeSecretManager {
    async fn get(&self, namespace: &str, name: &str) -> Result<Secret> {
        self.secrets(namespace)
            .get(name)
            .await
            .map_err(|e| classify(e, name))
    }

    async fn create(&self, namespace: &str, secret: &Secret) -> Result<Secret> {
        self.secrets(namespace)
            .create(&PostParams::default(), secret)
            .await
            .map_err(|e| classify(e, &secret_name(secret)))
    }

    async fn update(&self, namespace: &str, secret: &Secret) -> Result<Secret> {
        let name = secret_name(secret);
        self.secrets(namespace)
            .replace(&name, &PostParams::default(), secret)
            .await
            .map_err(|e| classify(e, &name))
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.secrets(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| classify(e, name))
    }
}
