//! Read access to Application resources in the cluster

use crate::StoreError;
use appgw_api::Application;
use async_trait::async_trait;
use kube::{Api, Client};
use tracing::debug;

/// Authoritative source of Application resources
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Fetch an application by name. `Ok(None)` means the application does not exist.
    async fn fetch_by_name(&self, name: &str) -> Result<Option<Application>, StoreError>;
}

/// ApplicationStore backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeApplicationStore {
    applications: Api<Application>,
}

impl KubeApplicationStore {
    /// Create a store reading cluster-scoped Applications through `client`
    pub fn new(client: Client) -> Self {
        Self {
            applications: Api::all(client),
        }
    }

    /// Create a store using the in-cluster or kubeconfig client
    pub async fn try_default() -> Result<Self, StoreError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ApplicationStore for KubeApplicationStore {
    async fn fetch_by_name(&self, name: &str) -> Result<Option<Application>, StoreError> {
        match self.applications.get(name).await {
            Ok(app) => {
                debug!("Fetched Application {} from the API server", name);
                Ok(Some(app))
            }
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory store counting every fetch
    #[derive(Default)]
    pub(crate) struct FakeStore {
        applications: Mutex<HashMap<String, Application>>,
        failure: Option<String>,
        calls: AtomicUsize,
    }

    impl FakeStore {
        pub(crate) fn with(applications: Vec<Application>) -> Self {
            let applications = applications
                .into_iter()
                .map(|app| (app.metadata.name.clone().unwrap_or_default(), app))
                .collect();
            Self {
                applications: Mutex::new(applications),
                ..Default::default()
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Default::default()
            }
        }

        pub(crate) fn put(&self, app: Application) {
            let name = app.metadata.name.clone().unwrap_or_default();
            self.put_as(&name, app);
        }

        /// Serve `app` for `name` regardless of its own metadata
        pub(crate) fn put_as(&self, name: &str, app: Application) {
            self.applications.lock().unwrap().insert(name.to_string(), app);
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ApplicationStore for FakeStore {
        async fn fetch_by_name(&self, name: &str) -> Result<Option<Application>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.failure {
                return Err(StoreError::Unavailable(message.clone()));
            }
            Ok(self.applications.lock().unwrap().get(name).cloned())
        }
    }
}
