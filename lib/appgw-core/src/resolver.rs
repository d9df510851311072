//! Resolution of application services to routable API descriptors

use crate::{
    normalize_name, AppError, ApiDescriptor, ApplicationCache, ApplicationStore, CacheConfig,
    ErrorKind, Result,
};
use appgw_api::{Entry, Service};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// ApplicationMetadataResolver turns an (application, service[, entry]) triple
/// into exactly one API descriptor.
///
/// Applications are read through an owned [`ApplicationCache`], so resolvers
/// never share cached state with each other.
pub struct ApplicationMetadataResolver {
    store: Arc<dyn ApplicationStore>,
    cache: ApplicationCache,
}

/// An API entry that satisfied a lookup
struct Match<'a> {
    service: &'a Service,
    entry: &'a Entry,
}

impl ApplicationMetadataResolver {
    /// Create a resolver. Must be called within a Tokio runtime.
    pub fn new(store: Arc<dyn ApplicationStore>, config: CacheConfig) -> Self {
        Self {
            store,
            cache: ApplicationCache::new(config),
        }
    }

    pub fn cache(&self) -> &ApplicationCache {
        &self.cache
    }

    /// Resolve the single API entry of the service whose display name
    /// normalizes to `service_name`
    pub async fn resolve_by_service(
        &self,
        app_name: &str,
        service_name: &str,
    ) -> Result<ApiDescriptor> {
        let service_key = normalize_name(service_name);
        self.resolve(app_name, |service, entry| {
            matches_service(service, entry, &service_key)
        })
        .await
        .map_err(|e| {
            classify(
                e,
                format!("service with name {} not found", service_name),
                format!("failed to get service with name '{}'", service_name),
            )
        })
    }

    /// Resolve the API entry named `entry_name` of the service whose display
    /// name normalizes to `service_name`
    pub async fn resolve_by_entry(
        &self,
        app_name: &str,
        service_name: &str,
        entry_name: &str,
    ) -> Result<ApiDescriptor> {
        let service_key = normalize_name(service_name);
        let entry_key = normalize_name(entry_name);
        self.resolve(app_name, |service, entry| {
            matches_service(service, entry, &service_key) && normalize_name(&entry.name) == entry_key
        })
        .await
        .map_err(|e| {
            classify(
                e,
                format!(
                    "service with name {} and entry name {} not found",
                    service_name, entry_name
                ),
                format!(
                    "failed to get service with name '{}' and entry name '{}'",
                    service_name, entry_name
                ),
            )
        })
    }

    async fn resolve<P>(&self, app_name: &str, predicate: P) -> Result<ApiDescriptor>
    where
        P: Fn(&Service, &Entry) -> bool,
    {
        let app = self.cache.get_or_fetch(app_name, self.store.as_ref()).await?;

        let matches: Vec<Match<'_>> = app
            .spec
            .services
            .iter()
            .flat_map(|service| service.entries.iter().map(move |entry| Match { service, entry }))
            .filter(|m| predicate(m.service, m.entry))
            .collect();

        match matches.as_slice() {
            [] => Err(AppError::NotFound("service not found".to_string())),
            [only] => {
                debug!(
                    "Resolved service {} entry {} of application {}",
                    only.service.id, only.entry.name, app_name
                );
                Ok(ApiDescriptor::from_entry(&app, only.entry))
            }
            all => {
                let infos = all
                    .iter()
                    .map(|m| {
                        format!(
                            "service.ID: '{}', service.DisplayName: '{}', entry.Name: '{}'",
                            m.service.id, m.service.display_name, m.entry.name
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(" | ");
                warn!(
                    app_name,
                    matches = all.len(),
                    "Ambiguous service lookup: {}",
                    infos
                );
                Err(AppError::WrongInput(format!("multiple services found: {}", infos)))
            }
        }
    }
}

fn matches_service(service: &Service, entry: &Entry, service_key: &str) -> bool {
    entry.is_api() && normalize_name(&service.display_name) == service_key
}

/// Give a lookup failure its caller-facing message, keeping its kind
fn classify(err: AppError, not_found_message: String, failure_prefix: String) -> AppError {
    if err.kind() == ErrorKind::NotFound {
        return AppError::NotFound(not_found_message);
    }

    let message = format!("{}: {}", failure_prefix, err.message());
    error!("{}", message);
    err.with_message(message)
}
