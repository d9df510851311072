//! Read-through cache of Application resources

use crate::config::JANITOR_INTERVAL;
use crate::{AppError, ApplicationStore, CacheConfig, Result};
use appgw_api::Application;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// A cached application, or a corrupt slot that must be refetched
#[derive(Clone, Debug)]
enum CacheEntry {
    Ready {
        application: Arc<Application>,
        expires_at: Instant,
    },
    Poisoned,
}

impl CacheEntry {
    /// A record without a name is empty and never served from the cache
    fn for_record(application: Arc<Application>, expires_at: Instant) -> Self {
        if application.metadata.name.as_deref().unwrap_or_default().is_empty() {
            return CacheEntry::Poisoned;
        }
        CacheEntry::Ready {
            application,
            expires_at,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        match self {
            CacheEntry::Ready { expires_at, .. } => *expires_at > now,
            CacheEntry::Poisoned => false,
        }
    }
}

enum Lookup {
    Hit(Arc<Application>),
    Poisoned,
    Miss,
}

type Entries = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// ApplicationCache keeps fetched applications for a fixed retention and
/// sweeps expired ones in the background.
///
/// The lock only guards the map. Fetches from the store run unlocked, so two
/// concurrent misses for the same name may both fetch; the last one stored wins.
pub struct ApplicationCache {
    // Map of application name to its cached resource
    entries: Entries,
    retention: Duration,
    janitor: JoinHandle<()>,
}

impl ApplicationCache {
    /// Create a cache and start its janitor. Must be called within a Tokio runtime.
    pub fn new(config: CacheConfig) -> Self {
        let entries: Entries = Arc::new(RwLock::new(HashMap::new()));
        let janitor = spawn_janitor(entries.clone(), JANITOR_INTERVAL);
        Self {
            entries,
            retention: config.retention,
            janitor,
        }
    }

    /// Return the cached application, fetching it from `store` on a miss,
    /// after expiry, or when the cached slot is corrupt.
    ///
    /// Absence and store failures are never cached.
    pub async fn get_or_fetch(
        &self,
        name: &str,
        store: &dyn ApplicationStore,
    ) -> Result<Arc<Application>> {
        match self.lookup(name).await {
            Lookup::Hit(application) => {
                debug!("Application cache hit: {}", name);
                return Ok(application);
            }
            Lookup::Poisoned => {
                warn!(
                    app_name = name,
                    "found empty application entity in cache - this is not expected, deleting it from cache now"
                );
                self.evict_poisoned(name).await;
            }
            Lookup::Miss => debug!("Application cache miss: {}", name),
        }

        let application = match store.fetch_by_name(name).await {
            Ok(Some(application)) => Arc::new(application),
            Ok(None) => {
                let message = format!("Application: {} not found.", name);
                warn!(app_name = name, "{}", message);
                return Err(AppError::NotFound(message));
            }
            Err(e) => {
                let message = format!("failed to get Application '{}' : {}", name, e);
                error!(app_name = name, error = %e, "{}", message);
                return Err(AppError::Internal(message));
            }
        };

        self.insert(name, application.clone()).await;
        Ok(application)
    }

    /// Drop the cached application, returning whether one was present
    pub async fn invalidate(&self, name: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(name).is_some()
    }

    /// Number of slots currently held, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn lookup(&self, name: &str) -> Lookup {
        let entries = self.entries.read().await;
        match entries.get(name) {
            Some(CacheEntry::Ready {
                application,
                expires_at,
            }) if *expires_at > Instant::now() => Lookup::Hit(application.clone()),
            Some(CacheEntry::Poisoned) => Lookup::Poisoned,
            _ => Lookup::Miss,
        }
    }

    async fn evict_poisoned(&self, name: &str) {
        let mut entries = self.entries.write().await;
        // Another task may already have refreshed the slot
        if matches!(entries.get(name), Some(CacheEntry::Poisoned)) {
            entries.remove(name);
        }
    }

    async fn insert(&self, name: &str, application: Arc<Application>) {
        let entry = CacheEntry::for_record(application, Instant::now() + self.retention);
        if matches!(entry, CacheEntry::Poisoned) {
            warn!(app_name = name, "store returned an empty application entity");
        }
        let mut entries = self.entries.write().await;
        entries.insert(name.to_string(), entry);
        debug!("Cached Application {} for {:?}", name, self.retention);
    }

    #[cfg(test)]
    pub(crate) async fn insert_poisoned(&self, name: &str) {
        let mut entries = self.entries.write().await;
        entries.insert(name.to_string(), CacheEntry::Poisoned);
    }
}

impl Drop for ApplicationCache {
    fn drop(&mut self) {
        self.janitor.abort();
    }
}

fn spawn_janitor(entries: Entries, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        loop {
            ticker.tick().await;
            let removed = sweep(&entries, Instant::now()).await;
            if removed > 0 {
                debug!("Swept {} expired applications from cache", removed);
            }
        }
    })
}

/// Remove every slot that can no longer be served
async fn sweep(entries: &Entries, now: Instant) -> usize {
    let mut entries = entries.write().await;
    let before = entries.len();
    entries.retain(|_, entry| entry.is_live(now));
    before - entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::FakeStore;
    use crate::StoreError;
    use appgw_api::ApplicationSpec;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    fn application(name: &str) -> Application {
        Application::new(name, ApplicationSpec::default())
    }

    fn cache(retention_secs: u64) -> ApplicationCache {
        ApplicationCache::new(CacheConfig::new(Duration::from_secs(retention_secs)))
    }

    #[tokio::test]
    async fn test_hit_does_not_call_store() {
        let store = FakeStore::with(vec![application("acme")]);
        let cache = cache(300);

        let first = cache.get_or_fetch("acme", &store).await.unwrap();
        let second = cache.get_or_fetch("acme", &store).await.unwrap();

        assert_eq!(store.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_refetched_once() {
        let store = FakeStore::with(vec![application("acme")]);
        let cache = cache(60);

        cache.get_or_fetch("acme", &store).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.get_or_fetch("acme", &store).await.unwrap();
        assert_eq!(store.calls(), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        cache.get_or_fetch("acme", &store).await.unwrap();
        cache.get_or_fetch("acme", &store).await.unwrap();
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_replaces_entry() {
        let store = FakeStore::with(vec![application("acme")]);
        let cache = cache(300);

        let before = cache.get_or_fetch("acme", &store).await.unwrap();
        let mut updated = application("acme");
        updated.spec.skip_verify = true;
        store.put(updated);

        assert!(cache.invalidate("acme").await);
        let after = cache.get_or_fetch("acme", &store).await.unwrap();
        assert!(!before.spec.skip_verify);
        assert!(after.spec.skip_verify);
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_poisoned_entry_is_evicted_and_refetched() {
        let store = FakeStore::with(vec![application("acme")]);
        let cache = cache(300);
        cache.insert_poisoned("acme").await;

        let app = cache.get_or_fetch("acme", &store).await.unwrap();
        assert_eq!(app.metadata.name.as_deref(), Some("acme"));
        assert_eq!(store.calls(), 1);

        cache.get_or_fetch("acme", &store).await.unwrap();
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_poisoned_entry_with_failing_store_reports_internal() {
        let store = FakeStore::failing("connection refused");
        let cache = cache(300);
        cache.insert_poisoned("acme").await;

        let err = cache.get_or_fetch("acme", &store).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let store = FakeStore::default();
        let cache = cache(300);

        let err = cache.get_or_fetch("ghost-app", &store).await.unwrap_err();
        assert_eq!(err, AppError::NotFound("Application: ghost-app not found.".to_string()));

        cache.get_or_fetch("ghost-app", &store).await.unwrap_err();
        assert_eq!(store.calls(), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_and_not_cached() {
        let store = FakeStore::failing("etcd timeout");
        let cache = cache(300);

        let err = cache.get_or_fetch("acme", &store).await.unwrap_err();
        match err {
            AppError::Internal(message) => {
                assert!(message.starts_with("failed to get Application 'acme' :"));
                assert!(message.contains("etcd timeout"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_janitor_sweeps_expired_entries() {
        let store = FakeStore::with(vec![application("acme"), application("globex")]);
        let cache = cache(60);

        cache.get_or_fetch("acme", &store).await.unwrap();
        cache.get_or_fetch("globex", &store).await.unwrap();
        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(JANITOR_INTERVAL + Duration::from_secs(1)).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_janitor_keeps_live_entries() {
        let store = FakeStore::with(vec![application("acme")]);
        let cache = cache(3600);

        cache.get_or_fetch("acme", &store).await.unwrap();
        tokio::time::sleep(JANITOR_INTERVAL * 2).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_sweep_removes_poisoned_and_expired() {
        let cache = cache(300);
        let now = Instant::now();
        {
            let mut entries = cache.entries.write().await;
            entries.insert("poisoned".to_string(), CacheEntry::Poisoned);
            entries.insert(
                "expired".to_string(),
                CacheEntry::Ready {
                    application: Arc::new(application("expired")),
                    expires_at: now,
                },
            );
            entries.insert(
                "live".to_string(),
                CacheEntry::Ready {
                    application: Arc::new(application("live")),
                    expires_at: now + Duration::from_secs(10),
                },
            );
        }

        assert_eq!(sweep(&cache.entries, now).await, 2);
        assert_eq!(cache.len().await, 1);
    }

    /// Store whose first fetch of `held` stays open until released. The result
    /// of that fetch is read before it blocks, so it is stale once released.
    struct GatedStore {
        inner: FakeStore,
        held: &'static str,
        blocked: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    impl GatedStore {
        fn new(inner: FakeStore, held: &'static str) -> Self {
            Self {
                inner,
                held,
                blocked: AtomicBool::new(false),
                entered: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl ApplicationStore for GatedStore {
        async fn fetch_by_name(&self, name: &str) -> std::result::Result<Option<Application>, StoreError> {
            let result = self.inner.fetch_by_name(name).await;
            if name == self.held && !self.blocked.swap(true, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            result
        }
    }

    #[tokio::test]
    async fn test_fetch_runs_unlocked_and_last_writer_wins() {
        let store = Arc::new(GatedStore::new(
            FakeStore::with(vec![application("acme"), application("globex")]),
            "acme",
        ));
        let cache = Arc::new(cache(300));

        let slow = {
            let store = store.clone();
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_fetch("acme", store.as_ref()).await })
        };
        store.entered.notified().await;

        // Other lookups complete while a fetch is outstanding
        cache.get_or_fetch("globex", store.as_ref()).await.unwrap();

        let mut updated = application("acme");
        updated.spec.skip_verify = true;
        store.inner.put(updated);
        let fresh = cache.get_or_fetch("acme", store.as_ref()).await.unwrap();
        assert!(fresh.spec.skip_verify);

        store.release.notify_one();
        let stale = slow.await.unwrap().unwrap();
        assert!(!stale.spec.skip_verify);

        // The slower fetch stored last, so its record is served
        let cached = cache.get_or_fetch("acme", store.as_ref()).await.unwrap();
        assert!(Arc::ptr_eq(&cached, &stale));
        assert_eq!(store.inner.calls(), 3);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_nameless_record_is_not_served_from_cache() {
        let store = FakeStore::default();
        store.put_as("acme", Application::new("", ApplicationSpec::default()));
        let mut nameless = Application::new("acme", ApplicationSpec::default());
        nameless.metadata.name = None;
        store.put_as("globex", nameless);
        let cache = cache(300);

        cache.get_or_fetch("acme", &store).await.unwrap();
        cache.get_or_fetch("acme", &store).await.unwrap();
        assert_eq!(store.calls(), 2);

        cache.get_or_fetch("globex", &store).await.unwrap();
        cache.get_or_fetch("globex", &store).await.unwrap();
        assert_eq!(store.calls(), 4);

        // Refetched records stay poisoned until swept
        assert_eq!(sweep(&cache.entries, Instant::now()).await, 2);
        assert!(cache.is_empty().await);
    }
}
