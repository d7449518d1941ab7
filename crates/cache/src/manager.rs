use crate::{CacheError, Result, SchemaFetcher, SchemaStore};
use futures::future::{BoxFuture, FutureExt, Shared};
use query_analyzer_config::ApiKind;
use query_analyzer_schema::SchemaModel;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Key = (ApiKind, String);
type SharedLoad = Shared<BoxFuture<'static, Result<Arc<SchemaModel>>>>;

const LATEST: &str = "latest";
const UNSTABLE: &str = "unstable";

#[derive(Default)]
struct State {
    models: HashMap<Key, Arc<SchemaModel>>,
    in_flight: HashMap<Key, SharedLoad>,
}

/// Schema models keyed by `(api, version)`.
///
/// At most one load per key is in flight: concurrent callers for the same
/// key await the same fetch and receive the same result, error included. A
/// failed load is not remembered, so the next call tries again.
pub struct SchemaCache<F> {
    fetcher: Arc<F>,
    store: Option<SchemaStore>,
    state: Mutex<State>,
}

impl<F: SchemaFetcher> SchemaCache<F> {
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Persist fetched schemas and read them back on later runs.
    #[must_use]
    pub fn with_store(mut self, store: SchemaStore) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn store(&self) -> Option<&SchemaStore> {
        self.store.as_ref()
    }

    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The model for `(api, version)`.
    ///
    /// Without `force_refresh` a model already in memory is returned as is,
    /// and a disk entry is used before asking the fetcher.
    #[tracing::instrument(skip(self))]
    pub async fn get(
        &self,
        api: ApiKind,
        version: &str,
        force_refresh: bool,
    ) -> Result<Arc<SchemaModel>> {
        let key = (api, version.to_string());

        let load = {
            let mut state = self.lock();
            if !force_refresh {
                if let Some(model) = state.models.get(&key) {
                    tracing::debug!("Schema cache hit (memory)");
                    return Ok(Arc::clone(model));
                }
            }
            if let Some(load) = state.in_flight.get(&key) {
                tracing::debug!("Joining in-flight schema load");
                load.clone()
            } else {
                let load = self.load(key.clone(), force_refresh).boxed().shared();
                state.in_flight.insert(key.clone(), load.clone());
                load
            }
        };

        let result = load.clone().await;

        let mut state = self.lock();
        if state
            .in_flight
            .get(&key)
            .is_some_and(|current| current.ptr_eq(&load))
        {
            state.in_flight.remove(&key);
            if let Ok(model) = &result {
                state.models.insert(key, Arc::clone(model));
            }
        }
        result
    }

    fn load(
        &self,
        (api, version): Key,
        force_refresh: bool,
    ) -> impl Future<Output = Result<Arc<SchemaModel>>> + Send + 'static {
        let fetcher = Arc::clone(&self.fetcher);
        let store = self.store.clone();

        async move {
            if !force_refresh {
                if let Some(model) = load_from_store(store.as_ref(), api, &version) {
                    return Ok(Arc::new(model));
                }
            }

            tracing::info!(%api, %version, "Fetching schema");
            let bytes = fetcher.fetch(api, &version).await.inspect_err(|e| {
                tracing::warn!(%api, %version, error = %e, "Schema fetch failed");
            })?;
            let model = SchemaModel::from_json_slice(&bytes)?;

            if let Some(store) = &store {
                if let Err(e) = store.save(api, &version, &bytes) {
                    tracing::warn!(error = %e, "Failed to write schema cache");
                }
            }
            Ok(Arc::new(model))
        }
    }

    /// Turn a version spec into a concrete version.
    ///
    /// `unstable` and explicit versions pass through. `latest` is the first
    /// supported version the fetcher lists, skipping `unstable`.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_version(&self, api: ApiKind, spec: &str) -> Result<String> {
        if spec != LATEST {
            return Ok(spec.to_string());
        }

        let versions = self.fetcher.available_versions(api).await?;
        let latest = versions
            .into_iter()
            .find(|v| v.supported && v.handle != UNSTABLE)
            .map(|v| v.handle)
            .ok_or_else(|| CacheError::Fetch("No supported versions found".to_string()))?;
        tracing::debug!(%latest, "Resolved latest version");
        Ok(latest)
    }
}

/// A usable disk entry, or `None` when missing or unusable.
fn load_from_store(store: Option<&SchemaStore>, api: ApiKind, version: &str) -> Option<SchemaModel> {
    let bytes = match store?.load(api, version) {
        Ok(bytes) => bytes?,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read schema cache");
            return None;
        }
    };
    match SchemaModel::from_json_slice(&bytes) {
        Ok(model) => {
            tracing::debug!("Schema cache hit (disk)");
            Some(model)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unusable cached schema");
            None
        }
    }
}
