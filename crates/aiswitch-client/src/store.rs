//! Cached read state shared by console commands

use crate::api::ConsoleApi;
use crate::Result;
use aiswitch_core::log::{LogId, LogPage, LogQuery};
use aiswitch_core::mutation::{CacheTag, Mutation, MutationAck};
use aiswitch_core::provider::Provider;
use aiswitch_core::transcript::Transcript;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Default)]
struct Cache {
    providers: Option<Vec<Provider>>,
    active_provider: Option<Option<String>>,
    /// Bumped on every invalidation; a fetch that started under an older
    /// generation must not fill the cache
    generation: u64,
}

/// Provider list and active provider, fetched once and kept until a
/// mutation invalidates them. Logs are always read through.
pub struct ConsoleStore {
    api: Arc<dyn ConsoleApi>,
    cache: RwLock<Cache>,
}

impl ConsoleStore {
    pub fn new(api: Arc<dyn ConsoleApi>) -> Self {
        Self {
            api,
            cache: RwLock::new(Cache::default()),
        }
    }

    pub fn api(&self) -> &dyn ConsoleApi {
        self.api.as_ref()
    }

    pub async fn providers(&self) -> Result<Vec<Provider>> {
        let generation = {
            let cache = self.cache.read().await;
            if let Some(providers) = &cache.providers {
                return Ok(providers.clone());
            }
            cache.generation
        };

        debug!("Provider cache miss");
        let providers = self.api.providers().await?;

        let mut cache = self.cache.write().await;
        if cache.generation == generation {
            cache.providers = Some(providers.clone());
        }
        Ok(providers)
    }

    /// Provider by id from the cached list
    pub async fn provider(&self, id: &str) -> Result<Option<Provider>> {
        Ok(self.providers().await?.into_iter().find(|p| p.id == id))
    }

    pub async fn active_provider(&self) -> Result<Option<String>> {
        let generation = {
            let cache = self.cache.read().await;
            if let Some(active) = &cache.active_provider {
                return Ok(active.clone());
            }
            cache.generation
        };

        debug!("Active provider cache miss");
        let active = self.api.active_provider().await?;

        let mut cache = self.cache.write().await;
        if cache.generation == generation {
            cache.active_provider = Some(active.clone());
        }
        Ok(active)
    }

    /// Providers and the active selection, fetched concurrently when not cached
    pub async fn overview(&self) -> Result<(Vec<Provider>, Option<String>)> {
        futures::try_join!(self.providers(), self.active_provider())
    }

    /// Drop the cached reads named by `tags`
    pub async fn invalidate(&self, tags: &[CacheTag]) {
        let mut cache = self.cache.write().await;
        cache.generation += 1;
        for tag in tags {
            match tag {
                CacheTag::Providers => cache.providers = None,
                CacheTag::ActiveProvider => cache.active_provider = None,
            }
        }
        debug!(?tags, "Cache invalidated");
    }

    /// Send a mutation, then invalidate its tags whether or not it succeeded
    pub async fn submit(&self, mutation: Mutation) -> Result<MutationAck> {
        let result = self.api.apply(&mutation).await;
        self.invalidate(mutation.invalidates()).await;
        result
    }

    /// Send a mutation on a spawned task without waiting for it
    pub fn dispatch(self: &Arc<Self>, mutation: Mutation) -> JoinHandle<Result<MutationAck>> {
        let store = Arc::clone(self);
        debug!("Dispatching {}", mutation);
        tokio::spawn(async move { store.submit(mutation).await })
    }

    pub async fn logs(&self, query: &LogQuery) -> Result<LogPage> {
        self.api.logs(query).await
    }

    /// Fetch a log entry and rebuild its transcript. An unknown id yields
    /// the core "no data" error.
    pub async fn transcript(&self, id: &LogId) -> Result<Transcript> {
        let entry = self.api.log(id).await?;
        Ok(Transcript::reconstruct(entry.as_ref())?)
    }
}
