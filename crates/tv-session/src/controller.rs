// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Drives acquisition sources into the session store.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use tv_fetch::{PayloadFetch, PayloadQuery};
use tv_payload::LocationResolver;

use crate::error::Result;
use crate::source::{FetchSource, UploadSource};
use crate::store::{LoadOutcome, SessionStore};

/// Reacts to query parameter changes and uploads.
///
/// Cloning is cheap; clones share the store and the fetcher.
#[derive(Clone)]
pub struct PayloadController {
    store: SessionStore,
    fetcher: Arc<dyn PayloadFetch>,
    default_prefix: Option<String>,
}

impl fmt::Debug for PayloadController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadController")
            .field("store", &self.store)
            .field("default_prefix", &self.default_prefix)
            .finish_non_exhaustive()
    }
}

impl PayloadController {
    pub fn new(store: SessionStore, fetcher: Arc<dyn PayloadFetch>) -> Self {
        Self {
            store,
            fetcher,
            default_prefix: None,
        }
    }

    /// Persisted `filepath-prefix` preference, used when the query has none.
    pub fn with_default_prefix(mut self, prefix: Option<String>) -> Self {
        self.default_prefix = prefix.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Resolver for `query`: its `pathPrefix` wins over the default.
    pub fn resolver_for(&self, query: &PayloadQuery) -> LocationResolver {
        LocationResolver::with_prefix(query.path_prefix().or(self.default_prefix.as_deref()))
    }

    /// Handle a new set of query parameters.
    ///
    /// An absent payload value applies the store's reactive clearing rule. A
    /// malformed one is reported without touching the store. Otherwise the
    /// payload is fetched once and applied unless a newer intent arrived
    /// meanwhile.
    pub async fn on_query_changed(&self, query: &PayloadQuery) -> Result<LoadOutcome> {
        let url = match query.payload_url() {
            Ok(Some(url)) => url,
            Ok(None) => return Ok(self.store.on_query_absent()),
            Err(err) => {
                error!(error = %err, "ignoring payload parameter");
                return Err(err.into());
            }
        };

        let label = query.payload().unwrap_or_default();
        let resolver = self.resolver_for(query);
        let generation = self.store.begin_fetch();
        info!(origin = label, generation = generation.get(), "fetching payload");

        let source = FetchSource::new(url, label, Arc::clone(&self.fetcher));
        match source.acquire().await {
            Ok(acquired) => {
                self.store.apply(generation, acquired.origin, acquired.payload, &resolver)
            }
            Err(err) if self.store.is_current(generation) => {
                error!(origin = label, error = %err, "payload fetch failed");
                self.store.finish_loading(generation);
                Err(err)
            }
            Err(err) => {
                debug!(origin = label, error = %err, "superseded fetch failed");
                Ok(LoadOutcome::Discarded)
            }
        }
    }

    /// Run [`Self::on_query_changed`] on the runtime without waiting for it.
    pub fn spawn_query_changed(&self, query: PayloadQuery) -> JoinHandle<Result<LoadOutcome>> {
        let controller = self.clone();
        tokio::spawn(async move { controller.on_query_changed(&query).await })
    }

    /// Load a user-supplied file. Supersedes any fetch still in flight.
    pub fn upload(&self, source: &UploadSource) -> Result<LoadOutcome> {
        let acquired = source.acquire().inspect_err(|err| {
            error!(origin = %source.file_name, error = %err, "upload rejected");
        })?;
        let resolver = LocationResolver::with_prefix(self.default_prefix.as_deref());
        self.store.load(acquired.origin, acquired.payload, &resolver)
    }

    pub fn clear(&self) -> LoadOutcome {
        self.store.clear()
    }
}
