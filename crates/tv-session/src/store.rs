// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Single source of truth for the currently loaded payload.
//!
//! The store publishes immutable [`SessionSnapshot`]s through a
//! `tokio::sync::watch` channel. Every transition replaces the snapshot
//! wholesale, so a reader sees either the previous payload or the next one,
//! never a mix. Load intents are numbered with a [`Generation`]; a fetch
//! result carrying an older generation than the latest intent is dropped.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info};
use tv_payload::{
    Archive, BrowserLogs, CanonicalModel, Event, Frame, LocationResolver, Metadata, RawPayload,
    admit,
};

use crate::error::{Result, SessionError};

/// How the current payload reached the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    /// Downloaded from the URL in the `payload` query parameter.
    Fetch,
    /// Read from a file the user picked.
    Upload,
}

impl fmt::Display for OriginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::Upload => "upload",
        })
    }
}

/// Human-meaningful label of the loaded payload: the source URL or filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub label: String,
    pub kind: OriginKind,
}

impl Origin {
    pub fn fetch(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: OriginKind::Fetch,
        }
    }

    pub fn upload(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: OriginKind::Upload,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Monotonic number identifying one load intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Immutable view of the session that panels render from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub origin: Option<Origin>,
    #[serde(flatten)]
    model: Arc<CanonicalModel>,
    pub selected_event: Option<usize>,
    /// A fetch is in flight.
    pub loading: bool,
}

impl SessionSnapshot {
    pub fn model(&self) -> &CanonicalModel {
        &self.model
    }

    pub fn is_loaded(&self) -> bool {
        self.origin.is_some()
    }

    pub fn events(&self) -> &[Event] {
        &self.model.events
    }

    pub fn replay_frames(&self) -> &[Frame] {
        &self.model.replay_frames
    }

    pub fn archive(&self) -> Option<&Archive> {
        self.model.archive.as_ref()
    }

    pub fn meta(&self) -> Option<&Metadata> {
        self.model.meta.as_ref()
    }

    pub fn browser_logs(&self) -> Option<&BrowserLogs> {
        self.model.browser_logs.as_ref()
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.selected_event.and_then(|index| self.model.events.get(index))
    }

    /// Console badge: log entries plus runtime console calls.
    pub fn log_count(&self) -> usize {
        self.model.log_count()
    }

    /// Network badge: archive entries, 0 without an archive.
    pub fn archive_entry_count(&self) -> usize {
        self.model.archive_entry_count()
    }
}

/// Result of handing a payload to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The payload became the current one.
    Applied(SessionSnapshot),
    /// A newer intent superseded this one; nothing changed.
    Discarded,
    /// The store was reset.
    Cleared,
    /// Nothing to do.
    Unchanged,
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

struct Inner {
    state: watch::Sender<SessionSnapshot>,
    latest: AtomicU64,
}

/// Shared handle to the session state; clones refer to the same store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("latest", &self.latest_generation())
            .field("origin", &self.snapshot().origin)
            .finish()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                state,
                latest: AtomicU64::new(0),
            }),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn latest_generation(&self) -> Generation {
        Generation(self.inner.latest.load(Ordering::SeqCst))
    }

    /// Register a new load intent, superseding every earlier one.
    pub fn next_generation(&self) -> Generation {
        Generation(self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest_generation() == generation
    }

    /// Validate, normalize and install `raw` as the current payload.
    ///
    /// Only an admitted payload supersedes earlier intents; a rejected one
    /// leaves a pending fetch running.
    pub fn load(
        &self,
        origin: Origin,
        raw: RawPayload,
        resolver: &LocationResolver,
    ) -> Result<LoadOutcome> {
        let model = admit(raw, resolver).inspect_err(|err| {
            error!(origin = %origin, error = %err, "payload rejected");
        })?;
        let generation = self.next_generation();
        Ok(self.install(generation, origin, model))
    }

    /// Install `raw` if `generation` is still the latest intent.
    ///
    /// Validation failures leave the payload untouched; only the loading
    /// flag of the failed intent is dropped.
    pub fn apply(
        &self,
        generation: Generation,
        origin: Origin,
        raw: RawPayload,
        resolver: &LocationResolver,
    ) -> Result<LoadOutcome> {
        if !self.is_current(generation) {
            debug!(
                generation = generation.get(),
                latest = self.latest_generation().get(),
                origin = %origin,
                "discarding superseded payload"
            );
            return Ok(LoadOutcome::Discarded);
        }

        let model = match admit(raw, resolver) {
            Ok(model) => model,
            Err(err) => {
                error!(origin = %origin, error = %err, "payload rejected");
                self.finish_loading(generation);
                return Err(err.into());
            }
        };
        Ok(self.install(generation, origin, model))
    }

    fn install(
        &self,
        generation: Generation,
        origin: Origin,
        model: CanonicalModel,
    ) -> LoadOutcome {
        let next = SessionSnapshot {
            origin: Some(origin),
            model: Arc::new(model),
            selected_event: None,
            loading: false,
        };
        let mut applied = None;
        self.inner.state.send_if_modified(|state| {
            // Re-check under the channel lock; a clear may have raced us.
            if self.latest_generation() != generation {
                return false;
            }
            *state = next.clone();
            applied = Some(next.clone());
            true
        });

        match applied {
            Some(snapshot) => {
                let label = snapshot.origin.as_ref().map(|o| o.label.as_str());
                info!(
                    origin = label.unwrap_or_default(),
                    events = snapshot.events().len(),
                    frames = snapshot.replay_frames().len(),
                    network = snapshot.archive_entry_count(),
                    logs = snapshot.log_count(),
                    "payload loaded"
                );
                LoadOutcome::Applied(snapshot)
            }
            None => LoadOutcome::Discarded,
        }
    }

    /// Reset origin and every model field; also cancels in-flight fetches.
    pub fn clear(&self) -> LoadOutcome {
        self.next_generation();
        self.inner.state.send_replace(SessionSnapshot::default());
        info!("payload cleared");
        LoadOutcome::Cleared
    }

    /// React to the driving query parameter becoming absent or blank.
    ///
    /// A fetch-origin payload is cleared. An upload-origin payload stays, but
    /// any fetch still in flight is cancelled.
    pub fn on_query_absent(&self) -> LoadOutcome {
        let snapshot = self.snapshot();
        match snapshot.origin {
            Some(Origin {
                kind: OriginKind::Fetch,
                ..
            }) => self.clear(),
            _ if snapshot.loading => {
                let generation = self.next_generation();
                self.inner.state.send_modify(|state| state.loading = false);
                debug!(generation = generation.get(), "pending fetch cancelled");
                LoadOutcome::Unchanged
            }
            _ => LoadOutcome::Unchanged,
        }
    }

    /// Start a fetch intent and raise the loading flag.
    pub fn begin_fetch(&self) -> Generation {
        let generation = self.next_generation();
        self.inner.state.send_if_modified(|state| {
            if state.loading {
                return false;
            }
            state.loading = true;
            true
        });
        generation
    }

    /// Drop the loading flag if `generation` is still the latest intent.
    pub fn finish_loading(&self, generation: Generation) {
        self.inner.state.send_if_modified(|state| {
            if !state.loading || self.latest_generation() != generation {
                return false;
            }
            state.loading = false;
            true
        });
    }

    /// Select the event at `index`, or clear the selection with `None`.
    pub fn select_event(&self, index: Option<usize>) -> Result<()> {
        let len = self.inner.state.borrow().events().len();
        if let Some(index) = index {
            if index >= len {
                return Err(SessionError::SelectionOutOfRange { index, len });
            }
        }
        self.inner.state.send_if_modified(|state| {
            if state.selected_event == index {
                return false;
            }
            state.selected_event = index;
            true
        });
        Ok(())
    }
}
