// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Payload commands. Each writes its report to the given writer so the
//! binary can hand in stdout and tests a buffer.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;
use tv_config::Settings;
use tv_fetch::{PayloadClient, PayloadFetch, PayloadQuery};
use tv_payload::{RawPayload, unknown_keys};
use tv_session::{PayloadController, SessionSnapshot, SessionStore, UploadSource};

use crate::summary::Summary;

pub mod config;

#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Payload JSON file
    pub file: PathBuf,
    /// Path prefix stripped from recorded spec paths
    #[arg(long)]
    pub prefix: Option<String>,
    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Viewer URL, query string (`payload=...&pathPrefix=...`) or payload URL
    pub location: String,
    /// Path prefix used when the query has no `pathPrefix`
    #[arg(long)]
    pub prefix: Option<String>,
    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Payload JSON file
    pub file: PathBuf,
}

fn controller(settings: &Settings, fetcher: Arc<dyn PayloadFetch>) -> PayloadController {
    PayloadController::new(SessionStore::new(), fetcher)
        .with_default_prefix(settings.filepath_prefix.clone())
}

fn report(
    snapshot: &SessionSnapshot,
    settings: &Settings,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let summary = Summary::from_snapshot(snapshot, settings.editor_root.as_deref());
    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
    } else {
        write!(out, "{summary}")?;
    }
    Ok(())
}

impl OpenArgs {
    pub async fn run(self, settings: &Settings, out: &mut impl Write) -> Result<()> {
        let source = UploadSource::from_path(&self.file)
            .await
            .with_context(|| format!("opening {}", self.file.display()))?;
        let controller = controller(settings, Arc::new(PayloadClient::new()?));
        controller.upload(&source)?;
        report(&controller.store().snapshot(), settings, self.json, out)
    }
}

impl FetchArgs {
    pub async fn run(self, settings: &Settings, out: &mut impl Write) -> Result<()> {
        self.run_with(settings, Arc::new(PayloadClient::new()?), out).await
    }

    pub async fn run_with(
        self,
        settings: &Settings,
        fetcher: Arc<dyn PayloadFetch>,
        out: &mut impl Write,
    ) -> Result<()> {
        let query = PayloadQuery::from_location(&self.location);
        if query.payload().is_none() {
            bail!("no payload URL in '{}'", self.location);
        }
        let controller = controller(settings, fetcher);
        controller.on_query_changed(&query).await?;
        report(&controller.store().snapshot(), settings, self.json, out)
    }
}

impl ValidateArgs {
    pub async fn run(self, out: &mut impl Write) -> Result<()> {
        let bytes = tokio::fs::read(&self.file)
            .await
            .with_context(|| format!("reading {}", self.file.display()))?;
        let raw = RawPayload::from_slice(&bytes)
            .with_context(|| format!("decoding {}", self.file.display()))?;
        let unknown = unknown_keys(&raw);
        if unknown.is_empty() {
            info!(file = %self.file.display(), "payload valid");
            writeln!(out, "valid: {} recognized key(s)", raw.keys().count())?;
            return Ok(());
        }
        writeln!(out, "invalid: unknown top-level key(s): {}", unknown.join(", "))?;
        bail!("{} is not a valid payload", self.file.display())
    }
}
