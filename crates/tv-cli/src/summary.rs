// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Header and badge counters of a loaded payload, as plain text or JSON.

use std::fmt;

use serde::Serialize;
use tv_payload::{SourceLocation, editor_uri};
use tv_session::{Origin, SessionSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub origin: Option<Origin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<TestHeader>,
    pub counts: Counts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestHeader {
    pub spec: String,
    pub title: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    pub source_location: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_link: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub events: usize,
    pub frames: usize,
    pub network: usize,
    pub console: usize,
}

impl Summary {
    pub fn from_snapshot(snapshot: &SessionSnapshot, editor_root: Option<&str>) -> Self {
        let test = snapshot.meta().map(|meta| TestHeader {
            spec: meta.spec.clone(),
            title: meta.title_path(),
            state: meta.state.to_string(),
            attempt: meta.display_attempt(),
            source_location: meta.source_location.clone(),
            editor_link: editor_uri(editor_root, &meta.source_location.absolute_file),
        });
        Self {
            origin: snapshot.origin.clone(),
            test,
            counts: Counts {
                events: snapshot.events().len(),
                frames: snapshot.replay_frames().len(),
                network: snapshot.archive_entry_count(),
                console: snapshot.log_count(),
            },
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            Some(origin) => writeln!(f, "{:<9}{} ({})", "Origin:", origin, origin.kind)?,
            None => writeln!(f, "{:<9}none", "Origin:")?,
        }
        if let Some(test) = &self.test {
            writeln!(f, "{:<9}{}", "Spec:", test.spec)?;
            writeln!(f, "{:<9}{}", "Test:", test.title)?;
            writeln!(f, "{:<9}{}", "State:", test.state)?;
            if let Some(attempt) = test.attempt {
                writeln!(f, "{:<9}{}", "Attempt:", attempt)?;
            }
            let location = &test.source_location;
            if !location.absolute_file.is_empty() {
                writeln!(
                    f,
                    "{:<9}{}:{}:{}",
                    "Source:", location.absolute_file, location.line, location.column
                )?;
            }
            if let Some(link) = &test.editor_link {
                writeln!(f, "{:<9}{}", "Editor:", link)?;
            }
        }
        let counts = self.counts;
        writeln!(
            f,
            "Events: {}  Frames: {}  Network: {}  Console: {}",
            counts.events, counts.frames, counts.network, counts.console
        )
    }
}
