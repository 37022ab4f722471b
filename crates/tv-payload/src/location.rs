// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Maps the absolute spec path recorded on the CI agent back to a path
//! relative to the project checkout.

use serde_json::Value;

use crate::model::SourceLocation;

/// Path segments that mark the root of a project-relative path when no
/// prefix is configured. `libs` is preferred over `apps`.
const ANCHOR_SEGMENTS: [&str; 2] = ["libs", "apps"];

/// Local checkout root used for editor links when none is configured.
pub const DEFAULT_EDITOR_ROOT: &str = "c:/git";

/// Resolves stack-trace file paths with an optional configured prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationResolver {
    prefix: Option<String>,
}

impl LocationResolver {
    /// Resolver that relies on the `libs`/`apps` anchor search only.
    pub fn anchored() -> Self {
        Self::default()
    }

    /// Resolver that strips `prefix` first. Blank prefixes are ignored.
    pub fn with_prefix(prefix: Option<&str>) -> Self {
        let prefix = prefix
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| p.replace('\\', "/"));
        Self { prefix }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn resolve(&self, absolute_file: Option<&str>) -> Option<String> {
        resolve(self.prefix(), absolute_file)
    }

    /// Derive the source location from a parsed stack.
    ///
    /// The file, the line and the column are each taken from the first frame
    /// that carries them, so they may come from different frames. Frames with
    /// an empty `absoluteFile` are skipped.
    pub fn locate(&self, stack: Option<&[Value]>) -> SourceLocation {
        let frames = stack.unwrap_or_default();
        let absolute_file = frames.iter().find_map(|frame| {
            frame.get("absoluteFile").and_then(Value::as_str).filter(|path| !path.is_empty())
        });

        SourceLocation {
            absolute_file: self.resolve(absolute_file).unwrap_or_default(),
            line: first_position(frames, "line"),
            column: first_position(frames, "column"),
        }
    }
}

fn first_position(frames: &[Value], field: &str) -> u32 {
    frames
        .iter()
        .find_map(|frame| frame.get(field).and_then(Value::as_u64))
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1)
}

/// Resolve `absolute_file` to a project-relative path.
///
/// Returns `Some("")` when there is no path at all and `None` when neither
/// the prefix nor an anchor segment matches.
pub fn resolve(prefix: Option<&str>, absolute_file: Option<&str>) -> Option<String> {
    let Some(path) = absolute_file else {
        return Some(String::new());
    };
    let path = path.replace('\\', "/");

    if let Some(prefix) = prefix.map(str::trim).filter(|p| !p.is_empty()) {
        let prefix = prefix.replace('\\', "/");
        if let Some(rest) = path.strip_prefix(&prefix) {
            if prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/') {
                return Some(rest.trim_start_matches('/').to_string());
            }
        }
    }

    let segments: Vec<&str> = path.split('/').collect();
    let start = ANCHOR_SEGMENTS
        .iter()
        .find_map(|anchor| segments.iter().position(|segment| segment == anchor))?;
    Some(segments[start..].join("/"))
}

/// Editor deep link for a resolved relative path, e.g.
/// `vscode://file/c:/git/libs/x/y.ts`.
pub fn editor_uri(root: Option<&str>, relative: &str) -> Option<String> {
    if relative.is_empty() {
        return None;
    }
    let root = root.map(str::trim).filter(|r| !r.is_empty()).unwrap_or(DEFAULT_EDITOR_ROOT);
    Some(format!(
        "vscode://file/{}/{}",
        root.trim_end_matches(['/', '\\']),
        relative.trim_start_matches('/')
    ))
}
