// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    location::LocationResolver,
    model::{
        Archive, BrowserLogs, CanonicalModel, Event, Frame, KEY_ARCHIVE, KEY_BROWSER_LOGS,
        KEY_EVENTS, KEY_META, KEY_REPLAY, Metadata, RawPayload,
    },
};

/// Build the canonical model from a payload that already passed
/// [`crate::validate`].
///
/// Total over every validated payload: recognized keys holding values of an
/// unexpected shape fall back to the empty default for that field.
pub fn normalize(raw: RawPayload, resolver: &LocationResolver) -> CanonicalModel {
    let mut fields = raw.into_map();

    let events: Vec<Event> =
        take_sequence(&mut fields, KEY_EVENTS).into_iter().map(Event::from).collect();
    let replay_frames: Vec<Frame> =
        take_sequence(&mut fields, KEY_REPLAY).into_iter().map(Frame::from).collect();
    let archive = take_present(&mut fields, KEY_ARCHIVE).map(Archive::from);

    let meta = take_present(&mut fields, KEY_META).map(|raw_meta| {
        let stack = events.iter().find_map(Event::parsed_stack);
        Metadata::from_raw(raw_meta, resolver.locate(stack))
    });

    let browser_logs =
        take_present(&mut fields, KEY_BROWSER_LOGS).and_then(BrowserLogs::from_value);

    CanonicalModel {
        events,
        replay_frames,
        archive,
        meta,
        browser_logs,
    }
}

fn take_sequence(fields: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match fields.remove(key) {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => Vec::new(),
        Some(_) => {
            debug!(key, "payload field is not a list; treating it as empty");
            Vec::new()
        }
    }
}

fn take_present(fields: &mut Map<String, Value>, key: &str) -> Option<Value> {
    fields.remove(key).filter(|value| !value.is_null())
}
