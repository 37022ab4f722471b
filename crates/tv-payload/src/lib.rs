// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Payload model, validation and normalization for the trace viewer.
//!
//! A payload is the bundle written by the Cypress debugger plugin: UI
//! events (`cy`), replay frames (`rr`), an HTTP archive (`har`), browser
//! console logs and test metadata. Untrusted input enters as a
//! [`RawPayload`], passes the key gate in [`validate`], and leaves
//! [`normalize`] as a [`CanonicalModel`].

mod error;
pub mod location;
mod model;
mod normalize;
mod validate;

pub use error::{PayloadError, Result};
pub use location::{LocationResolver, editor_uri};
pub use model::*;
pub use normalize::normalize;
pub use validate::{RECOGNIZED_KEYS, ensure_valid, is_recognized_key, unknown_keys, validate};

/// Validate and normalize in one step. Rejected payloads never reach the
/// normalizer.
pub fn admit(raw: RawPayload, resolver: &LocationResolver) -> Result<CanonicalModel> {
    ensure_valid(&raw)?;
    Ok(normalize(raw, resolver))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const FAILING_RUN: &str = r#"
{
  "id": "run-1",
  "meta": {
    "spec": "connectors-form-validation.cy.ts",
    "test": ["Connectors", "form", "rejects empty name"],
    "state": "failed",
    "retryAttempt": 1,
    "absoluteFile": "/should/be/overwritten",
    "duration": 1234
  },
  "cy": [
    {"id": "log-1", "payload": {"name": "visit"}},
    {"id": "log-2", "payload": {"name": "get", "err": {
      "message": "Timed out",
      "parsedStack": [
        {"message": "AssertionError"},
        {"absoluteFile": "/var/vsts/agent-1/1/s/libs/smc/connectors/e2e/form.cy.ts", "column": 12},
        {"line": 88}
      ]
    }}},
    {"id": "log-3", "payload": {"name": "click", "err": {"parsedStack": [
      {"absoluteFile": "/elsewhere/apps/other.ts", "line": 1, "column": 1}
    ]}}}
  ],
  "rr": [{"type": 4}, {"type": 2}, {"type": 3}],
  "har": {"log": {"entries": [{"request": {}}, {"request": {}}]}},
  "pluginMeta": {"version": "1.0.0"},
  "browserLogs": {
    "logEntry": [{"text": "a"}],
    "runtimeConsoleApiCalled": [{"type": "log"}, {"type": "warn"}]
  }
}
"#;

    #[test]
    fn validate_accepts_recognized_keys_only() {
        let good = RawPayload::from_json_str(FAILING_RUN).expect("decode");
        assert!(validate(&good));

        let mut bad = good.clone();
        bad.insert("screenshots", json!([]));
        bad.insert("extra", json!(null));
        assert!(!validate(&bad));
        assert_eq!(unknown_keys(&bad), vec!["extra".to_string(), "screenshots".to_string()]);
    }

    #[test]
    fn empty_payload_is_valid_and_normalizes_to_defaults() {
        let raw = RawPayload::from_json_str("{}").expect("decode");
        assert!(validate(&raw));

        let model = normalize(raw, &LocationResolver::anchored());
        assert!(model.events.is_empty());
        assert!(model.replay_frames.is_empty());
        assert!(model.archive.is_none());
        assert!(model.meta.is_none());
        assert!(model.browser_logs.is_none());
        assert!(model.is_empty());
    }

    #[test]
    fn validation_ignores_value_shapes() {
        let raw = RawPayload::from_value(json!({"cy": 5, "meta": "text", "har": false}))
            .expect("object payload");
        assert!(validate(&raw));

        let model = normalize(raw, &LocationResolver::anchored());
        assert!(model.events.is_empty());
        assert_eq!(model.meta.as_ref().map(|m| m.spec.as_str()), Some(""));
        assert!(model.archive.is_some());
        assert_eq!(model.archive_entry_count(), 0);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = RawPayload::from_json_str("[1, 2]").unwrap_err();
        assert!(err.is_schema_rejection());
        assert!(err.to_string().contains("an array"));

        let err = RawPayload::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, PayloadError::Decode(_)));
        assert!(!err.is_schema_rejection());
    }

    #[test]
    fn normalize_derives_location_from_first_stack() {
        let raw = RawPayload::from_json_str(FAILING_RUN).expect("decode");
        let model = admit(raw, &LocationResolver::anchored()).expect("admit");

        assert_eq!(model.events.len(), 3);
        assert_eq!(model.events[1].id(), Some("log-2"));
        assert_eq!(model.replay_frames.len(), 3);

        let meta = model.meta.as_ref().expect("meta present");
        assert_eq!(meta.spec, "connectors-form-validation.cy.ts");
        assert_eq!(meta.title_path(), "Connectors > form > rejects empty name");
        assert_eq!(meta.state, TestState::Failed);
        assert_eq!(meta.display_attempt(), Some(2));
        assert_eq!(
            meta.source_location,
            SourceLocation {
                absolute_file: "libs/smc/connectors/e2e/form.cy.ts".into(),
                line: 88,
                column: 12,
            }
        );
        assert_eq!(meta.extra.get("duration"), Some(&json!(1234)));
        assert!(!meta.extra.contains_key("absoluteFile"));
    }

    #[test]
    fn empty_parsed_stack_is_skipped() {
        let raw = RawPayload::from_value(json!({
            "meta": {"spec": "a.cy.ts"},
            "cy": [
                {"id": "1", "payload": {"err": {"parsedStack": []}}},
                {"id": "2", "payload": {"err": {"parsedStack": [
                    {"absoluteFile": "/ci/s/libs/smc/a.cy.ts", "line": 5, "column": 6}
                ]}}}
            ]
        }))
        .expect("object payload");
        let model = admit(raw, &LocationResolver::anchored()).expect("admit");
        assert_eq!(model.events[0].parsed_stack(), None);
        assert_eq!(
            model.meta.expect("meta present").source_location,
            SourceLocation {
                absolute_file: "libs/smc/a.cy.ts".into(),
                line: 5,
                column: 6,
            }
        );
    }

    #[test]
    fn configured_prefix_takes_precedence() {
        let raw = RawPayload::from_json_str(FAILING_RUN).expect("decode");
        let resolver = LocationResolver::with_prefix(Some("/var/vsts/agent-1/1/s/libs/smc"));
        let model = admit(raw, &resolver).expect("admit");
        let meta = model.meta.expect("meta present");
        assert_eq!(meta.source_location.absolute_file, "connectors/e2e/form.cy.ts");
    }

    #[test]
    fn derived_counters_follow_the_model() {
        let raw = RawPayload::from_json_str(FAILING_RUN).expect("decode");
        let model = admit(raw, &LocationResolver::anchored()).expect("admit");
        assert_eq!(model.log_count(), 3);
        assert_eq!(model.archive_entry_count(), 2);
    }

    #[test]
    fn meta_only_payload_has_empty_location() {
        let raw = RawPayload::from_value(json!({
            "cy": [],
            "meta": {"spec": "s", "test": ["t"], "state": "passed", "retryAttempt": 0}
        }))
        .expect("object payload");
        let model = admit(raw, &LocationResolver::anchored()).expect("admit");

        assert!(model.events.is_empty());
        let meta = model.meta.expect("meta present");
        assert_eq!(meta.spec, "s");
        assert_eq!(meta.state, TestState::Passed);
        assert_eq!(meta.display_attempt(), None);
        assert_eq!(meta.source_location, SourceLocation::default());
    }

    #[test]
    fn events_without_meta_produce_no_meta() {
        let raw = RawPayload::from_value(json!({"cy": [{"payload": {}}]})).expect("object");
        let model = admit(raw, &LocationResolver::anchored()).expect("admit");
        assert_eq!(model.events.len(), 1);
        assert!(model.meta.is_none());
    }

    #[test]
    fn admit_rejects_before_normalizing() {
        let raw = RawPayload::from_value(json!({"cy": [], "video": "x.mp4"})).expect("object");
        match admit(raw, &LocationResolver::anchored()) {
            Err(PayloadError::SchemaRejected(keys)) => assert_eq!(keys, vec!["video"]),
            other => panic!("expected schema rejection, got {other:?}"),
        }
    }

    #[test]
    fn to_raw_round_trips_sequences() {
        let raw = RawPayload::from_json_str(FAILING_RUN).expect("decode");
        let resolver = LocationResolver::anchored();
        let model = admit(raw, &resolver).expect("admit");

        let again = admit(model.to_raw(), &resolver).expect("re-admit");
        assert_eq!(again.events, model.events);
        assert_eq!(again.replay_frames, model.replay_frames);
        assert_eq!(again.browser_logs, model.browser_logs);
        assert_eq!(again.archive, model.archive);
        assert_eq!(again.meta, model.meta);
    }

    #[test]
    fn unknown_state_labels_are_preserved() {
        let meta = Metadata::from_raw(json!({"state": "broken"}), SourceLocation::default());
        assert_eq!(meta.state, TestState::Unknown("broken".into()));
        assert_eq!(meta.state.to_string(), "broken");
        assert_eq!(Metadata::from_raw(json!({}), SourceLocation::default()).state, TestState::Missing);
    }
}
