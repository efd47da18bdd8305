//! End-to-end tests of the import command over encoded fixtures.

use mailstore_cli::config::IdFormat;
use mailstore_cli::error::AppError;
use mailstore_cli::import::{self, ImportReport};
use mailstore_core::codec::EventCodec;
use mailstore_core::error::DecodeError;
use mailstore_test_support::fixtures;
use serde_json::json;

fn ndjson(lines: impl IntoIterator<Item = String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

#[tokio::test]
async fn test_imports_every_variant_and_reports_versions() {
    // Arrange
    let codec = IdFormat::Numeric.codec();
    let mut events = fixtures::events_of("agg-1", 0, fixtures::all_payloads());
    events.extend(fixtures::events_of("agg-2", 4, [fixtures::mailbox_added()]));
    let input = ndjson(events.iter().map(|event| codec.encode_to_string(event)));

    // Act
    let report = import::run(input.as_bytes(), IdFormat::Numeric).await.unwrap();

    // Assert
    assert_eq!(report.events, 13);
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({"events": 13, "aggregates": {"agg-1": 11, "agg-2": 4}})
    );
}

#[tokio::test]
async fn test_numeric_log_is_rejected_as_uuid_log() {
    // Arrange
    let codec = IdFormat::Numeric.codec();
    let events = fixtures::events_of("agg-1", 0, [fixtures::mailbox_added()]);
    let input = ndjson(events.iter().map(|event| codec.encode_to_string(event)));

    // Act
    let err = import::run(input.as_bytes(), IdFormat::Uuid).await.unwrap_err();

    // Assert
    match err {
        AppError::Decode { line, source } => {
            assert_eq!(line, 1);
            assert_eq!(source.path, "MailboxAdded.mailboxId");
        }
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_field_is_reported_with_line_and_path() {
    // Arrange
    let codec = IdFormat::Numeric.codec();
    let events = fixtures::events_of("agg-1", 0, [fixtures::mailbox_added(), fixtures::flags_updated()]);
    let mut lines: Vec<String> = events.iter().map(|event| codec.encode_to_string(event)).collect();
    let mut broken = codec.encode(&events[1]);
    broken["FlagsUpdated"].as_object_mut().unwrap().remove("sessionId");
    lines[1] = broken.to_string();

    // Act
    let err = import::run(ndjson(lines).as_bytes(), IdFormat::Numeric)
        .await
        .unwrap_err();

    // Assert
    match err {
        AppError::Decode { line, source } => {
            assert_eq!(line, 2);
            assert_eq!(source, DecodeError::missing("FlagsUpdated.sessionId"));
        }
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_log_yields_empty_report() {
    let report = import::run("\n\n".as_bytes(), IdFormat::Uuid).await.unwrap();

    assert_eq!(report, ImportReport::default());
}
