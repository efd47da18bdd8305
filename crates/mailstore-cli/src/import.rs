//! Loading an event log into a store.

use std::collections::BTreeMap;
use std::sync::Arc;

use mailstore_core::codec::EventCodec;
use mailstore_core::store::EventStore;
use mailstore_event_store::{InMemoryEventBackend, SerializingEventStore};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, instrument};

use crate::config::IdFormat;
use crate::error::AppError;

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Number of events stored.
    pub events: usize,
    /// Version reached by each aggregate, by aggregate id.
    pub aggregates: BTreeMap<String, u64>,
}

/// Decodes every non-blank line of `reader` with `codec` and appends it to
/// `store`, one event per batch.
///
/// Returns the number of events appended.
///
/// # Errors
///
/// Stops at the first line that cannot be read, decoded or appended.
#[instrument(skip_all)]
pub async fn import<R, C, S>(reader: R, codec: &C, store: &S) -> Result<usize, AppError>
where
    R: AsyncBufRead + Unpin,
    C: EventCodec,
    S: EventStore<Payload = C::Payload>,
{
    let mut lines = reader.lines();
    let mut line = 0;
    let mut appended = 0;
    while let Some(text) = lines.next_line().await? {
        line += 1;
        if text.trim().is_empty() {
            continue;
        }
        let event = codec
            .decode_str(&text)
            .map_err(|source| AppError::Decode { line, source })?;
        debug!(line, aggregate_id = %event.aggregate_id(), event_id = %event.event_id(), "decoded");
        store
            .append(vec![event])
            .await
            .map_err(|source| AppError::Rejected { line, source })?;
        appended += 1;
    }
    info!(events = appended, "import complete");
    Ok(appended)
}

/// Reads every aggregate of `backend` back through `store`.
///
/// # Errors
///
/// Returns `AppError::Store` if a stored document no longer decodes or the
/// backend fails.
pub async fn report<S>(backend: &InMemoryEventBackend, store: &S) -> Result<ImportReport, AppError>
where
    S: EventStore,
{
    let mut report = ImportReport::default();
    for aggregate_id in backend.aggregate_ids()? {
        let history = store.get_events_of_aggregate(&aggregate_id).await?;
        report.events += history.len();
        if let Some(version) = history.version() {
            report
                .aggregates
                .insert(aggregate_id.as_str().to_owned(), version.value());
        }
    }
    Ok(report)
}

/// Imports `reader` into a fresh in-memory store and reports what it holds.
///
/// # Errors
///
/// See [`import`] and [`report`].
pub async fn run<R>(reader: R, id_format: IdFormat) -> Result<ImportReport, AppError>
where
    R: AsyncBufRead + Unpin,
{
    let codec = id_format.codec();
    let backend = Arc::new(InMemoryEventBackend::new());
    let store = SerializingEventStore::new(Arc::clone(&backend), codec.clone());

    import(reader, &codec, &store).await?;
    report(&backend, &store).await
}

#[cfg(test)]
mod tests {
    use mailstore_core::error::{DecodeErrorKind, DomainError};

    use super::*;

    const ADDED: &str = r##"{"MailboxAdded":{"eventId":0,"aggregateId":"agg-1","mailboxPath":{"namespace":"#private","user":"bob","name":"INBOX"},"mailboxId":"18","user":"bob","sessionId":42}}"##;

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        // Arrange
        let input = format!("\n{ADDED}\n   \n");

        // Act
        let report = run(input.as_bytes(), IdFormat::Numeric).await.unwrap();

        // Assert
        assert_eq!(report.events, 1);
        assert_eq!(report.aggregates, BTreeMap::from([("agg-1".to_owned(), 0)]));
    }

    #[tokio::test]
    async fn test_decode_failure_names_line() {
        let input = format!("{ADDED}\n{{\"Nope\":{{}}}}\n");

        let err = run(input.as_bytes(), IdFormat::Numeric).await.unwrap_err();

        match err {
            AppError::Decode { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(source.kind, DecodeErrorKind::UnknownVariant("Nope".to_owned()));
            }
            other => panic!("expected a decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repeated_event_is_rejected() {
        let input = format!("{ADDED}\n{ADDED}\n");

        let err = run(input.as_bytes(), IdFormat::Numeric).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Rejected {
                line: 2,
                source: DomainError::OptimisticConcurrencyConflict { .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_input_reports_nothing() {
        let report = run(&b""[..], IdFormat::Uuid).await.unwrap();

        assert_eq!(report, ImportReport::default());
    }
}
