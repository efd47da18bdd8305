//! JSON codec for mailbox events.
//!
//! Every document is a single-key object: the key is the event's
//! discriminator, the value holds `eventId`, `aggregateId` and the
//! variant-specific fields. Field names and value grammars are a durable
//! contract shared with every reader of the event log.

mod fields;
mod timestamp;
mod values;
mod variants;

use std::fmt;
use std::sync::Arc;

use mailstore_core::codec::EventCodec;
use mailstore_core::error::{DecodeError, DecodeErrorKind};
use mailstore_core::event::{AggregateId, Event, EventId};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::events::MailboxEvent;
use crate::domain::ids::{IdFactory, MailboxId, MessageId};
use fields::{Fields, as_object, as_str};
use values::malformed_at;

/// Codec between [`MailboxEvent`]s and their JSON documents.
///
/// Identifier strings are validated by the injected factories, so a codec
/// must be configured with the factories of the backend that produced the
/// documents.
#[derive(Clone)]
pub struct MailboxEventCodec {
    mailbox_ids: Arc<dyn IdFactory<MailboxId>>,
    message_ids: Arc<dyn IdFactory<MessageId>>,
}

impl MailboxEventCodec {
    /// Creates a codec with distinct factories for mailbox and message ids.
    #[must_use]
    pub fn new(
        mailbox_ids: Arc<dyn IdFactory<MailboxId>>,
        message_ids: Arc<dyn IdFactory<MessageId>>,
    ) -> Self {
        Self {
            mailbox_ids,
            message_ids,
        }
    }

    /// Creates a codec whose mailbox and message ids share one factory.
    #[must_use]
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: IdFactory<MailboxId> + IdFactory<MessageId> + 'static,
    {
        let factory = Arc::new(factory);
        Self {
            mailbox_ids: factory.clone(),
            message_ids: factory,
        }
    }

    pub(crate) fn mailbox_id(&self, path: &str, value: &Value) -> Result<MailboxId, DecodeError> {
        self.mailbox_ids
            .from_string(as_str(path, value)?)
            .map_err(malformed_at(path))
    }

    pub(crate) fn message_id(&self, path: &str, value: &Value) -> Result<MessageId, DecodeError> {
        self.message_ids
            .from_string(as_str(path, value)?)
            .map_err(malformed_at(path))
    }

    fn decode_document(&self, document: &Value) -> Result<Event<MailboxEvent>, DecodeError> {
        let root = as_object("$", document)?;
        let mut entries = root.iter();
        let (Some((discriminator, body)), None) = (entries.next(), entries.next()) else {
            return Err(DecodeError::malformed(
                "$",
                format!("expected a single discriminator key, found {}", root.len()),
            ));
        };
        let decode_payload = variants::decoder_for(discriminator).ok_or_else(|| {
            DecodeError::new("$", DecodeErrorKind::UnknownVariant(discriminator.clone()))
        })?;

        let fields = Fields::of(discriminator.as_str(), body)?;
        let event_id = EventId::of(fields.u64("eventId")?);
        let aggregate_id = fields.required("aggregateId", |path, value| {
            AggregateId::new(as_str(path, value)?).map_err(malformed_at(path))
        })?;
        let payload = decode_payload(self, &fields)?;
        Ok(Event::new(event_id, aggregate_id, payload))
    }
}

impl fmt::Debug for MailboxEventCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailboxEventCodec").finish_non_exhaustive()
    }
}

impl EventCodec for MailboxEventCodec {
    type Payload = MailboxEvent;

    fn encode(&self, event: &Event<MailboxEvent>) -> Value {
        let mut body = variants::encode_payload(event.payload());
        body.insert("eventId".into(), Value::from(event.event_id().value()));
        body.insert(
            "aggregateId".into(),
            Value::String(event.aggregate_id().as_str().to_owned()),
        );
        let mut document = Map::new();
        document.insert(event.payload().event_type().to_owned(), Value::Object(body));
        Value::Object(document)
    }

    fn decode(&self, document: &Value) -> Result<Event<MailboxEvent>, DecodeError> {
        self.decode_document(document)
            .inspect_err(|err| debug!(error = %err, "event document rejected"))
    }
}
