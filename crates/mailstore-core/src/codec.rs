//! Event codec contract.

use crate::error::{DecodeError, DecodeErrorKind};
use crate::event::Event;

/// Bidirectional mapping between events and structured documents.
///
/// Implementations are pure: `decode(&encode(e))` must yield `e` for every
/// legally constructed event, and decoding never returns a partially
/// populated event.
pub trait EventCodec: Send + Sync {
    /// The payload this codec understands.
    type Payload;

    /// Encodes an event into its document form.
    fn encode(&self, event: &Event<Self::Payload>) -> serde_json::Value;

    /// Decodes a document back into an event.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` identifying the offending field.
    fn decode(&self, document: &serde_json::Value) -> Result<Event<Self::Payload>, DecodeError>;

    /// Encodes an event into its JSON text form.
    fn encode_to_string(&self, event: &Event<Self::Payload>) -> String {
        self.encode(event).to_string()
    }

    /// Decodes an event from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` at path `$` if `text` is not JSON, otherwise
    /// whatever `decode` reports.
    fn decode_str(&self, text: &str) -> Result<Event<Self::Payload>, DecodeError> {
        let document: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| DecodeError::new("$", DecodeErrorKind::MalformedValue(e.to_string())))?;
        self.decode(&document)
    }
}
