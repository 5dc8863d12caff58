use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use serde::Deserialize;

use crate::error::DecodeError;

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(default)]
    event: EventBody,
}

#[derive(Debug, Default, Deserialize)]
struct EventBody {
    #[serde(rename = "payloadData", default)]
    payload_data: PayloadData,
}

#[derive(Debug, Default, Deserialize)]
struct PayloadData {
    #[serde(rename = "eventType", default)]
    event_type: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    event: String,
}

#[derive(Debug, Deserialize)]
struct InnerEvent {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    name: String,
}

/// Outer confirmation document:
/// `{"event":{"payloadData":{"eventType":..,"timestamp":..,"event":"<base64>"}}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationEvent {
    pub event_kind: String,
    pub emitted_at_ms: i64,
    pub encoded_inner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedEntity {
    pub correlation_key: String,
    pub entity_name: String,
}

/// Decodes the outer JSON document of a confirmation message.
///
/// # Errors
///
/// Returns [`DecodeError::Envelope`] when the payload is not a JSON object of
/// the expected shape.
pub fn decode_confirmation(payload: &[u8]) -> Result<ConfirmationEvent, DecodeError> {
    let envelope: EventEnvelope =
        serde_json::from_slice(payload).map_err(|err| DecodeError::Envelope { source: err })?;
    let data = envelope.event.payload_data;
    Ok(ConfirmationEvent {
        event_kind: data.event_type,
        emitted_at_ms: data.timestamp,
        encoded_inner: data.event,
    })
}

impl ConfirmationEvent {
    /// Base64-decodes the embedded event and parses it as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error when the field is not valid base64, the decoded bytes
    /// are not the expected JSON document, or the correlation key is empty.
    pub fn decode_inner(&self) -> Result<ConfirmedEntity, DecodeError> {
        let raw = B64
            .decode(self.encoded_inner.trim().as_bytes())
            .map_err(|err| DecodeError::InnerBase64 { source: err })?;
        let inner: InnerEvent =
            serde_json::from_slice(&raw).map_err(|err| DecodeError::InnerEvent { source: err })?;
        if inner.uuid.is_empty() {
            return Err(DecodeError::EmptyCorrelationKey);
        }
        Ok(ConfirmedEntity {
            correlation_key: inner.uuid,
            entity_name: inner.name,
        })
    }
}
