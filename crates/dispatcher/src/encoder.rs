//! Event to broker message encoding

use bytes::Bytes;
use contracts::{BrokerMessage, DispatchSettings, Event, WireFormat};

use crate::error::DispatcherError;

/// Longest message key a record frame can carry (`u16` length prefix)
pub const MAX_KEY_BYTES: usize = u16::MAX as usize;
/// Longest message value a record frame can carry (`u32` length prefix)
pub const MAX_VALUE_BYTES: usize = u32::MAX as usize;

/// Turns events into broker messages keyed by event id
#[derive(Debug, Clone, Copy)]
pub struct MessageEncoder {
    format: WireFormat,
    max_message_bytes: usize,
}

impl MessageEncoder {
    pub fn new(format: WireFormat, max_message_bytes: usize) -> Self {
        Self {
            format,
            max_message_bytes,
        }
    }

    pub fn from_settings(settings: &DispatchSettings) -> Self {
        Self::new(settings.wire_format, settings.max_message_bytes)
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Encode one event, stamping the message with the current wall-clock time
    ///
    /// # Errors
    /// Serialization failure, an id too long for a record key, or an encoded
    /// size over the configured limit.
    pub fn encode(&self, event: &Event) -> Result<BrokerMessage, DispatcherError> {
        if event.id.len() > MAX_KEY_BYTES {
            return Err(DispatcherError::encode(
                &event.id,
                format!(
                    "id is {} bytes, record keys hold at most {MAX_KEY_BYTES}",
                    event.id.len()
                ),
            ));
        }

        let data = self.serialize_event(event)?;

        let max = self.max_message_bytes.min(MAX_VALUE_BYTES);
        if data.len() > max {
            return Err(DispatcherError::MessageTooLarge {
                event_id: event.id.clone(),
                size: data.len(),
                max,
            });
        }

        Ok(BrokerMessage::new(event.id.clone(), Bytes::from(data)))
    }

    fn serialize_event(&self, event: &Event) -> Result<Vec<u8>, DispatcherError> {
        match self.format {
            WireFormat::Json => serde_json::to_vec(event)
                .map_err(|e| DispatcherError::encode(&event.id, format!("json error: {e}"))),
            WireFormat::Bincode => bincode::serialize(event)
                .map_err(|e| DispatcherError::encode(&event.id, format!("bincode error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_encoding_keeps_wire_names() {
        let encoder = MessageEncoder::new(WireFormat::Json, 1024);
        let mut event = Event::new("evt-1", "Banking", "Domestic", "Created");
        event.branch_id = 1234;

        let message = encoder.encode(&event).unwrap();
        assert_eq!(message.key, "evt-1");

        let value: serde_json::Value = serde_json::from_slice(&message.value).unwrap();
        assert_eq!(value["id"], "evt-1");
        assert_eq!(value["branchid"], 1234);
    }

    #[test]
    fn test_bincode_encoding() {
        let encoder = MessageEncoder::new(WireFormat::Bincode, 1024);
        let event = Event::new("evt-1", "Banking", "Domestic", "Created").with_payload("p");

        let message = encoder.encode(&event).unwrap();
        let decoded: Event = bincode::deserialize(&message.value).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_oversized_event_rejected() {
        let encoder = MessageEncoder::new(WireFormat::Json, 64);
        let event = Event::new("big", "A", "B", "C").with_payload("x".repeat(128));

        let err = encoder.encode(&event).unwrap_err();
        assert!(matches!(err, DispatcherError::MessageTooLarge { max: 64, .. }));
        assert!(err.is_event_scoped());
    }

    #[test]
    fn test_id_longer_than_record_key_rejected() {
        let encoder = MessageEncoder::new(WireFormat::Json, usize::MAX);
        let event = Event::new("k".repeat(MAX_KEY_BYTES + 1), "A", "B", "C");

        let err = encoder.encode(&event).unwrap_err();
        assert!(matches!(err, DispatcherError::Encode { .. }));
        assert!(err.is_event_scoped());

        let at_limit = Event::new("k".repeat(MAX_KEY_BYTES), "A", "B", "C");
        assert!(encoder.encode(&at_limit).is_ok());
    }
}
