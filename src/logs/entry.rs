//! Wire shape of one transported log entry

use crate::logs::error::{LogsError, LogsResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One log entry as carried on the wire: a UTF-8 JSON object
/// `{"message": string, "context": object}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub context: Value,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, context: Value) -> Self {
        Self {
            message: message.into(),
            context,
        }
    }

    pub(crate) fn encode(&self) -> LogsResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(LogsError::Encoding)
    }

    pub(crate) fn decode(body: &[u8]) -> LogsResult<Self> {
        serde_json::from_slice(body).map_err(|_| LogsError::Format {
            body: String::from_utf8_lossy(body).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoded_entry_has_expected_wire_shape() {
        let entry = LogEntry::new("hello", json!({"k": "v"}));

        let payload = entry.encode().unwrap();
        let decoded: Value = serde_json::from_slice(&payload).unwrap();

        assert_eq!(decoded, json!({"message": "hello", "context": {"k": "v"}}));
    }

    #[test]
    fn test_decode_round_trip() {
        let entry = LogEntry::new("disk almost full", json!({"free_mb": 12}));
        let payload = entry.encode().unwrap();

        assert_eq!(LogEntry::decode(&payload).unwrap(), entry);
    }

    #[test]
    fn test_decode_rejects_missing_context() {
        let result = LogEntry::decode(br#"{"message": "orphan"}"#);

        match result {
            Err(LogsError::Format { body }) => assert!(body.contains("orphan")),
            _ => panic!("expected Format error"),
        }
    }

    #[test]
    fn test_decode_rejects_non_json_payload() {
        assert!(matches!(
            LogEntry::decode(b"not json at all"),
            Err(LogsError::Format { .. })
        ));
    }
}
