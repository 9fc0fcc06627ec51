//! Content codec seam — serialization of board content for persistence.

use thiserror::Error;

use crate::session::BoardContent;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The content maps could not be encoded.
    #[error("content encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Serializes board content into the persisted payload form.
pub trait ContentCodec: Send + Sync {
    /// Encode the content maps.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the content cannot be serialized.
    fn encode(&self, content: &BoardContent) -> Result<String, CodecError>;

    /// Sentinel payload written when encoding fails under a best-effort
    /// persistence policy.
    fn empty_payload(&self) -> String;
}

/// JSON codec — the production encoding for persisted board state.
pub struct JsonCodec;

impl ContentCodec for JsonCodec {
    fn encode(&self, content: &BoardContent) -> Result<String, CodecError> {
        Ok(serde_json::to_string(content)?)
    }

    fn empty_payload(&self) -> String {
        "{}".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn encode_empty_content() {
        let payload = JsonCodec.encode(&BoardContent::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert!(value["operations"].as_object().unwrap().is_empty());
    }

    #[test]
    fn encode_round_trips_operations() {
        let mut content = BoardContent::default();
        let id = Uuid::new_v4();
        content.operations.insert(id, serde_json::json!({"kind": "stroke", "points": [1, 2]}));

        let payload = JsonCodec.encode(&content).unwrap();
        let restored: BoardContent = serde_json::from_str(&payload).unwrap();
        assert_eq!(restored, content);
    }

    #[test]
    fn empty_payload_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(&JsonCodec.empty_payload()).unwrap();
        assert!(value.as_object().unwrap().is_empty());
    }
}
