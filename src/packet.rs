//! Telemetry packet model
//!
//! A packet carries two flat sections: `payload` holds the measurement values
//! and is never touched by a privacy policy, `metadata` holds identifying and
//! contextual fields and is the only part a policy rewrites.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Insertion-ordered mapping from field name to scalar JSON value
pub type Fields = serde_json::Map<String, Value>;

/// A single telemetry packet emitted by a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Device family that produced the packet (e.g. `SMART_HOME_HUB`)
    pub source_type: String,
    /// Capture time as formatted by the device
    pub timestamp: String,
    /// Measurement values
    #[serde(default)]
    pub payload: Fields,
    /// Identifying and contextual fields
    #[serde(default)]
    pub metadata: Fields,
}

impl Packet {
    /// Create a packet from its parts
    pub fn new(
        source_type: impl Into<String>,
        timestamp: impl Into<String>,
        payload: Fields,
        metadata: Fields,
    ) -> Self {
        Self {
            source_type: source_type.into(),
            timestamp: timestamp.into(),
            payload,
            metadata,
        }
    }

    /// Check that every payload and metadata value is a scalar.
    pub fn validate(&self) -> Result<()> {
        for (section, fields) in [("payload", &self.payload), ("metadata", &self.metadata)] {
            if let Some((key, _)) = fields
                .iter()
                .find(|(_, v)| matches!(v, Value::Array(_) | Value::Object(_)))
            {
                return Err(Error::MalformedPacket(format!(
                    "{}.{} is not a scalar value",
                    section, key
                )));
            }
        }
        Ok(())
    }

    /// System context tag used in audit records
    pub fn system_context(&self) -> String {
        match self.source_type.as_str() {
            "SMART_HOME_HUB" => "SMART_HOME".to_string(),
            "HEALTH_WEARABLE" => "WEARABLE_HEALTH".to_string(),
            other => other.to_uppercase(),
        }
    }
}

/// Render a scalar value as plain text (strings without quotes).
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
