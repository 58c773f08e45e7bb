//! Audit record assembly

use crate::packet::{scalar_text, Fields, Packet};
use crate::privacy::integrity::{fingerprint, Digest, IntegrityStatus};
use crate::privacy::policy::{PolicyConfig, TransformedPacket};
use serde::Serialize;
use serde_json::Value;

/// Fixed header columns, in export order
pub const HEADER_COLUMNS: &[&str] = &[
    "Log_UUID",
    "Timestamp",
    "Session_ID",
    "System_Context",
    "Integrity_Status",
    "Data_Hash",
    "Mode",
];

/// One immutable audit entry per processed packet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    #[serde(rename = "Log_UUID")]
    log_uuid: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Session_ID")]
    session_id: String,
    #[serde(rename = "System_Context")]
    system_context: String,
    #[serde(rename = "Integrity_Status")]
    integrity_status: IntegrityStatus,
    #[serde(rename = "Data_Hash")]
    data_hash: Digest,
    #[serde(rename = "Mode")]
    mode: String,
    #[serde(flatten)]
    payload: Fields,
}

impl AuditRecord {
    /// Build the record for one processed packet.
    ///
    /// The digest stored is the one of the raw payload. Payload keys that
    /// collide with a header column are left out: the header always wins, so
    /// a device cannot overwrite its integrity status or mode through its
    /// own payload.
    pub fn build(
        raw: &Packet,
        config: &PolicyConfig,
        transformed: &TransformedPacket,
        integrity_ok: bool,
        session_id: &str,
    ) -> Self {
        let payload = transformed
            .payload
            .iter()
            .filter(|(k, _)| !HEADER_COLUMNS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            log_uuid: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
            session_id: session_id.to_string(),
            system_context: raw.system_context(),
            integrity_status: IntegrityStatus::from(integrity_ok),
            data_hash: fingerprint(&raw.payload),
            mode: config.mode().label().to_string(),
            payload,
        }
    }

    pub fn log_uuid(&self) -> &str {
        &self.log_uuid
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn system_context(&self) -> &str {
        &self.system_context
    }

    pub fn integrity_status(&self) -> IntegrityStatus {
        self.integrity_status
    }

    pub fn data_hash(&self) -> &Digest {
        &self.data_hash
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn payload(&self) -> &Fields {
        &self.payload
    }

    /// Column names: header first, then payload keys
    pub fn columns(&self) -> Vec<String> {
        HEADER_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.payload.keys().cloned())
            .collect()
    }

    /// Value of a column as flat text, if the record has it
    pub fn get(&self, column: &str) -> Option<String> {
        let header = match column {
            "Log_UUID" => &self.log_uuid,
            "Timestamp" => &self.timestamp,
            "Session_ID" => &self.session_id,
            "System_Context" => &self.system_context,
            "Integrity_Status" => return Some(self.integrity_status.to_string()),
            "Data_Hash" => return Some(self.data_hash.to_string()),
            "Mode" => &self.mode,
            other => return self.payload.get(other).map(scalar_text),
        };
        Some(header.clone())
    }

    /// Values in `columns()` order
    pub fn to_row(&self) -> Vec<String> {
        self.columns()
            .iter()
            .map(|c| self.get(c).unwrap_or_default())
            .collect()
    }

    /// Flat JSON object with header and payload fields
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::policy::PolicyEngine;
    use serde_json::json;

    fn wearable() -> Packet {
        let as_fields = |v: Value| match v {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        Packet::new(
            "HEALTH_WEARABLE",
            "2026-03-01 10:00:00",
            as_fields(json!({"heart_rate": 88, "blood_oxygen": 97, "steps": 12})),
            as_fields(json!({"user_fullname": "Grace Hopper", "user_dob": "1990-05-12"})),
        )
    }

    #[test]
    fn test_build_anonymized_record() {
        let raw = wearable();
        let config = PolicyConfig {
            anonymize_art9: true,
            ..Default::default()
        };
        let transformed = PolicyEngine::new("salt").transform(&raw, &config);
        let record = AuditRecord::build(&raw, &config, &transformed, true, "AB12CD34");

        assert_eq!(record.session_id(), "AB12CD34");
        assert_eq!(record.system_context(), "WEARABLE_HEALTH");
        assert_eq!(record.integrity_status(), IntegrityStatus::Pass);
        assert_eq!(record.mode(), "ANONYMIZED");
        assert_eq!(record.data_hash(), &fingerprint(&raw.payload));
        assert!(uuid::Uuid::parse_str(record.log_uuid()).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(record.timestamp()).is_ok());
        assert_eq!(record.get("heart_rate"), Some("88".to_string()));
    }

    #[test]
    fn test_columns_and_row() {
        let raw = wearable();
        let config = PolicyConfig::default();
        let transformed = PolicyEngine::new("salt").transform(&raw, &config);
        let record = AuditRecord::build(&raw, &config, &transformed, false, "S1");

        let columns = record.columns();
        assert_eq!(&columns[..7], HEADER_COLUMNS);
        assert_eq!(&columns[7..], ["heart_rate", "blood_oxygen", "steps"]);

        let row = record.to_row();
        assert_eq!(row.len(), columns.len());
        assert_eq!(row[4], "FAIL");
        assert_eq!(row[6], "PSEUDONYMIZED");
        assert_eq!(row[9], "12");
    }

    #[test]
    fn test_unique_ids() {
        let raw = wearable();
        let config = PolicyConfig::default();
        let transformed = PolicyEngine::new("salt").transform(&raw, &config);
        let a = AuditRecord::build(&raw, &config, &transformed, true, "S1");
        let b = AuditRecord::build(&raw, &config, &transformed, true, "S1");
        assert_ne!(a.log_uuid(), b.log_uuid());
    }

    #[test]
    fn test_payload_cannot_shadow_header() {
        let mut raw = wearable();
        raw.payload.insert("Mode".into(), json!("spoofed"));
        raw.payload.insert("Integrity_Status".into(), json!("PASS"));
        let config = PolicyConfig::default();
        let transformed = PolicyEngine::new("salt").transform(&raw, &config);
        let record = AuditRecord::build(&raw, &config, &transformed, false, "S1");
        assert_eq!(record.get("Mode"), Some("PSEUDONYMIZED".to_string()));
        assert_eq!(record.get("Integrity_Status"), Some("FAIL".to_string()));
        assert!(!record.payload().contains_key("Mode"));
        assert!(!record.payload().contains_key("Integrity_Status"));
        assert_eq!(record.columns().len(), HEADER_COLUMNS.len() + 3);
    }

    #[test]
    fn test_to_json_is_flat() {
        let raw = wearable();
        let config = PolicyConfig::default();
        let transformed = PolicyEngine::new("salt").transform(&raw, &config);
        let record = AuditRecord::build(&raw, &config, &transformed, true, "S1");
        let json = record.to_json();
        assert_eq!(json["Integrity_Status"], json!("PASS"));
        assert_eq!(json["steps"], json!(12));
    }
}
