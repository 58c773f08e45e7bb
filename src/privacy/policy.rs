//! Privacy policy engine for rewriting packet metadata
//!
//! Two mutually exclusive modes:
//! - **Anonymization** (`anonymize_art9`): irreversible deletion of direct,
//!   technical and geo identifiers plus year-only birth dates.
//! - **Selective**: pseudonymization, technical masking and geo minimization,
//!   each toggled independently.
//!
//! The payload is never touched. The engine works on a copy of the packet.

use crate::packet::{scalar_text, Fields, Packet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Prefix for pseudonym tokens
pub const PSEUDO_PREFIX: &str = "PSEUDO_";

/// Hex characters of the SHA-256 digest kept in a pseudonym
const PSEUDO_HEX_LEN: usize = 12;

/// Replacement for masked IP octets
const OCTET_MASK: &str = "xxx";

/// Fixed-width tail appended to masked serials
const SERIAL_MASK: &str = "_****";

/// Serial characters left visible
const SERIAL_VISIBLE: usize = 4;

/// Fields removed by anonymization: direct identifiers
const ANON_DIRECT_FIELDS: &[&str] = &[
    "owner_name",
    "user_fullname",
    "owner_email",
    "health_id",
    "device_serial",
    "device_id",
];

/// Fields removed by anonymization: technical and geo identifiers
const ANON_TECH_GEO_FIELDS: &[&str] = &[
    "ip_address",
    "mac_address",
    "gps_lat",
    "gps_lon",
    "location_city",
];

/// Identifiers replaced by pseudonyms
const PSEUDO_FIELDS: &[&str] = &["owner_name", "user_fullname", "owner_email", "health_id"];

/// Location fields dropped by minimization
const GEO_FIELDS: &[&str] = &["gps_lat", "gps_lon", "location_city"];

const IP_FIELD: &str = "ip_address";
const SERIAL_FIELD: &str = "device_serial";

/// First two dotted components of an address
const IP_PREFIX_PATTERN: &str = r"^([^.]+)\.([^.]+)";

/// Caller-selected privacy controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Replace direct identifiers with salted hash tokens
    pub pseudo: bool,
    /// Mask IP address and device serial
    pub mask_ip: bool,
    /// Drop GPS coordinates and city
    pub drop_geo: bool,
    /// Anonymize; overrides the three flags above
    pub anonymize_art9: bool,
}

impl PolicyConfig {
    /// The single mode this configuration selects
    pub fn mode(&self) -> PolicyMode {
        if self.anonymize_art9 {
            PolicyMode::Anonymized
        } else {
            PolicyMode::Pseudonymized
        }
    }
}

/// Transformation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyMode {
    Anonymized,
    Pseudonymized,
}

impl PolicyMode {
    /// Label used in audit records
    pub fn label(&self) -> &'static str {
        match self {
            Self::Anonymized => "ANONYMIZED",
            Self::Pseudonymized => "PSEUDONYMIZED",
        }
    }
}

impl std::fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of a policy pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedPacket {
    /// Copy of the input packet with metadata rewritten
    pub clean: Packet,
    /// Same value as `clean.payload`
    pub payload: Fields,
    /// Mode that produced this packet
    pub mode: PolicyMode,
}

/// Applies a `PolicyConfig` to packets
#[derive(Clone)]
pub struct PolicyEngine {
    salt: String,
}

impl std::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEngine")
            .field("salt", &"[REDACTED]")
            .finish()
    }
}

impl PolicyEngine {
    /// Create an engine that salts pseudonyms with `salt`
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    /// Rewrite the metadata of a copy of `packet` according to `config`
    pub fn transform(&self, packet: &Packet, config: &PolicyConfig) -> TransformedPacket {
        let mut clean = packet.clone();
        let mode = config.mode();

        match mode {
            PolicyMode::Anonymized => anonymize(&mut clean.metadata),
            PolicyMode::Pseudonymized => self.apply_selective(&mut clean.metadata, config),
        }

        tracing::debug!(
            mode = %mode,
            fields_in = packet.metadata.len(),
            fields_out = clean.metadata.len(),
            "Applied privacy policy"
        );

        let payload = clean.payload.clone();
        TransformedPacket {
            clean,
            payload,
            mode,
        }
    }

    fn apply_selective(&self, meta: &mut Fields, config: &PolicyConfig) {
        if config.pseudo {
            for field in PSEUDO_FIELDS {
                if let Some(value) = meta.get_mut(*field) {
                    *value = Value::String(pseudonymize(&scalar_text(value), &self.salt));
                }
            }
        }

        if config.mask_ip {
            if let Some(value) = meta.get_mut(IP_FIELD) {
                *value = Value::String(mask_ip(&scalar_text(value)));
            }
            if let Some(value) = meta.get_mut(SERIAL_FIELD) {
                *value = Value::String(mask_serial(&scalar_text(value)));
            }
        }

        if config.drop_geo {
            remove_fields(meta, GEO_FIELDS);
        }
    }
}

/// One-shot transform with an explicit salt
pub fn transform(packet: &Packet, config: &PolicyConfig, salt: &str) -> TransformedPacket {
    PolicyEngine::new(salt).transform(packet, config)
}

fn anonymize(meta: &mut Fields) {
    remove_fields(meta, ANON_DIRECT_FIELDS);
    remove_fields(meta, ANON_TECH_GEO_FIELDS);

    for (key, value) in meta.iter_mut() {
        let lowered = key.to_lowercase();
        if lowered.contains("dob") || lowered.contains("birth") {
            if let Value::String(date) = value {
                *date = generalize_date(date);
            }
        }
    }
}

fn remove_fields(meta: &mut Fields, fields: &[&str]) {
    for field in fields {
        // shift_remove keeps the order of the surviving fields
        meta.shift_remove(*field);
    }
}

/// `PSEUDO_` + first 12 hex chars of SHA-256(value ‖ salt)
pub fn pseudonymize(value: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.update(salt.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    format!("{}{}", PSEUDO_PREFIX, &hex[..PSEUDO_HEX_LEN])
}

/// Keep the first two dotted components, mask the rest
pub fn mask_ip(value: &str) -> String {
    match regex::Regex::new(IP_PREFIX_PATTERN)
        .ok()
        .and_then(|re| re.captures(value))
    {
        Some(caps) => format!(
            "{}.{}.{}.{}",
            &caps[1], &caps[2], OCTET_MASK, OCTET_MASK
        ),
        None => [OCTET_MASK; 4].join("."),
    }
}

/// Keep the first four characters, append a fixed mask (`wear_1234` -> `wear_****`)
pub fn mask_serial(value: &str) -> String {
    let visible: String = value.chars().take(SERIAL_VISIBLE).collect();
    format!("{}{}", visible, SERIAL_MASK)
}

/// Reduce `YYYY-MM-DD` to `YYYY`
pub fn generalize_date(value: &str) -> String {
    value.split('-').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SALT: &str = "PROJECT_SECRET_KEY_2026";

    fn as_fields(v: Value) -> Fields {
        match v {
            Value::Object(map) => map,
            _ => Fields::new(),
        }
    }

    fn smart_home() -> Packet {
        Packet::new(
            "SMART_HOME_HUB",
            "2026-03-01 10:00:00",
            as_fields(json!({
                "temperature": 21.37,
                "humidity": 44,
                "energy_consumption": 1.2
            })),
            as_fields(json!({
                "device_id": "home_4821",
                "owner_name": "Ada Lovelace",
                "owner_email": "ada@example.com",
                "ip_address": "10.0.0.7",
                "gps_lat": 45.4642,
                "gps_lon": 9.19
            })),
        )
    }

    fn wearable() -> Packet {
        Packet::new(
            "HEALTH_WEARABLE",
            "2026-03-01 10:00:00",
            as_fields(json!({"heart_rate": 88, "blood_oxygen": 97, "steps": 12})),
            as_fields(json!({
                "device_serial": "wear_1234",
                "user_fullname": "Grace Hopper",
                "user_dob": "1990-05-12",
                "health_id": "RSSMRA80A01H501U",
                "location_city": "Torino"
            })),
        )
    }

    fn all_configs() -> Vec<PolicyConfig> {
        let mut configs = Vec::new();
        for bits in 0u8..16 {
            configs.push(PolicyConfig {
                pseudo: bits & 1 != 0,
                mask_ip: bits & 2 != 0,
                drop_geo: bits & 4 != 0,
                anonymize_art9: bits & 8 != 0,
            });
        }
        configs
    }

    #[test]
    fn test_payload_never_modified() {
        let engine = PolicyEngine::new(SALT);
        for packet in [smart_home(), wearable()] {
            for config in all_configs() {
                let out = engine.transform(&packet, &config);
                assert_eq!(out.clean.payload, packet.payload);
                assert_eq!(out.payload, packet.payload);
            }
        }
    }

    #[test]
    fn test_input_not_mutated() {
        let engine = PolicyEngine::new(SALT);
        let packet = smart_home();
        let before = packet.clone();
        let config = PolicyConfig {
            pseudo: true,
            mask_ip: true,
            drop_geo: true,
            anonymize_art9: false,
        };
        let _ = engine.transform(&packet, &config);
        assert_eq!(packet, before);
    }

    #[test]
    fn test_anonymization_overrides_selective_flags() {
        let engine = PolicyEngine::new(SALT);
        for packet in [smart_home(), wearable()] {
            for config in all_configs().into_iter().filter(|c| c.anonymize_art9) {
                let out = engine.transform(&packet, &config);
                assert_eq!(out.mode, PolicyMode::Anonymized);
                for field in ANON_DIRECT_FIELDS.iter().chain(ANON_TECH_GEO_FIELDS) {
                    assert!(!out.clean.metadata.contains_key(*field), "{} kept", field);
                }
            }
        }
    }

    #[test]
    fn test_anonymization_generalizes_dob() {
        let engine = PolicyEngine::new(SALT);
        let config = PolicyConfig {
            anonymize_art9: true,
            ..Default::default()
        };
        let out = engine.transform(&wearable(), &config);
        assert_eq!(out.clean.metadata.get("user_dob"), Some(&json!("1990")));
        assert_eq!(out.clean.metadata.len(), 1);
    }

    #[test]
    fn test_pseudonymization() {
        let engine = PolicyEngine::new(SALT);
        let config = PolicyConfig {
            pseudo: true,
            ..Default::default()
        };
        let out = engine.transform(&smart_home(), &config);
        assert_eq!(
            out.clean.metadata.get("owner_name"),
            Some(&json!("PSEUDO_7adf281cd0d0"))
        );
        let email = out.clean.metadata["owner_email"].as_str().unwrap();
        assert!(email.starts_with(PSEUDO_PREFIX));
        assert_eq!(email.len(), PSEUDO_PREFIX.len() + 12);
        // untouched without mask/geo flags
        assert_eq!(out.clean.metadata.get("ip_address"), Some(&json!("10.0.0.7")));
        assert!(out.clean.metadata.contains_key("gps_lat"));
        assert_eq!(out.mode, PolicyMode::Pseudonymized);
    }

    #[test]
    fn test_pseudonym_determinism() {
        assert_eq!(pseudonymize("alice", SALT), pseudonymize("alice", SALT));
        assert_ne!(pseudonymize("alice", SALT), pseudonymize("bob", SALT));
        assert_ne!(pseudonymize("alice", SALT), pseudonymize("alice", "other"));
    }

    #[test]
    fn test_mask_ip() {
        assert_eq!(mask_ip("203.0.113.45"), "203.0.xxx.xxx");
        assert_eq!(mask_ip("10.0.0.7"), "10.0.xxx.xxx");
        assert_eq!(mask_ip("localhost"), "xxx.xxx.xxx.xxx");
    }

    #[test]
    fn test_mask_serial() {
        assert_eq!(mask_serial("wear_1234"), "wear_****");
        assert_eq!(mask_serial("home_98765"), "home_****");
        assert_eq!(mask_serial("ab"), "ab_****");
    }

    #[test]
    fn test_generalize_date() {
        assert_eq!(generalize_date("1990-05-12"), "1990");
        assert_eq!(generalize_date("1990"), "1990");
    }

    #[test]
    fn test_end_to_end_mask_and_drop() {
        let engine = PolicyEngine::new(SALT);
        let config = PolicyConfig {
            pseudo: false,
            mask_ip: true,
            drop_geo: true,
            anonymize_art9: false,
        };
        let out = engine.transform(&smart_home(), &config);
        let meta = &out.clean.metadata;
        assert_eq!(meta.get("ip_address"), Some(&json!("10.0.xxx.xxx")));
        assert!(!meta.contains_key("gps_lat"));
        assert!(!meta.contains_key("gps_lon"));
        assert_eq!(meta.get("owner_name"), Some(&json!("Ada Lovelace")));
        let keys: Vec<&str> = meta.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["device_id", "owner_name", "owner_email", "ip_address"]
        );
    }

    #[test]
    fn test_wearable_masking() {
        let engine = PolicyEngine::new(SALT);
        let config = PolicyConfig {
            mask_ip: true,
            drop_geo: true,
            ..Default::default()
        };
        let out = engine.transform(&wearable(), &config);
        assert_eq!(
            out.clean.metadata.get("device_serial"),
            Some(&json!("wear_****"))
        );
        assert!(!out.clean.metadata.contains_key("location_city"));
        assert_eq!(out.clean.metadata.get("user_dob"), Some(&json!("1990-05-12")));
    }

    #[test]
    fn test_disabled_controls_leave_metadata() {
        let engine = PolicyEngine::new(SALT);
        let packet = wearable();
        let out = engine.transform(&packet, &PolicyConfig::default());
        assert_eq!(out.clean, packet);
    }

    #[test]
    fn test_non_string_identifier_is_pseudonymized() {
        let engine = PolicyEngine::new(SALT);
        let mut packet = wearable();
        packet.metadata.insert("health_id".into(), json!(123456));
        let config = PolicyConfig {
            pseudo: true,
            ..Default::default()
        };
        let out = engine.transform(&packet, &config);
        assert_eq!(
            out.clean.metadata.get("health_id"),
            Some(&json!(pseudonymize("123456", SALT)))
        );
    }

    #[test]
    fn test_debug_hides_salt() {
        let engine = PolicyEngine::new(SALT);
        assert!(!format!("{:?}", engine).contains(SALT));
    }

    #[test]
    fn test_one_shot_transform_matches_engine() {
        let engine = PolicyEngine::new(SALT);
        for config in all_configs() {
            for packet in [smart_home(), wearable()] {
                assert_eq!(
                    transform(&packet, &config, SALT),
                    engine.transform(&packet, &config)
                );
            }
        }
        let pseudo = PolicyConfig {
            pseudo: true,
            ..Default::default()
        };
        assert_ne!(
            transform(&smart_home(), &pseudo, "other-salt"),
            engine.transform(&smart_home(), &pseudo)
        );
    }
}
