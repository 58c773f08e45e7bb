//! Field classifier for detecting sensitive packet fields

use crate::packet::{Fields, Packet};
use serde::{Deserialize, Serialize};

/// Sensitivity category assigned to a field name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    /// Health and other GDPR Art. 9 special-category data
    Special,
    /// Direct personal identifiers
    Pii,
    /// Location data
    Geo,
    /// Indirect technical identifiers
    Technical,
    /// Nothing recognised
    Generic,
}

impl FieldCategory {
    /// Tag used in scan report entries
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Special => "SPECIAL",
            Self::Pii => "PII",
            Self::Geo => "GEO",
            Self::Technical => "TECH",
            Self::Generic => "GENERIC",
        }
    }
}

impl std::fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A keyword set bound to a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Category assigned when a keyword matches
    pub category: FieldCategory,
    /// Lower-case substrings to look for in field names
    pub keywords: Vec<String>,
}

impl KeywordRule {
    /// Create a rule from a category and keyword list
    pub fn new(category: FieldCategory, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.keywords.iter().any(|k| name.contains(k.as_str()))
    }
}

/// Built-in rules in priority order. First match wins.
pub fn default_keyword_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            FieldCategory::Special,
            &["heart", "blood", "health", "dob", "ssn"],
        ),
        KeywordRule::new(
            FieldCategory::Pii,
            &["name", "email", "owner", "user", "fullname"],
        ),
        KeywordRule::new(FieldCategory::Geo, &["gps", "lat", "lon", "location"]),
        KeywordRule::new(
            FieldCategory::Technical,
            &["ip", "mac", "device", "serial"],
        ),
    ]
}

/// Result of scanning one packet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// At least one field is a direct identifier
    pub contains_pii: bool,
    /// At least one field is location data
    pub contains_geo: bool,
    /// At least one field is special-category data
    pub contains_special: bool,
    /// `"<field> -> <TAG>"` entries in scan order
    pub fields_detected: Vec<String>,
}

impl ScanReport {
    /// Whether any field was tagged as a technical identifier
    pub fn contains_technical(&self) -> bool {
        let suffix = format!(" -> {}", FieldCategory::Technical.tag());
        self.fields_detected.iter().any(|d| d.ends_with(&suffix))
    }
}

/// Keyword classifier over packet field names
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<KeywordRule>,
}

impl Classifier {
    /// Create a classifier with the given rules, evaluated in order
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Category for a single field name
    pub fn classify_field(&self, name: &str) -> FieldCategory {
        let lowered = name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.category)
            .unwrap_or(FieldCategory::Generic)
    }

    /// Scan payload and metadata field names of a packet
    pub fn scan(&self, packet: &Packet) -> ScanReport {
        let mut report = ScanReport::default();

        for name in merged_field_names(&packet.payload, &packet.metadata) {
            let category = self.classify_field(name);
            match category {
                FieldCategory::Special => report.contains_special = true,
                FieldCategory::Pii => report.contains_pii = true,
                FieldCategory::Geo => report.contains_geo = true,
                FieldCategory::Technical | FieldCategory::Generic => {}
            }
            report
                .fields_detected
                .push(format!("{} -> {}", name, category.tag()));
        }

        tracing::debug!(
            fields = report.fields_detected.len(),
            pii = report.contains_pii,
            geo = report.contains_geo,
            special = report.contains_special,
            "Scanned packet"
        );

        report
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_keyword_rules())
    }
}

/// Scan a packet with the built-in rules
pub fn scan(packet: &Packet) -> ScanReport {
    Classifier::default().scan(packet)
}

/// Payload names first, then metadata names not already seen.
fn merged_field_names<'a>(payload: &'a Fields, metadata: &'a Fields) -> Vec<&'a str> {
    let mut names: Vec<&str> = payload.keys().map(String::as_str).collect();
    for key in metadata.keys() {
        if !payload.contains_key(key) {
            names.push(key.as_str());
        }
    }
    names
}
