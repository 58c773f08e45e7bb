//! Privacy classification and data protection
//!
//! Provides field-level detection of sensitive telemetry data and the
//! policies that rewrite it. Includes:
//! - Keyword classification of field names (PII, geo, technical, Art. 9)
//! - Anonymization, pseudonymization, masking and minimization policies
//! - Payload integrity fingerprints

pub mod classifier;
pub mod integrity;
pub mod policy;

pub use classifier::{
    default_keyword_rules, scan, Classifier, FieldCategory, KeywordRule, ScanReport,
};
pub use integrity::{fingerprint, verify, Digest, IntegrityStatus};
pub use policy::{
    generalize_date, mask_ip, mask_serial, pseudonymize, transform, PolicyConfig, PolicyEngine,
    PolicyMode, TransformedPacket,
};
