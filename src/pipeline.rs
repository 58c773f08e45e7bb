//! Privacy pipeline: wires Classifier + PolicyEngine + integrity check +
//! audit record creation
//!
//! Every packet passes through the pipeline, which scans its fields,
//! applies the configured policy, verifies that the payload is unchanged,
//! and produces an `AuditRecord` for the caller to append.

use crate::audit::AuditRecord;
use crate::error::Result;
use crate::packet::Packet;
use crate::privacy::{
    verify, Classifier, IntegrityStatus, PolicyConfig, PolicyEngine, ScanReport,
    TransformedPacket,
};
use serde::Serialize;

/// Privacy control reported by `assess`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Anonymization,
    DateGeneralization,
    Pseudonymization,
    IpMasking,
    GeoMinimization,
    Integrity,
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Anonymization => "Anonymization",
            Self::DateGeneralization => "Date generalization",
            Self::Pseudonymization => "Pseudonymization",
            Self::IpMasking => "IP masking",
            Self::GeoMinimization => "Geo minimization",
            Self::Integrity => "Integrity check",
        };
        f.write_str(name)
    }
}

/// Whether a control acted on the packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Control ran on fields present in the packet
    Applied,
    /// Relevant fields are present but the control is switched off
    Disabled,
    /// Nothing in the packet for this control to act on
    NotApplicable,
    /// Integrity digests differ
    Failed,
}

/// One line of the processing summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStep {
    pub control: Control,
    pub status: StepStatus,
}

impl PipelineStep {
    fn new(control: Control, status: StepStatus) -> Self {
        Self { control, status }
    }
}

/// Everything produced for one packet
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report: ScanReport,
    pub transformed: TransformedPacket,
    pub integrity: IntegrityStatus,
    pub record: AuditRecord,
    pub steps: Vec<PipelineStep>,
}

impl PipelineOutcome {
    /// Special-category data is travelling without anonymization
    pub fn special_category_alert(&self, config: &PolicyConfig) -> bool {
        special_category_alert(&self.report, config)
    }
}

/// True when special-category fields are present and anonymization is off
pub fn special_category_alert(report: &ScanReport, config: &PolicyConfig) -> bool {
    report.contains_special && !config.anonymize_art9
}

/// Summarise which controls act on a scanned packet under `config`
pub fn assess(
    report: &ScanReport,
    config: &PolicyConfig,
    integrity: IntegrityStatus,
) -> Vec<PipelineStep> {
    let mut steps = Vec::new();

    if config.anonymize_art9 {
        steps.push(PipelineStep::new(Control::Anonymization, StepStatus::Applied));
        steps.push(PipelineStep::new(
            Control::DateGeneralization,
            StepStatus::Applied,
        ));
    } else {
        let toggle = |present: bool, enabled: bool| match (present, enabled) {
            (false, _) => StepStatus::NotApplicable,
            (true, true) => StepStatus::Applied,
            (true, false) => StepStatus::Disabled,
        };
        steps.push(PipelineStep::new(
            Control::Pseudonymization,
            toggle(report.contains_pii, config.pseudo),
        ));
        steps.push(PipelineStep::new(
            Control::IpMasking,
            toggle(report.contains_technical(), config.mask_ip),
        ));
        steps.push(PipelineStep::new(
            Control::GeoMinimization,
            toggle(report.contains_geo, config.drop_geo),
        ));
    }

    let integrity_status = if integrity.is_pass() {
        StepStatus::Applied
    } else {
        StepStatus::Failed
    };
    steps.push(PipelineStep::new(Control::Integrity, integrity_status));

    steps
}

/// Scan → transform → verify → audit
#[derive(Debug, Clone)]
pub struct PrivacyPipeline {
    classifier: Classifier,
    engine: PolicyEngine,
}

impl PrivacyPipeline {
    /// Create a pipeline with the given classifier and policy engine
    pub fn new(classifier: Classifier, engine: PolicyEngine) -> Self {
        Self { classifier, engine }
    }

    /// Pipeline with the built-in keyword rules
    pub fn with_salt(salt: impl Into<String>) -> Self {
        Self::new(Classifier::default(), PolicyEngine::new(salt))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Process one packet; the caller appends `outcome.record` to its log.
    pub fn process(
        &self,
        packet: &Packet,
        config: &PolicyConfig,
        session_id: &str,
    ) -> Result<PipelineOutcome> {
        packet.validate()?;

        let report = self.classifier.scan(packet);
        let transformed = self.engine.transform(packet, config);
        let integrity = verify(&packet.payload, &transformed.payload);

        if !integrity.is_pass() {
            tracing::warn!(
                source = %packet.source_type,
                "Payload digest changed during privacy transformation"
            );
        }

        let record = AuditRecord::build(
            packet,
            config,
            &transformed,
            integrity.is_pass(),
            session_id,
        );
        let steps = assess(&report, config, integrity);

        tracing::debug!(
            id = record.log_uuid(),
            mode = %transformed.mode,
            integrity = %integrity,
            "Processed packet"
        );

        Ok(PipelineOutcome {
            report,
            transformed,
            integrity,
            record,
            steps,
        })
    }
}
