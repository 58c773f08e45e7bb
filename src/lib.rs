//! IoT Privacy - GDPR privacy policies for simulated IoT telemetry
//!
//! Applies pseudonymization, anonymization, field masking and minimization
//! to device packets, and proves with an integrity digest that the
//! measurement payload survived the redaction pass untouched.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   Packet   ┌────────────────────────────────────────────┐
//! │  Simulator   │──────────▶│               Privacy Pipeline              │
//! │ (smart home, │            │  ┌────────────┐  ┌──────────────┐          │
//! │  wearable)   │            │  │ Classifier │─▶│ PolicyEngine │          │
//! └──────────────┘            │  │  (scan)    │  │ (transform)  │          │
//!                             │  └────────────┘  └──────┬───────┘          │
//!                             │                         ▼                  │
//!                             │  ┌──────────────┐  ┌────────────┐          │
//!                             │  │ AuditRecord  │◀─│ Integrity  │          │
//!                             │  │   (build)    │  │ (verify)   │          │
//!                             │  └──────┬───────┘  └────────────┘          │
//!                             └─────────┼──────────────────────────────────┘
//!                                       ▼
//!                             ┌────────────────────┐
//!                             │ AuditLog ─▶ CSV    │
//!                             └────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`packet`]: Telemetry packet model
//! - [`privacy`]: Field classification, policies and integrity digests
//! - [`audit`]: Audit records and the in-memory log
//! - [`pipeline`]: Scan → transform → verify → audit
//! - [`simulator`]: Simulated device packets
//! - [`config`]: Configuration management

pub mod audit;
pub mod config;
pub mod error;
pub mod packet;
pub mod pipeline;
pub mod privacy;
pub mod simulator;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use packet::{Fields, Packet};
pub use pipeline::{PipelineOutcome, PrivacyPipeline};
