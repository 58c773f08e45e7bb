//! Audit trail for processed packets
//!
//! Records are built once per packet and appended to an in-memory log,
//! which can be exported as CSV for accountability.

pub mod log;
pub mod record;

pub use log::{new_session_id, AuditLog};
pub use record::{AuditRecord, HEADER_COLUMNS};
