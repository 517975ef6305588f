//! Domain layer for greener-reporter.
//!
//! Contains the canonical types shared across all modules:
//! - `TestcaseRequest`: The record that flows through the batcher
//! - `SessionRequest` / `Session`: The synchronous session path
//! - `ReporterError`: Top-level error type

pub mod error;
pub mod session;
pub mod testcase;

pub use error::ReporterError;
pub use session::{Label, Session, SessionRequest, parse_label_args, parse_labels};
pub use testcase::{Baggage, TestcaseRequest, TestcaseStatus, parse_baggage};
