//! Warning side channel for suppressed evaluation failures.
//!
//! Some failures do not surface in the returned value: arithmetic type
//! mismatches evaluate to `null`, a non-boolean `if` condition is treated as
//! `false`, and a non-boolean `not` operand evaluates to `null`. Each of these
//! emits a [`Warning`] record so decision authors can still diagnose the
//! expression. The sink never affects the returned value.

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// Classification of a suppressed failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// Arithmetic over operand types outside the dispatch table
    InvalidType,
    /// Non-boolean `if` condition, treated as `false`
    InvalidCondition,
    /// Non-boolean `not` operand, evaluated to `null`
    InvalidNegand,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::InvalidType => write!(f, "INVALID_TYPE"),
            WarningKind::InvalidCondition => write!(f, "INVALID_CONDITION"),
            WarningKind::InvalidNegand => write!(f, "INVALID_NEGAND"),
        }
    }
}

/// A single suppressed-failure record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Receiver for warning records. Must be thread-safe; ordering of records is
/// not part of the contract.
pub trait WarningSink: Send + Sync {
    fn emit(&self, warning: Warning);
}

/// Default sink: forwards records to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn emit(&self, warning: Warning) {
        tracing::warn!(kind = %warning.kind, "{}", warning.message);
    }
}

/// Test sink that keeps every record for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<Warning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records emitted so far, in emission order.
    pub fn records(&self) -> Vec<Warning> {
        self.records.lock().expect("warning sink poisoned").clone()
    }

    /// Remove and return all records emitted so far.
    pub fn drain(&self) -> Vec<Warning> {
        std::mem::take(&mut *self.records.lock().expect("warning sink poisoned"))
    }
}

impl WarningSink for CollectingSink {
    fn emit(&self, warning: Warning) {
        self.records
            .lock()
            .expect("warning sink poisoned")
            .push(warning);
    }
}
