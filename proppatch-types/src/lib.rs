//! Shared DTOs (schemas-as-code) for the proppatch workspace.
//!
//! # Design constraints
//! - These types are intended to be serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const PROPPATCH_REPORT_V1: &str = "proppatch.report.v1";
}
