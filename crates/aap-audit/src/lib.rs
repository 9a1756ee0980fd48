//! aap-audit
//!
//! Structured audit records for commands applied to assessments.

pub mod events;
