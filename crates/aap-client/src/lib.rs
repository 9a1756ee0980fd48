//! aap-client
//!
//! Blocking client for the AAP `/command` and `/query` endpoints, and the
//! smoke scenarios run by `aap-smoke`.

pub mod client;
pub mod error;
pub mod scenario;
pub mod token;
