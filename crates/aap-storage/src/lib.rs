//! aap-storage
//!
//! The Aggregate Store: per-assessment append-only event logs, kept in memory
//! or in S3. S3 access is a thin wrapper around the AWS S3 SDK.

pub mod client;
pub mod conflict;
pub mod error;
pub mod memory;
pub mod objects;
pub mod s3;
pub mod state;
pub mod store;
