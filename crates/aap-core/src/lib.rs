//! aap-core
//!
//! Pure domain types for the Assessment Aggregation Platform: wire commands
//! and queries, stored events, the projector that folds them into versioned
//! read models, and the store key layout.
//! No AWS SDK or HTTP dependency; this is the shared vocabulary of the service
//! and its clients.

pub mod decide;
pub mod error;
pub mod models;
pub mod projector;
pub mod store_keys;
pub mod time;
pub mod version;
