pub mod assessment;
pub mod command;
pub mod event;
pub mod identifier;
pub mod query;
pub mod timeline;
pub mod user;
