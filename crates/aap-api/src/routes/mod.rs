pub mod command;
pub mod health;
pub mod query;
