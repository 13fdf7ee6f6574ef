/// Time-window filters and report cutoffs
pub mod filter;
/// Movement value types and validation rules
pub mod movement;
/// Report formats (CSV, JSON)
pub mod report;
/// Stateful view over the store with balance and undo
pub mod session;
/// Durable movement persistence
pub mod store;
