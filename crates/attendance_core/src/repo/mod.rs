//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value storage contract stores persist through.
//! - Isolate SQLite and JSON encoding details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors in addition to DB transport
//!   errors.

pub mod kv_repo;
pub mod state_repo;
