//! Core use-case services.
//!
//! # Responsibility
//! - Own store state and orchestrate repository writes.
//! - Keep view/CLI layers decoupled from storage details.
//!
//! # Invariants
//! - Stores are explicit values handed to their consumers; no ambient state.

pub mod attendance_service;
pub mod identity_service;
pub mod metrics;
pub mod notify;
pub mod sheet;

/// Whether a store is still writing through to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceMode {
    /// Every mutation is mirrored to storage.
    Durable,
    /// A write failed; state lives in memory until a successful `flush`.
    MemoryOnly,
}
