//! Audit events emitted by manufacturing saves.

pub mod audit;
pub mod in_memory;

pub use audit::{AuditAction, AuditEntry, AuditLog};
pub use in_memory::{InMemoryAuditError, InMemoryAuditLog};
