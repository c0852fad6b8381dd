//! In-memory audit log for tests/dev.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use crate::audit::{AuditEntry, AuditLog};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InMemoryAuditError {
    /// A writer panicked while holding the log; reads and appends both fail.
    #[error("audit log lock poisoned")]
    Poisoned,
}

/// In-memory append-only audit log.
///
/// - No IO
/// - Entries kept in append order
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every entry appended so far.
    pub fn entries(&self) -> Result<Vec<AuditEntry>, InMemoryAuditError> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> Result<usize, InMemoryAuditError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, InMemoryAuditError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<AuditEntry>>, InMemoryAuditError> {
        self.entries.lock().map_err(|_| InMemoryAuditError::Poisoned)
    }
}

impl AuditLog for InMemoryAuditLog {
    type Error = InMemoryAuditError;

    fn record(&self, entry: AuditEntry) -> Result<(), Self::Error> {
        self.lock()?.push(entry);
        Ok(())
    }
}
