//! Cooperative cancellation: one flag, shared by clone, checked at each
//! step's suspension points (a row, a chunk, a constraint). Setting it
//! doesn't stop anything by itself; each loop notices at its next
//! checkpoint and unwinds with [`crate::error::MigrationError::Cancelled`].

use crate::error::{MigrationError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Err(MigrationError::Cancelled)` if cancellation has been
    /// requested, `Ok(())` otherwise. Called at loop checkpoints instead
    /// of spelling out the `if is_cancelled()` branch at every call site.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(MigrationError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancel_is_observed_through_a_clone() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(MigrationError::Cancelled)));
    }
}
