//! # Fetch and delete cancellation scopes.
//!
//! Two **independent** tokens (neither is a child of the other):
//!
//! ```text
//! fetch  ── cancelled on interrupt ──► consumers stop receiving, finish the current message
//! delete ── cancelled by the supervisor after the last consumer returned
//! ```
//!
//! Keeping them unrelated lets deletions of in-flight messages complete after
//! fetching has stopped. Cancelling either token again is a no-op.

use tokio_util::sync::CancellationToken;

/// The pair of cancellation scopes owned by a [`Supervisor`](crate::Supervisor).
#[derive(Clone, Debug, Default)]
pub struct Scopes {
    fetch: CancellationToken,
    delete: CancellationToken,
}

impl Scopes {
    /// Creates two fresh, unrelated scopes.
    pub fn new() -> Self {
        Self {
            fetch: CancellationToken::new(),
            delete: CancellationToken::new(),
        }
    }

    /// Scope governing receiving and processing.
    pub fn fetch(&self) -> &CancellationToken {
        &self.fetch
    }

    /// Scope governing acknowledgement of processed messages.
    pub fn delete(&self) -> &CancellationToken {
        &self.delete
    }

    /// Requests graceful shutdown: stop taking new work.
    ///
    /// Returns `true` if this call performed the cancellation.
    pub fn cancel_fetch(&self) -> bool {
        let first = !self.fetch.is_cancelled();
        self.fetch.cancel();
        first
    }

    /// Returns `true` once graceful shutdown has been requested.
    pub fn is_draining(&self) -> bool {
        self.fetch.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_are_independent() {
        let scopes = Scopes::new();
        scopes.fetch().cancel();
        assert!(scopes.is_draining());
        assert!(!scopes.delete().is_cancelled());

        let scopes = Scopes::new();
        scopes.delete().cancel();
        assert!(!scopes.fetch().is_cancelled());
    }

    #[test]
    fn cancelling_twice_is_a_no_op() {
        let scopes = Scopes::new();
        assert!(scopes.cancel_fetch());
        assert!(!scopes.cancel_fetch());
        assert!(scopes.fetch().is_cancelled());

        scopes.delete().cancel();
        scopes.delete().cancel();
        assert!(scopes.delete().is_cancelled());
    }

    #[test]
    fn clones_share_state() {
        let scopes = Scopes::new();
        let observer = scopes.clone();
        scopes.cancel_fetch();
        assert!(observer.is_draining());
    }
}
