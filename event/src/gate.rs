//! Authorization gate.
//!
//! Read-only views of the node's epoch and voting-membership state. The
//! state itself is owned by the epoch tracker; handlers query it at the
//! moment they run and never cache answers across events.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Source of the current epoch number.
pub trait EpochState: Send + Sync {
    /// Returns the current epoch.
    fn epoch_counter(&self) -> u64;
}

/// Source of the node's voting-membership status.
pub trait AlphabetState: Send + Sync {
    /// Returns true if the node is currently an alphabet (voting) member.
    fn is_alphabet(&self) -> bool;
}

/// Combined view over [`EpochState`] and [`AlphabetState`].
#[derive(Clone)]
pub struct AuthorizationGate {
    epoch: Arc<dyn EpochState>,
    alphabet: Arc<dyn AlphabetState>,
}

impl AuthorizationGate {
    /// Creates a gate over the given capabilities.
    #[must_use]
    pub fn new(epoch: Arc<dyn EpochState>, alphabet: Arc<dyn AlphabetState>) -> Self {
        Self { epoch, alphabet }
    }

    /// Returns the current epoch.
    #[must_use]
    pub fn current_epoch(&self) -> u64 {
        self.epoch.epoch_counter()
    }

    /// Returns true if the node currently votes.
    #[must_use]
    pub fn is_voting_member(&self) -> bool {
        self.alphabet.is_alphabet()
    }
}

impl fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("epoch", &self.current_epoch())
            .field("alphabet", &self.is_voting_member())
            .finish()
    }
}

/// Monotonic in-memory epoch counter.
#[derive(Debug, Default)]
pub struct EpochCounter {
    epoch: AtomicU64,
}

impl EpochCounter {
    /// Creates a counter starting at `epoch`.
    #[must_use]
    pub const fn new(epoch: u64) -> Self {
        Self {
            epoch: AtomicU64::new(epoch),
        }
    }

    /// Moves the counter forward to `epoch`. Never moves it back.
    ///
    /// Returns the epoch after the update.
    pub fn advance_to(&self, epoch: u64) -> u64 {
        self.epoch.fetch_max(epoch, Ordering::AcqRel).max(epoch)
    }
}

impl EpochState for EpochCounter {
    fn epoch_counter(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}

/// In-memory alphabet membership flag.
#[derive(Debug, Default)]
pub struct AlphabetFlag {
    alphabet: AtomicBool,
}

impl AlphabetFlag {
    /// Creates a flag with the given initial status.
    #[must_use]
    pub const fn new(alphabet: bool) -> Self {
        Self {
            alphabet: AtomicBool::new(alphabet),
        }
    }

    /// Updates the membership status.
    pub fn set(&self, alphabet: bool) {
        self.alphabet.store(alphabet, Ordering::Release);
    }
}

impl AlphabetState for AlphabetFlag {
    fn is_alphabet(&self) -> bool {
        self.alphabet.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_counter_monotonic() {
        let counter = EpochCounter::new(5);

        assert_eq!(counter.advance_to(7), 7);
        assert_eq!(counter.advance_to(3), 7);
        assert_eq!(counter.epoch_counter(), 7);
    }

    #[test]
    fn test_gate_queries_fresh_state() {
        let epoch = Arc::new(EpochCounter::new(1));
        let alphabet = Arc::new(AlphabetFlag::new(false));
        let gate = AuthorizationGate::new(
            Arc::clone(&epoch) as Arc<dyn EpochState>,
            Arc::clone(&alphabet) as Arc<dyn AlphabetState>,
        );

        assert_eq!(gate.current_epoch(), 1);
        assert!(!gate.is_voting_member());

        epoch.advance_to(2);
        alphabet.set(true);

        assert_eq!(gate.current_epoch(), 2);
        assert!(gate.is_voting_member());
    }
}
