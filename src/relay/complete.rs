//! At-most-once response finalization.
//!
//! # Responsibilities
//! - Track whether a terminal response has been produced for one request
//! - Arbitrate between completion sources (success, error, timeout)
//!
//! # Design Decisions
//! - Explicit state machine: {pending, finalized}, one legal transition
//! - Compare-and-set rather than a checked flag, so the claim itself is
//!   the transition and cannot be split from the check

use std::sync::atomic::{AtomicBool, Ordering};

/// Completion token scoped to one inbound request.
///
/// Every path that could produce the terminal response (initial success,
/// redirect success, upstream error, transport error, timeout) must claim
/// the token first. Exactly one claim succeeds for the token's lifetime;
/// the losers must not write a status or body.
#[derive(Debug, Default)]
pub struct CompletionToken {
    finalized: AtomicBool,
}

impl CompletionToken {
    /// Create a token in the pending state.
    pub fn new() -> Self {
        Self {
            finalized: AtomicBool::new(false),
        }
    }

    /// Attempt the pending → finalized transition.
    ///
    /// Returns `true` for exactly one caller; every later call returns
    /// `false`.
    pub fn try_claim(&self) -> bool {
        self.finalized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether the terminal response has already been produced.
    pub fn is_finalized(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }
}
