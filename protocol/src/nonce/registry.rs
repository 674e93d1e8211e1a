//! Nonce issuance and consumption.
//!
//! The registry is the only shared mutable state in the protocol. Every
//! mutation happens inside a single `DashMap` entry guard, which holds the
//! shard's write lock for the whole check-and-mutate step:
//!
//! - two concurrent `issue` calls on one context never see the same counter;
//! - two concurrent `try_consume` calls on one nonce never both win.
//!
//! There is no read-then-write anywhere in this file. Keep it that way.

use std::collections::{BTreeSet, HashSet};

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, trace, warn};

use super::{Nonce, NonceContext};

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// Lifecycle state of one nonce within one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NonceState {
    /// Never handed out by `issue`.
    Unissued,
    /// Handed to a signer, not yet accepted by a verifier.
    Issued,
    /// Accepted once. Terminal.
    Consumed,
}

/// Per-context bookkeeping.
#[derive(Debug)]
struct ContextState {
    next_nonce: Nonce,
    consumed: HashSet<Nonce>,
}

impl Default for ContextState {
    fn default() -> Self {
        Self {
            next_nonce: Nonce::ZERO,
            consumed: HashSet::new(),
        }
    }
}

/// Point-in-time copy of one context, for inspection and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSnapshot {
    pub next_nonce: Nonce,
    /// Sorted so snapshots compare and print deterministically.
    pub consumed: BTreeSet<Nonce>,
}

// ---------------------------------------------------------------------------
// NonceRegistry
// ---------------------------------------------------------------------------

/// Tracks issued and consumed nonces for any number of contexts.
///
/// Contexts are created lazily, on first `issue`, starting at nonce 0. They
/// are never removed.
///
/// Share one registry between a signer and a verifier with `Arc`; the type
/// is `Send + Sync`.
#[derive(Debug, Default)]
pub struct NonceRegistry {
    contexts: DashMap<NonceContext, ContextState>,
}

impl NonceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next nonce for `context` and advance the counter.
    ///
    /// Never fails. The first call for a context returns `0`, and every
    /// later call returns exactly one more than the previous, up to
    /// `u64::MAX - 1`. After that the context is exhausted: every call
    /// returns [`Nonce::EXHAUSTED`], which `try_consume` always refuses.
    pub fn issue(&self, context: &NonceContext) -> Nonce {
        let mut state = self.contexts.entry(context.clone()).or_default();
        let nonce = state.next_nonce;
        if nonce.is_exhausted() {
            warn!(context = %context, "nonce space exhausted; signatures will not verify");
            return Nonce::EXHAUSTED;
        }
        // Issuing u64::MAX - 1 moves the counter onto the terminal marker.
        state.next_nonce = nonce.next().unwrap_or(Nonce::EXHAUSTED);
        trace!(context = %context, nonce = nonce.value(), "nonce issued");
        nonce
    }

    /// Mark `nonce` consumed if and only if it was issued in `context` and
    /// has not been consumed yet.
    ///
    /// Returns `true` exactly once per issued nonce. Every other call
    /// (replays, nonces from an unknown context, nonces that were never
    /// issued) returns `false` and leaves the registry untouched.
    pub fn try_consume(&self, context: &NonceContext, nonce: Nonce) -> bool {
        let Some(mut state) = self.contexts.get_mut(context) else {
            debug!(context = %context, nonce = nonce.value(), "consume refused: unknown context");
            return false;
        };

        if nonce >= state.next_nonce {
            debug!(context = %context, nonce = nonce.value(), "consume refused: nonce never issued");
            return false;
        }

        let fresh = state.consumed.insert(nonce);
        if fresh {
            trace!(context = %context, nonce = nonce.value(), "nonce consumed");
        } else {
            debug!(context = %context, nonce = nonce.value(), "consume refused: replay");
        }
        fresh
    }

    /// Where `nonce` sits in its lifecycle.
    ///
    /// Separate from verification on purpose: `verify` answers only
    /// yes/no, and callers who need to tell "replayed" from "invalid" ask
    /// here.
    pub fn state_of(&self, context: &NonceContext, nonce: Nonce) -> NonceState {
        match self.contexts.get(context) {
            None => NonceState::Unissued,
            Some(state) if nonce >= state.next_nonce => NonceState::Unissued,
            Some(state) if state.consumed.contains(&nonce) => NonceState::Consumed,
            Some(_) => NonceState::Issued,
        }
    }

    /// Copy out the state of one context. `None` if it was never used.
    pub fn snapshot(&self, context: &NonceContext) -> Option<ContextSnapshot> {
        self.contexts.get(context).map(|state| ContextSnapshot {
            next_nonce: state.next_nonce,
            consumed: state.consumed.iter().copied().collect(),
        })
    }

    /// Every context that has issued at least one nonce, sorted by label.
    pub fn contexts(&self) -> Vec<NonceContext> {
        let mut labels: Vec<NonceContext> =
            self.contexts.iter().map(|entry| entry.key().clone()).collect();
        labels.sort();
        labels
    }
}
