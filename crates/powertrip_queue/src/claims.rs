//! At-most-once bookkeeping for terminal actions.

use parking_lot::Mutex;
use powertrip_core::MessageHandle;
use std::collections::{HashSet, VecDeque};

/// Records which mirrors a terminal action currently owns or has finished.
///
/// A handle can be claimed once. Failure releases the claim; success keeps
/// it in a bounded FIFO so late duplicate clicks stay no-ops.
#[derive(Debug)]
pub struct ClaimLedger {
    state: Mutex<ClaimState>,
}

#[derive(Debug)]
struct ClaimState {
    in_flight: HashSet<MessageHandle>,
    completed: HashSet<MessageHandle>,
    order: VecDeque<MessageHandle>,
    capacity: usize,
}

impl ClaimLedger {
    /// Create a ledger remembering at most `capacity` completed claims.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(ClaimState {
                in_flight: HashSet::new(),
                completed: HashSet::new(),
                order: VecDeque::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Claim a handle. Returns false when it is in flight or already done.
    pub fn try_claim(&self, handle: MessageHandle) -> bool {
        let mut state = self.state.lock();
        if state.completed.contains(&handle) {
            return false;
        }
        state.in_flight.insert(handle)
    }

    /// Whether a handle is in flight or done.
    pub fn is_claimed(&self, handle: MessageHandle) -> bool {
        let state = self.state.lock();
        state.in_flight.contains(&handle) || state.completed.contains(&handle)
    }

    /// Mark a claimed action as successful.
    pub fn complete(&self, handle: MessageHandle) {
        let mut state = self.state.lock();
        state.in_flight.remove(&handle);
        if state.completed.insert(handle) {
            state.order.push_back(handle);
        }
        while state.order.len() > state.capacity {
            if let Some(evicted) = state.order.pop_front() {
                state.completed.remove(&evicted);
            }
        }
    }

    /// Give a claim back after a failure.
    pub fn release(&self, handle: MessageHandle) {
        self.state.lock().in_flight.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_until_release() {
        let ledger = ClaimLedger::new(8);
        let handle = MessageHandle::from(1);
        assert!(ledger.try_claim(handle));
        assert!(!ledger.try_claim(handle));
        ledger.release(handle);
        assert!(ledger.try_claim(handle));
    }

    #[test]
    fn completed_claims_stay_claimed() {
        let ledger = ClaimLedger::new(8);
        let handle = MessageHandle::from(1);
        assert!(ledger.try_claim(handle));
        ledger.complete(handle);
        assert!(!ledger.try_claim(handle));
        assert!(ledger.is_claimed(handle));
    }

    #[test]
    fn oldest_completed_claim_is_evicted() {
        let ledger = ClaimLedger::new(2);
        for raw in 1..=3 {
            let handle = MessageHandle::from(raw);
            assert!(ledger.try_claim(handle));
            ledger.complete(handle);
        }
        assert!(!ledger.is_claimed(MessageHandle::from(1)));
        assert!(ledger.is_claimed(MessageHandle::from(2)));
        assert!(ledger.is_claimed(MessageHandle::from(3)));
    }
}
