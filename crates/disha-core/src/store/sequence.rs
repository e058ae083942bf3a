// ── Per-resource request sequencing ──
//
// Each refresh takes a ticket before its request goes out. A response is
// applied only if its ticket is newer than the last one applied for that
// resource, so a slow response can never overwrite a fresher one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Ticket(u64);

#[derive(Debug, Default)]
pub(crate) struct SequenceGuard {
    issued: AtomicU64,
    applied: Mutex<u64>,
}

impl SequenceGuard {
    pub(crate) fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Run `apply` if `ticket` is the newest seen so far.
    ///
    /// The check and the write happen under one lock, so two responses
    /// racing on different worker threads still apply in ticket order.
    pub(crate) fn commit(&self, ticket: Ticket, apply: impl FnOnce()) -> bool {
        let mut applied = self.applied.lock().unwrap_or_else(PoisonError::into_inner);
        if ticket.0 <= *applied {
            return false;
        }
        *applied = ticket.0;
        apply();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_ticket_wins() {
        let guard = SequenceGuard::default();
        let first = guard.issue();
        let second = guard.issue();

        assert!(guard.commit(second, || {}));
        assert!(!guard.commit(first, || panic!("stale ticket applied")));
    }

    #[test]
    fn in_order_tickets_all_apply() {
        let guard = SequenceGuard::default();
        let mut hits = 0;
        for _ in 0..3 {
            let ticket = guard.issue();
            guard.commit(ticket, || hits += 1);
        }
        assert_eq!(hits, 3);
    }
}
