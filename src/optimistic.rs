// Optimistic local updates: show the change immediately, confirm or roll
// back once the authoritative operation settles.
use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::error::{ChannelError, ChannelResult};

/// Settlement state of a speculative mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementState {
    Pending,
    Confirmed,
    RolledBack,
}

/// Coordinates speculative local changes. Each call owns exactly one
/// speculative record; concurrent operations on different records are
/// independent and never block one another.
pub struct OptimisticCoordinator {
    next_id: AtomicU64,
    pending: DashMap<u64, SettlementState>,
}

impl Default for OptimisticCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimisticCoordinator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: DashMap::new(),
        }
    }

    /// Operations applied locally but not yet settled.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Apply `temp` to local state synchronously, run the authoritative
    /// operation, then either replace the speculative record with the
    /// authoritative one or revert completely. On failure the observable
    /// local state is identical to the state before the call.
    pub async fn optimistic_create<T, A, R, F>(
        &self,
        temp: T,
        apply_locally: A,
        remove_locally: R,
        server_operation: F,
    ) -> ChannelResult<T>
    where
        T: Clone,
        A: Fn(&T),
        R: Fn(&T),
        F: Future<Output = ChannelResult<T>>,
    {
        let op_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.pending.insert(op_id, SettlementState::Pending);

        // Visible immediately, before the server round-trip
        apply_locally(&temp);

        match server_operation.await {
            Ok(authoritative) => {
                // Swap the speculative record for the authoritative one in
                // the same visual slot
                remove_locally(&temp);
                apply_locally(&authoritative);
                self.pending.remove(&op_id);
                debug!(op_id, "optimistic operation confirmed");
                Ok(authoritative)
            }
            Err(error) => {
                remove_locally(&temp);
                self.pending.remove(&op_id);
                debug!(op_id, %error, "optimistic operation rolled back");
                Err(error)
            }
        }
    }
}
