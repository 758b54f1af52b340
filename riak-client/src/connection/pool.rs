//! Bounded connection pool for a single node.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use riak_core::{Result, RiakError};

use super::connection::Connection;

/// What a non-blocking acquire produced.
#[derive(Debug)]
pub enum Acquire {
    /// An idle connection ready for use.
    Idle(Connection),
    /// No idle connection, but a creation slot was reserved. The caller
    /// must follow up with [`NodePool::commit_new`] after a successful
    /// connect or [`NodePool::abort_new`] after a failed one.
    Permit,
    /// The pool is at capacity with nothing idle.
    Exhausted,
}

#[derive(Debug)]
struct PoolState {
    idle: VecDeque<Connection>,
    live: usize,
    pending: usize,
    draining: bool,
}

/// A bounded pool of connections to one node.
///
/// Acquire is non-blocking: callers get an idle connection, a permit to
/// create one, or nothing. Connections being created count against
/// capacity from the moment the permit is handed out, so concurrent
/// acquires cannot overshoot the configured size.
#[derive(Debug)]
pub struct NodePool {
    capacity: usize,
    idle_timeout: Duration,
    state: Mutex<PoolState>,
}

impl NodePool {
    /// Creates an empty pool with the given capacity.
    pub fn new(capacity: usize, idle_timeout: Duration) -> Self {
        Self {
            capacity,
            idle_timeout,
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                live: 0,
                pending: 0,
                draining: false,
            }),
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Non-blocking acquire.
    ///
    /// Idle connections are handed out oldest-first; stale ones (idle
    /// longer than the configured idle timeout) are discarded on the way.
    /// Fails with [`RiakError::ShuttingDown`] once the pool is draining.
    pub fn try_acquire(&self) -> Result<Acquire> {
        let mut state = self.state.lock().expect("pool lock poisoned");

        if state.draining {
            return Err(RiakError::ShuttingDown);
        }

        while let Some(conn) = state.idle.pop_front() {
            if conn.idle_for() > self.idle_timeout {
                state.live -= 1;
                tracing::debug!(id = %conn.id(), "discarding stale idle connection");
                continue;
            }
            return Ok(Acquire::Idle(conn));
        }

        if state.live + state.pending < self.capacity {
            state.pending += 1;
            return Ok(Acquire::Permit);
        }

        Ok(Acquire::Exhausted)
    }

    /// Converts a creation permit into a live connection slot.
    pub fn commit_new(&self) {
        let mut state = self.state.lock().expect("pool lock poisoned");
        state.pending -= 1;
        state.live += 1;
    }

    /// Returns a creation permit after a failed connect.
    pub fn abort_new(&self) {
        let mut state = self.state.lock().expect("pool lock poisoned");
        state.pending -= 1;
    }

    /// Returns a borrowed connection to the pool.
    ///
    /// Healthy, settled connections rejoin the idle set; broken or
    /// mid-request ones (or any, once draining) are closed and their
    /// capacity slot reclaimed.
    pub fn release(&self, conn: Connection, healthy: bool) {
        let mut state = self.state.lock().expect("pool lock poisoned");

        if healthy && conn.is_reusable() && !state.draining {
            state.idle.push_back(conn);
        } else {
            state.live -= 1;
            tracing::debug!(id = %conn.id(), "closing connection on release");
        }
    }

    /// Closes all idle connections and fails subsequent acquires.
    ///
    /// Connections currently borrowed are closed when released.
    pub fn drain(&self) {
        let mut state = self.state.lock().expect("pool lock poisoned");
        state.draining = true;
        let dropped = state.idle.len();
        state.live -= dropped;
        state.idle.clear();
        if dropped > 0 {
            tracing::debug!(count = dropped, "drained idle connections");
        }
    }

    /// Returns the number of live connections (idle plus borrowed).
    pub fn live_count(&self) -> usize {
        self.state.lock().expect("pool lock poisoned").live
    }

    /// Returns the number of idle connections.
    pub fn idle_count(&self) -> usize {
        self.state.lock().expect("pool lock poisoned").idle.len()
    }
}
