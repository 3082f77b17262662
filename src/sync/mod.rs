//! Offline-first synchronization engine.
//!
//! Mutations made while offline land in a durable FIFO outbox
//! ([`SyncQueue`]) and are replayed against the remote API on [`flush`],
//! honoring per-operation backoff. [`SyncStatusReporter`] aggregates queue
//! size, connectivity, and last-sync bookkeeping for display, and guards
//! manual flushes against re-entry.
//!
//! [`flush`]: SyncQueue::flush

mod connectivity;
mod op;
mod queue;
mod status;

pub use connectivity::{Connectivity, NetworkMonitor};
pub use op::{op_id, Action, NewSyncOperation, Resource, SyncOperation};
pub use queue::{FlushReport, SyncQueue};
pub use status::{SyncStatus, SyncStatusReporter};
