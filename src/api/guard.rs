//! Response guards.
//!
//! Every outcome of a request made through [`ApiClient`](super::ApiClient)
//! is shown to the registered guards before the caller sees it. The session
//! store uses this to turn any 401 into a forced logout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use reqwest::{Method, StatusCode};

use crate::shared::error::ApiError;

/// One finished request, as seen by a guard.
#[derive(Debug)]
pub struct Exchange<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    /// Bearer credential the request was sent with.
    pub credential: Option<&'a str>,
    /// Response status on success, the classified failure otherwise.
    pub outcome: Result<StatusCode, &'a ApiError>,
}

/// Post-response hook.
///
/// Called synchronously on the task that made the request. Implementations
/// must not block.
pub trait ResponseGuard: Send + Sync {
    fn inspect(&self, exchange: &Exchange<'_>);
}

type Entry = (u64, Arc<dyn ResponseGuard>);

#[derive(Default)]
pub(crate) struct GuardRegistry {
    next_id: AtomicU64,
    guards: Mutex<Vec<Entry>>,
}

impl GuardRegistry {
    pub(crate) fn register(self: &Arc<Self>, guard: Arc<dyn ResponseGuard>) -> GuardHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries().push((id, guard));
        GuardHandle {
            id,
            registry: Arc::downgrade(self),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries().len()
    }

    pub(crate) fn dispatch(&self, exchange: &Exchange<'_>) {
        // Snapshot so a guard may register or eject guards while running.
        let guards: Vec<Arc<dyn ResponseGuard>> =
            self.entries().iter().map(|(_, guard)| Arc::clone(guard)).collect();
        for guard in guards {
            guard.inspect(exchange);
        }
    }

    fn eject(&self, id: u64) -> bool {
        let mut guards = self.entries();
        let before = guards.len();
        guards.retain(|(entry_id, _)| *entry_id != id);
        guards.len() != before
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Vec<Entry>> {
        self.guards.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registration of a guard. Dropping it deregisters the guard.
#[must_use = "dropping the handle deregisters the guard immediately"]
pub struct GuardHandle {
    id: u64,
    registry: Weak<GuardRegistry>,
}

impl GuardHandle {
    /// Deregister the guard now.
    pub fn eject(self) {
        drop(self);
    }

    /// Whether the guard is still registered with a live client.
    pub fn is_active(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let registered = registry
            .entries()
            .iter()
            .any(|(entry_id, _)| *entry_id == self.id);
        registered
    }
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.eject(self.id);
        }
    }
}

impl std::fmt::Debug for GuardHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardHandle").field("id", &self.id).finish()
    }
}
