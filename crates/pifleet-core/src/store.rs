// ── Instance store ──
//
// The persisted instance collection is the one shared mutable resource.
// Writers load the latest collection, apply their changes by id and save
// the whole collection back as one unit.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CoreError;
use crate::model::Instance;

/// Persistence for the instance collection.
///
/// Implementations only load and save whole collections; merging and the
/// single-reference invariant are handled by the fleet.
pub trait InstanceStore: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = Result<Vec<Instance>, CoreError>> + Send;

    fn save(&self, instances: &[Instance]) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl<T: InstanceStore> InstanceStore for Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Vec<Instance>, CoreError>> + Send {
        (**self).load()
    }

    fn save(&self, instances: &[Instance]) -> impl Future<Output = Result<(), CoreError>> + Send {
        (**self).save(instances)
    }
}

/// In-process store. Counts saves so callers can assert on write traffic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    instances: Mutex<Vec<Instance>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self {
            instances: Mutex::new(instances),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of completed saves.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<Instance> {
        self.instances.lock().await.clone()
    }
}

impl InstanceStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Instance>, CoreError> {
        Ok(self.instances.lock().await.clone())
    }

    async fn save(&self, instances: &[Instance]) -> Result<(), CoreError> {
        *self.instances.lock().await = instances.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Collection helpers ───────────────────────────────────────────────

/// Next free id: one past the highest in use, starting at 1.
pub fn next_id(instances: &[Instance]) -> u32 {
    instances
        .iter()
        .map(|i| i.id)
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

/// Make `id` the only reference.
pub fn assign_reference(instances: &mut [Instance], id: u32) {
    for instance in instances {
        instance.is_reference = instance.id == id;
    }
}

/// Restore "exactly one reference" after a removal or demotion: keeps the
/// first flagged instance, otherwise promotes the first in the collection.
pub fn promote_reference(instances: &mut [Instance]) {
    let keep = instances
        .iter()
        .find(|i| i.is_reference)
        .or_else(|| instances.first())
        .map(|i| i.id);
    if let Some(id) = keep {
        assign_reference(instances, id);
    }
}

/// The flagged reference of a collection.
pub fn reference(instances: &[Instance]) -> Result<&Instance, CoreError> {
    instances
        .iter()
        .find(|i| i.is_reference)
        .ok_or(CoreError::ReferenceNotFound)
}

/// Apply session fields and statuses computed elsewhere onto the latest
/// collection, matching by id. Updates for removed instances are dropped,
/// as are updates resolved against a URL or API key that has since been
/// edited.
pub fn merge_session_state(latest: &mut [Instance], updates: &[Instance]) {
    for update in updates {
        let Some(target) = latest.iter_mut().find(|i| i.id == update.id) else {
            continue;
        };
        if target.url != update.url || target.api_key != update.api_key {
            debug!(id = update.id, instance = %target.name, "credentials changed meanwhile, dropping session update");
            continue;
        }
        target.adopt_session_state(update);
    }
}
