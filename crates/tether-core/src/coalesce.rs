// Single-flight deduplication of logical operations.
//
// A manual "refresh" click and a background poll tick must never race
// two simultaneous status requests. Callers who arrive while the same
// key is in flight await the shared pending result instead of issuing
// their own request. Keys are operation-scoped ("status", "profiles",
// "connect:{id}"), so unrelated operations still run concurrently.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::ErrorKind;

/// Slots hold type-erased results so one map serves every operation.
type SharedResult = Result<Arc<dyn Any + Send + Sync>, ErrorKind>;
type SlotFuture = Shared<BoxFuture<'static, SharedResult>>;

/// At most one in-flight operation per key; concurrent callers share
/// the pending result. Once an operation settles the slot is cleared,
/// so the next call starts fresh.
#[derive(Default)]
pub struct RequestCoalescer {
    slots: Arc<DashMap<String, (u64, SlotFuture)>>,
    generation: AtomicU64,
}

impl RequestCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `make()` under `key`, or join the operation already running
    /// there.
    ///
    /// The factory is only invoked when no operation holds the slot.
    /// Success and failure are both shared with every joined caller,
    /// and both clear the slot on settle.
    pub async fn run<T, F, Fut>(&self, key: &str, make: F) -> Result<T, ErrorKind>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ErrorKind>> + Send + 'static,
    {
        let shared = {
            match self.slots.entry(key.to_owned()) {
                Entry::Occupied(entry) => entry.get().1.clone(),
                Entry::Vacant(entry) => {
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                    let slots = Arc::clone(&self.slots);
                    let slot_key = key.to_owned();
                    let fut = make();

                    let wrapped: BoxFuture<'static, SharedResult> = async move {
                        let result = fut
                            .await
                            .map(|value| Arc::new(value) as Arc<dyn Any + Send + Sync>);
                        // Clear the slot in the same poll that settles the
                        // operation: no awaiter observes the result while a
                        // stale slot is still joinable. The generation check
                        // means a future only ever clears the slot it was
                        // inserted under.
                        slots.remove_if(&slot_key, |_, (slot_gen, _)| *slot_gen == generation);
                        result
                    }
                    .boxed();

                    let shared = wrapped.shared();
                    entry.insert((generation, shared.clone()));
                    shared
                }
            }
        };

        let value = shared.await?;
        match value.downcast::<T>() {
            Ok(typed) => Ok(typed.as_ref().clone()),
            Err(_) => unreachable!("coalescer key {key:?} reused with a different result type"),
        }
    }

    /// Number of operations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.slots.len()
    }
}
