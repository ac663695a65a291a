use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fabrica_core::{EntityKind, QueryKey};
use log::debug;
use serde_json::Value;
use tokio::sync::{watch, Mutex};

use crate::{ClientError, ClientResult};

/// Cache lifecycle policy. Freshness is a serving optimization only;
/// invalidation correctness never depends on it.
#[derive(Clone, Copy, Debug)]
pub struct CachePolicy {
    /// How long a successful entry is served without refetching.
    pub fresh_for: Duration,
    /// How long an untouched entry survives before it is purged.
    pub purge_after: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            fresh_for: Duration::from_secs(30),
            purge_after: Duration::from_secs(300),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryStatus {
    Pending,
    Success,
    Error,
}

/// Read-only view of one cache slot.
#[derive(Clone, Debug)]
pub struct EntrySnapshot {
    pub status: EntryStatus,
    pub value: Option<Value>,
    pub error: Option<ClientError>,
    pub fetched_at: Option<Instant>,
}

#[derive(Clone)]
enum Outcome {
    Done(ClientResult<Value>),
    /// The slot was invalidated while the response was in flight; waiters
    /// must fetch again instead of using it.
    Superseded,
}

struct Flight {
    id: u64,
    rx: watch::Receiver<Option<Outcome>>,
}

enum SlotState {
    Vacant,
    Pending(Flight),
    Ready { value: Value, stale: bool },
    Failed { error: ClientError },
}

struct Slot {
    state: SlotState,
    generation: u64,
    fetched_at: Option<Instant>,
    touched_at: Instant,
}

impl Slot {
    fn new(now: Instant) -> Self {
        Self {
            state: SlotState::Vacant,
            generation: 0,
            fetched_at: None,
            touched_at: now,
        }
    }
}

enum Action {
    Return(ClientResult<Value>),
    Wait { rx: watch::Receiver<Option<Outcome>>, flight_id: u64 },
    Load { tx: watch::Sender<Option<Outcome>>, flight_id: u64, generation: u64 },
}

struct CacheInner {
    slots: Mutex<HashMap<QueryKey, Slot>>,
    policy: CachePolicy,
    flight_seq: AtomicU64,
}

/// Composite-key store behind every list/by-id read.
///
/// An explicit, injectable object: each test (and each console instance)
/// constructs its own. Cloning shares the underlying store.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl QueryCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                slots: Mutex::new(HashMap::new()),
                policy,
                flight_seq: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the entry under `key`, if one exists.
    pub async fn get(&self, key: &QueryKey) -> Option<EntrySnapshot> {
        let slots = self.inner.slots.lock().await;
        let slot = slots.get(key)?;
        let snapshot = match &slot.state {
            SlotState::Vacant => return None,
            SlotState::Pending(_) => EntrySnapshot {
                status: EntryStatus::Pending,
                value: None,
                error: None,
                fetched_at: slot.fetched_at,
            },
            SlotState::Ready { value, .. } => EntrySnapshot {
                status: EntryStatus::Success,
                value: Some(value.clone()),
                error: None,
                fetched_at: slot.fetched_at,
            },
            SlotState::Failed { error } => EntrySnapshot {
                status: EntryStatus::Error,
                value: None,
                error: Some(error.clone()),
                fetched_at: slot.fetched_at,
            },
        };
        Some(snapshot)
    }

    /// Serve `key` from cache or run `loader`, coalescing concurrent
    /// callers onto one in-flight load.
    ///
    /// Waiters joined to a flight all receive that flight's outcome,
    /// errors included; only a later `fetch` re-runs the loader after a
    /// failure. A response landing after an invalidation of its key is
    /// discarded and the loader runs again, so callers always observe
    /// post-invalidation data.
    pub async fn fetch<F, Fut>(&self, key: &QueryKey, mut loader: F) -> ClientResult<Value>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<Value>>,
    {
        loop {
            let action = self.begin(key).await;
            match action {
                Action::Return(result) => return result,
                Action::Wait { mut rx, flight_id } => {
                    match await_flight(&mut rx).await {
                        Some(Outcome::Done(result)) => {
                            debug!("cache: coalesced read key={key}");
                            return result;
                        }
                        Some(Outcome::Superseded) | None => {
                            // Invalidated mid-flight, or the initiating
                            // caller was dropped; adopt the slot and retry.
                            self.clear_wedged(key, flight_id).await;
                            continue;
                        }
                    }
                }
                Action::Load { tx, flight_id, generation } => {
                    debug!("cache: loading key={key}");
                    let result = loader().await;
                    match self.publish(key, &tx, flight_id, generation, result).await {
                        Some(result) => return result,
                        None => continue,
                    }
                }
            }
        }
    }

    async fn begin(&self, key: &QueryKey) -> Action {
        let mut slots = self.inner.slots.lock().await;
        let now = Instant::now();
        purge_idle(&mut slots, now, self.inner.policy.purge_after);
        let slot = slots
            .entry(key.clone())
            .or_insert_with(|| Slot::new(now));
        slot.touched_at = now;
        let fresh = slot
            .fetched_at
            .is_some_and(|at| now.duration_since(at) <= self.inner.policy.fresh_for);
        match &slot.state {
            SlotState::Ready { value, stale: false } if fresh => {
                debug!("cache: hit key={key}");
                Action::Return(Ok(value.clone()))
            }
            SlotState::Pending(flight) => Action::Wait {
                rx: flight.rx.clone(),
                flight_id: flight.id,
            },
            _ => {
                let (tx, rx) = watch::channel(None);
                let flight_id = self.inner.flight_seq.fetch_add(1, Ordering::Relaxed) + 1;
                let generation = slot.generation;
                slot.state = SlotState::Pending(Flight { id: flight_id, rx });
                Action::Load {
                    tx,
                    flight_id,
                    generation,
                }
            }
        }
    }

    /// Store a flight's result. Returns `None` when the result was
    /// superseded by an invalidation and the caller must fetch again.
    async fn publish(
        &self,
        key: &QueryKey,
        tx: &watch::Sender<Option<Outcome>>,
        flight_id: u64,
        generation: u64,
        result: ClientResult<Value>,
    ) -> Option<ClientResult<Value>> {
        let mut slots = self.inner.slots.lock().await;
        let now = Instant::now();
        let Some(slot) = slots.get_mut(key) else {
            let _ = tx.send(Some(Outcome::Superseded));
            return None;
        };
        slot.touched_at = now;
        let ours = matches!(&slot.state, SlotState::Pending(flight) if flight.id == flight_id);
        if slot.generation != generation {
            // The landed data may predate a write that invalidated this
            // key; it must not be served or stored.
            if ours {
                slot.state = SlotState::Vacant;
            }
            let _ = tx.send(Some(Outcome::Superseded));
            debug!("cache: discarding superseded response key={key}");
            return None;
        }
        if !ours {
            // The slot was adopted after this flight looked abandoned;
            // hand the data to our caller without storing it.
            let _ = tx.send(Some(Outcome::Superseded));
            return Some(result);
        }
        match result {
            Ok(value) => {
                slot.state = SlotState::Ready {
                    value: value.clone(),
                    stale: false,
                };
                slot.fetched_at = Some(now);
                let _ = tx.send(Some(Outcome::Done(Ok(value.clone()))));
                Some(Ok(value))
            }
            Err(error) => {
                slot.state = SlotState::Failed {
                    error: error.clone(),
                };
                let _ = tx.send(Some(Outcome::Done(Err(error.clone()))));
                Some(Err(error))
            }
        }
    }

    async fn clear_wedged(&self, key: &QueryKey, flight_id: u64) {
        let mut slots = self.inner.slots.lock().await;
        if let Some(slot) = slots.get_mut(key) {
            if let SlotState::Pending(flight) = &slot.state {
                if flight.id == flight_id && flight.rx.has_changed().is_err() {
                    slot.state = SlotState::Vacant;
                }
            }
        }
    }

    /// Invalidate every slot whose key matches `predicate`: ready entries
    /// become stale, failed entries are dropped, and in-flight responses
    /// landing afterwards are discarded. Returns the number of slots hit.
    pub async fn invalidate(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let mut slots = self.inner.slots.lock().await;
        let mut matched = 0;
        for (key, slot) in slots.iter_mut() {
            if !predicate(key) {
                continue;
            }
            matched += 1;
            slot.generation = slot.generation.wrapping_add(1);
            match &mut slot.state {
                SlotState::Ready { stale, .. } => *stale = true,
                SlotState::Failed { .. } => slot.state = SlotState::Vacant,
                SlotState::Pending(_) | SlotState::Vacant => {}
            }
        }
        if matched == 0 {
            debug!("cache: invalidation matched no entries");
        } else {
            debug!("cache: invalidated {matched} entries");
        }
        matched
    }

    /// Namespace-wide invalidation: every cached page of every filter
    /// variant for the given kinds.
    pub async fn invalidate_entities(&self, kinds: &[EntityKind]) -> usize {
        self.invalidate(|key| kinds.contains(&key.entity)).await
    }
}

async fn await_flight(rx: &mut watch::Receiver<Option<Outcome>>) -> Option<Outcome> {
    loop {
        let seen = rx.borrow_and_update().clone();
        if seen.is_some() {
            return seen;
        }
        if rx.changed().await.is_err() {
            // Sender dropped; a final value may still have been written.
            return rx.borrow().clone();
        }
    }
}

fn purge_idle(slots: &mut HashMap<QueryKey, Slot>, now: Instant, purge_after: Duration) {
    slots.retain(|_, slot| {
        matches!(slot.state, SlotState::Pending(_))
            || now.duration_since(slot.touched_at) <= purge_after
    });
}
