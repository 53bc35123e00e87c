//! Bounded in-memory registry of past simulation and optimization results.
//!
//! Results are keyed by minted identifiers (`VAR-000001`, `QOPT-000001`)
//! from per-prefix atomic counters, so concurrent writers never observe a
//! duplicate identifier. Capacity is a hard bound: the least recently used
//! entry is evicted once the registry is full. Both reads and writes count
//! as use. The clock is injectable so tests can pin stored timestamps.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::optimizer::OptimizationResult;
use crate::risk::SimulationResult;

/// Default registry capacity.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Clock used to timestamp stored records.
pub type Clock = fn() -> DateTime<Utc>;

/// Either result payload kind the registry accepts.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredResult {
    Simulation(SimulationResult),
    Optimization(OptimizationResult),
}

/// A registry entry: the payload plus its storage timestamp.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoredRecord {
    pub result: StoredResult,
    pub stored_at: DateTime<Utc>,
}

struct StoreInner {
    entries: HashMap<String, StoredRecord>,
    order: VecDeque<String>,
}

/// Process-local, thread-safe result registry with LRU eviction.
pub struct ResultStore {
    inner: Mutex<StoreInner>,
    capacity: usize,
    clock: Clock,
    var_counter: AtomicU64,
    opt_counter: AtomicU64,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_clock(capacity, Utc::now)
    }

    pub fn with_clock(capacity: usize, clock: Clock) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
            clock,
            var_counter: AtomicU64::new(0),
            opt_counter: AtomicU64::new(0),
        }
    }

    /// Mints the next simulation identifier, e.g. `VAR-000001`.
    pub fn next_simulation_id(&self) -> String {
        let n = self.var_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("VAR-{n:06}")
    }

    /// Mints the next optimization identifier, e.g. `QOPT-000001`.
    pub fn next_optimization_id(&self) -> String {
        let n = self.opt_counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("QOPT-{n:06}")
    }

    /// Registers a fully computed result under its identifier.
    pub fn insert(&self, id: String, result: StoredResult) {
        let record = StoredRecord {
            result,
            stored_at: (self.clock)(),
        };
        let mut inner = self.inner.lock().expect("result store poisoned");
        if inner.entries.insert(id.clone(), record).is_some() {
            inner.order.retain(|k| k != &id);
        }
        inner.order.push_back(id);
        while inner.order.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.entries.remove(&evicted);
            }
        }
    }

    /// Retrieves a record by identifier, refreshing its recency.
    pub fn get(&self, id: &str) -> Option<StoredRecord> {
        let mut inner = self.inner.lock().expect("result store poisoned");
        let record = inner.entries.get(id).cloned()?;
        inner.order.retain(|k| k != id);
        inner.order.push_back(id.to_string());
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("result store poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::math::SummaryStatistics;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn simulation_payload(id: &str) -> StoredResult {
        StoredResult::Simulation(SimulationResult {
            result_id: id.to_string(),
            var_value: -1.0,
            confidence_level: 0.95,
            time_horizon: 1.0,
            num_simulations: 1000,
            risk_breakdown: Vec::new(),
            simulation_summary: SummaryStatistics::from_sample(&[-1.0, 0.0, 1.0]),
            independent_fallback: false,
        })
    }

    #[test]
    fn identifiers_are_monotonic_and_zero_padded() {
        let store = ResultStore::new();
        assert_eq!(store.next_simulation_id(), "VAR-000001");
        assert_eq!(store.next_simulation_id(), "VAR-000002");
        assert_eq!(store.next_optimization_id(), "QOPT-000001");
    }

    #[test]
    fn concurrent_minting_never_duplicates() {
        let store = Arc::new(ResultStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..100).map(|_| store.next_simulation_id()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn capacity_bound_evicts_least_recently_used() {
        let store = ResultStore::with_clock(2, fixed_clock);
        store.insert("VAR-000001".to_string(), simulation_payload("VAR-000001"));
        store.insert("VAR-000002".to_string(), simulation_payload("VAR-000002"));

        // Touch the older entry so the newer one becomes the LRU victim.
        assert!(store.get("VAR-000001").is_some());
        store.insert("VAR-000003".to_string(), simulation_payload("VAR-000003"));

        assert!(store.get("VAR-000002").is_none());
        assert!(store.get("VAR-000001").is_some());
        assert!(store.get("VAR-000003").is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn stored_records_carry_the_injected_clock_time() {
        let store = ResultStore::with_clock(4, fixed_clock);
        store.insert("VAR-000001".to_string(), simulation_payload("VAR-000001"));
        let record = store.get("VAR-000001").unwrap();
        assert_eq!(record.stored_at, fixed_clock());
    }
}
