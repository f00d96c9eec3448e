//! Process-local memo table mapping a compressed board `Key` to its best `Future`.
//!
//! The table is split into a fixed number of buckets, each an append-only list
//! of records. Lookups take a shared lock on one bucket. Claiming a key (the
//! right to compute its future) is serialised per cell count, so at most one
//! claim ever succeeds for a given key.
use crate::engine::{Future, Key, PUZZLE_SIZE};
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock};

/// Default bucket count. Prime, so the keep bits spread evenly.
pub const HASH_SIZE: usize = 700_001;

/// One memoised position. Created pending by the claiming thread and resolved
/// exactly once when its search completes.
#[derive(Debug)]
pub struct Record {
    key: Key,
    future: Mutex<Future>,
    resolved: Condvar,
}

impl Record {
    fn new(key: Key) -> Self {
        Record {
            key,
            future: Mutex::new(Future::PENDING),
            resolved: Condvar::new(),
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Current future without waiting; pending until resolved.
    pub fn future(&self) -> Future {
        *self.future.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores the computed future and wakes every thread waiting on it.
    pub fn resolve(&self, future: Future) {
        let mut slot = self.future.lock().unwrap_or_else(PoisonError::into_inner);
        debug_assert!(slot.is_pending(), "record {} resolved twice", self.key);
        *slot = future;
        self.resolved.notify_all();
    }

    /// Blocks until the record is resolved and returns its future.
    pub fn wait(&self) -> Future {
        let slot = self.future.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = self
            .resolved
            .wait_while(slot, |future| future.is_pending())
            .unwrap_or_else(PoisonError::into_inner);
        *slot
    }
}

/// Outcome of [`MemoStore::claim`].
#[derive(Debug, Clone)]
pub enum Claim {
    /// The caller now owns the record and must resolve it.
    Granted(Arc<Record>),
    /// Another caller claimed the key first.
    Taken(Arc<Record>),
}

impl Claim {
    pub fn is_granted(&self) -> bool {
        matches!(self, Claim::Granted(_))
    }

    pub fn record(&self) -> &Arc<Record> {
        match self {
            Claim::Granted(record) | Claim::Taken(record) => record,
        }
    }
}

type Bucket = Vec<Arc<Record>>;

#[derive(Debug)]
pub struct MemoStore {
    buckets: Box<[RwLock<Bucket>]>,
    claim_locks: Box<[Mutex<()>]>,
}

impl MemoStore {
    /// Creates an empty store with `bucket_count` buckets (at least one).
    pub fn new(bucket_count: usize) -> Self {
        let buckets = (0..bucket_count.max(1))
            .map(|_| RwLock::new(Vec::new()))
            .collect();
        let claim_locks = (0..=PUZZLE_SIZE).map(|_| Mutex::new(())).collect();
        MemoStore {
            buckets,
            claim_locks,
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket(&self, key: Key) -> &RwLock<Bucket> {
        let mixed = key.keep ^ (key.layout as u64).rotate_right(8);
        &self.buckets[(mixed % self.buckets.len() as u64) as usize]
    }

    fn find(bucket: &Bucket, key: Key) -> Option<&Arc<Record>> {
        bucket.iter().rev().find(|record| record.key == key)
    }

    /// True if some thread has already claimed `key`.
    pub fn contains(&self, key: Key) -> bool {
        self.lookup(key).is_some()
    }

    /// Returns the record for `key`, if one has been claimed.
    pub fn lookup(&self, key: Key) -> Option<Arc<Record>> {
        let bucket = self.bucket(key).read().unwrap_or_else(PoisonError::into_inner);
        Self::find(&bucket, key).cloned()
    }

    /// Atomically claims `key` for computation.
    ///
    /// Exactly one caller per key, across all threads and the whole life of the
    /// store, receives `Claim::Granted`; everyone else gets the same record as
    /// `Claim::Taken`.
    pub fn claim(&self, key: Key) -> Claim {
        let _guard = self.claim_locks[key.cell_count()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut bucket = self.bucket(key).write().unwrap_or_else(PoisonError::into_inner);
        if let Some(record) = Self::find(&bucket, key) {
            return Claim::Taken(Arc::clone(record));
        }
        let record = Arc::new(Record::new(key));
        bucket.push(Arc::clone(&record));
        Claim::Granted(record)
    }

    /// Boolean form of [`claim`](Self::claim): true when the caller now owns `key`.
    pub fn require_manage(&self, key: Key) -> bool {
        self.claim(key).is_granted()
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.bucket_sizes().into_iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records in each bucket, in bucket order.
    pub fn bucket_sizes(&self) -> Vec<usize> {
        self.buckets
            .iter()
            .map(|bucket| bucket.read().unwrap_or_else(PoisonError::into_inner).len())
            .collect()
    }
}

impl Default for MemoStore {
    fn default() -> Self {
        MemoStore::new(HASH_SIZE)
    }
}
