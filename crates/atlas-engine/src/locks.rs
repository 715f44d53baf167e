//! # Per-Car Lock Registry
//!
//! Serializes booking creation per car.
//!
//! ## Why This Exists
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A plain "check availability, then insert" is unsound:                 │
//! │                                                                        │
//! │   request A: check Jun 1-5 → free                                      │
//! │   request B: check Jun 3-7 → free      (A hasn't inserted yet)        │
//! │   request A: insert  ✓                                                 │
//! │   request B: insert  ✓  ← double booking                              │
//! │                                                                        │
//! │  Holding the car's lock across check-and-insert makes the second      │
//! │  request observe the first's insert and fail with a conflict.         │
//! │  Creates on different cars never contend.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The registry grows one entry per car ever booked through this process,
//! which is bounded by fleet size.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-car async locks.
#[derive(Debug, Default)]
pub struct CarLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl CarLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        CarLocks::default()
    }

    /// Acquires the lock for a car, creating it on first use.
    ///
    /// The returned guard is held across the whole check-and-insert; the
    /// registry's own mutex is only held long enough to look up the entry,
    /// never across an await.
    pub async fn lock(&self, car_id: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().expect("car lock registry poisoned");
            map.entry(car_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        entry.lock_owned().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
