//! Per-user cooldown gate.
//!
//! One lookup per user per cooldown window. The gate is an owned value
//! constructed in `main` and injected through `AppState`; there is no
//! process-global instance.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tracks the last admitted request per requester identity.
///
/// Check-then-update happens under a single lock acquisition; two
/// simultaneous requests from the same identity can never both be admitted
/// within one window. The lock is only ever held for the map operation.
/// Callers complete the admission decision before any lookup I/O starts.
pub struct CooldownGate {
    cooldown: Duration,
    last_admitted: Mutex<HashMap<i64, Instant>>,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_admitted: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject a request arriving now.
    ///
    /// Returns `true` and records the timestamp if the identity has no prior
    /// admitted request or its cooldown has elapsed. Returns `false` without
    /// touching state otherwise.
    pub fn admit(&self, identity: i64) -> bool {
        self.admit_at(identity, Instant::now())
    }

    /// Admission decision at an explicit monotonic time. Test seam for
    /// deterministic cooldown scenarios; `admit` delegates here.
    pub fn admit_at(&self, identity: i64, now: Instant) -> bool {
        let mut map = self.last_admitted.lock().expect("cooldown map lock poisoned");
        if let Some(&last) = map.get(&identity) {
            if now.duration_since(last) < self.cooldown {
                return false;
            }
        }
        map.insert(identity, now);
        true
    }

    /// Number of identities with a recorded admission. Entries are never
    /// evicted; the map is process-lifetime by contract.
    pub fn tracked_identities(&self) -> usize {
        self.last_admitted.lock().expect("cooldown map lock poisoned").len()
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}
