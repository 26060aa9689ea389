// =============================================================================
// Subscription Registry - pairs this collector is expected to track
// =============================================================================
//
// Life-cycle per pair:
//   Unsubscribed  ->  Subscribed   (one-way; re-adding is a no-op)
// =============================================================================

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::info;

use crate::types::CurrencyPair;

/// Set of subscribed pairs keyed by canonical pair key.
pub struct SubscriptionRegistry {
    pairs: RwLock<HashMap<String, CurrencyPair>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            pairs: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_subscribed(&self, key: &str) -> bool {
        self.pairs.read().contains_key(key)
    }

    /// Insert every pair and return those that were not tracked before, in
    /// input order. A pair repeated within `pairs` is reported once.
    ///
    /// The membership check and the insert share one write lock, so two
    /// concurrent callers can never both report the same pair as new.
    pub fn add(&self, pairs: &[CurrencyPair]) -> Vec<CurrencyPair> {
        let mut added = Vec::new();
        {
            let mut map = self.pairs.write();
            for pair in pairs {
                let key = pair.key();
                if !map.contains_key(&key) {
                    map.insert(key, pair.clone());
                    added.push(pair.clone());
                }
            }
        }

        if !added.is_empty() {
            let keys: Vec<String> = added.iter().map(CurrencyPair::key).collect();
            info!(pairs = ?keys, "subscribed new pairs");
        }
        added
    }

    /// Unconditionally insert every pair.
    pub fn set(&self, pairs: &[CurrencyPair]) {
        let mut map = self.pairs.write();
        for pair in pairs {
            map.insert(pair.key(), pair.clone());
        }
    }

    /// Snapshot of all subscribed pairs, sorted by canonical key.
    pub fn pairs(&self) -> Vec<CurrencyPair> {
        let mut out: Vec<CurrencyPair> = self.pairs.read().values().cloned().collect();
        out.sort_by_key(CurrencyPair::key);
        out
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.pairs.read().len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.pairs.read().is_empty()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
