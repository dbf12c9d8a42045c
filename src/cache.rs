// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Memoized settlements.
//!
//! Hosts that recompute on every input change (a UI redrawing, a service
//! answering the same trip repeatedly) can keep a [`SettlementCache`] and
//! skip the work when participants and expenses have not changed.
//!
//! # Thread Safety
//!
//! Entries live in a [`DashMap`], so the cache can be shared between threads
//! behind an `Arc`. Two threads missing on the same inputs at once compute the
//! same result; only the first insert is kept.

use crate::base::{ExpenseId, ParticipantId};
use crate::expense::Expense;
use crate::participant::Participant;
use crate::settlement::Settlement;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::trace;

/// The parts of a trip that settlement reads. Names, descriptions, categories
/// and dates are left out, so editing them keeps the cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SettlementInputs {
    participants: Vec<ParticipantId>,
    expenses: Vec<ExpenseInputs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExpenseInputs {
    id: ExpenseId,
    // Bit pattern, so equal amounts compare and hash alike.
    amount: u64,
    payer_id: Option<ParticipantId>,
    participant_ids: BTreeSet<ParticipantId>,
}

impl SettlementInputs {
    fn new(participants: &[Participant], expenses: &[Expense]) -> Self {
        Self {
            participants: participants.iter().map(|p| p.id.clone()).collect(),
            expenses: expenses
                .iter()
                .map(|e| ExpenseInputs {
                    id: e.id().clone(),
                    amount: e.amount().to_bits(),
                    payer_id: e.payer_id().cloned(),
                    participant_ids: e.participant_ids().clone(),
                })
                .collect(),
        }
    }

    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug)]
struct CacheEntry {
    inputs: SettlementInputs,
    settlement: Arc<Settlement>,
}

/// Thread-safe memo of [`Settlement::compute`] keyed by its inputs.
#[derive(Debug)]
pub struct SettlementCache {
    entries: DashMap<u64, CacheEntry>,
    capacity: usize,
}

impl SettlementCache {
    const DEFAULT_CAPACITY: usize = 64;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// A cache holding at most `capacity` distinct inputs. Once full, it is
    /// emptied before the next insert.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Returns the settlement for these inputs, computing it on a miss.
    ///
    /// A fingerprint collision replaces the older entry.
    pub fn get_or_compute(&self, participants: &[Participant], expenses: &[Expense]) -> Arc<Settlement> {
        let inputs = SettlementInputs::new(participants, expenses);
        let key = inputs.fingerprint();

        if let Some(entry) = self.entries.get(&key) {
            if entry.inputs == inputs {
                trace!(key, "settlement cache hit");
                return Arc::clone(&entry.settlement);
            }
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.entries.clear();
        }

        match self.entries.entry(key) {
            Entry::Occupied(entry) if entry.get().inputs == inputs => Arc::clone(&entry.get().settlement),
            Entry::Occupied(mut entry) => {
                trace!(key, "settlement cache collision, replacing entry");
                let settlement = Arc::new(Settlement::compute(participants, expenses));
                entry.insert(CacheEntry {
                    inputs,
                    settlement: Arc::clone(&settlement),
                });
                settlement
            }
            Entry::Vacant(entry) => {
                trace!(key, "settlement cache miss");
                let settlement = Arc::new(Settlement::compute(participants, expenses));
                entry.insert(CacheEntry {
                    inputs,
                    settlement: Arc::clone(&settlement),
                });
                settlement
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for SettlementCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> (Vec<Participant>, Vec<Expense>) {
        let participants = vec![Participant::new("a", "Ana"), Participant::new("b", "Ben")];
        let expenses = vec![Expense::new("e1", 100.0, "a", ["a", "b"]).unwrap()];
        (participants, expenses)
    }

    #[test]
    fn identical_inputs_share_a_result() {
        let cache = SettlementCache::new();
        let (participants, expenses) = inputs();

        let first = cache.get_or_compute(&participants, &expenses);
        let second = cache.get_or_compute(&participants, &expenses);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.transactions.len(), 1);
    }

    #[test]
    fn changed_amount_misses() {
        let cache = SettlementCache::new();
        let (participants, mut expenses) = inputs();
        let first = cache.get_or_compute(&participants, &expenses);

        expenses[0] = Expense::new("e1", 80.0, "a", ["a", "b"]).unwrap();
        let second = cache.get_or_compute(&participants, &expenses);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.transactions[0].amount, 40.0);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cached_result_equals_direct_computation() {
        let cache = SettlementCache::new();
        let (participants, expenses) = inputs();
        let cached = cache.get_or_compute(&participants, &expenses);
        assert_eq!(*cached, Settlement::compute(&participants, &expenses));
    }

    #[test]
    fn full_cache_is_emptied_before_insert() {
        let cache = SettlementCache::with_capacity(2);
        let participants = vec![Participant::new("a", "Ana")];
        for amount in [10.0, 20.0, 30.0] {
            let expenses = vec![Expense::new("e", amount, "a", ["a"]).unwrap()];
            cache.get_or_compute(&participants, &expenses);
        }
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn fingerprint_depends_on_participant_order_and_ids() {
        let (participants, expenses) = inputs();
        let mut reversed = participants.clone();
        reversed.reverse();
        let original = SettlementInputs::new(&participants, &expenses);
        assert_ne!(
            original.fingerprint(),
            SettlementInputs::new(&reversed, &expenses).fingerprint()
        );
        assert_eq!(
            original.fingerprint(),
            SettlementInputs::new(&participants.clone(), &expenses.clone()).fingerprint()
        );
    }

    #[test]
    fn inputs_ignore_names_and_descriptions() {
        let (participants, expenses) = inputs();
        let renamed = vec![Participant::new("a", "Anabel"), Participant::new("b", "Benjamin")];
        let described: Vec<Expense> = expenses
            .iter()
            .cloned()
            .map(|e| e.with_description("Hotel"))
            .collect();

        let original = SettlementInputs::new(&participants, &expenses);
        let edited = SettlementInputs::new(&renamed, &described);
        assert_eq!(original, edited);
        assert_eq!(original.fingerprint(), edited.fingerprint());
    }

    #[test]
    fn edited_description_keeps_caching() {
        let cache = SettlementCache::new();
        let (participants, expenses) = inputs();
        cache.get_or_compute(&participants, &expenses);

        let described: Vec<Expense> = expenses
            .into_iter()
            .map(|e| e.with_description("Hotel"))
            .collect();
        let first = cache.get_or_compute(&participants, &described);
        let second = cache.get_or_compute(&participants, &described);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn renamed_participant_keeps_caching() {
        let cache = SettlementCache::new();
        let (participants, expenses) = inputs();
        let before = cache.get_or_compute(&participants, &expenses);

        let renamed = vec![Participant::new("a", "Anabel"), Participant::new("b", "Ben")];
        let after = cache.get_or_compute(&renamed, &expenses);

        assert!(Arc::ptr_eq(&before, &after));
    }
}
