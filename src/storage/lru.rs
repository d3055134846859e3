//! Approximate-LRU slot table: a fixed-size array of `{pageId, accessCounter}`
//! entries. Counters are frequency-decayed priorities, not timestamps.

use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};

const EMPTY: i64 = -1;

struct Slot {
    page_id: AtomicI64,
    counter: AtomicI32,
}

pub struct Lru {
    slots: Vec<Slot>,
}

impl Lru {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot { page_id: AtomicI64::new(EMPTY), counter: AtomicI32::new(0) })
            .collect();
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Linear scan for `page_id`; on hit, bumps the access counter.
    pub fn find(&self, page_id: u64) -> Option<usize> {
        let target = page_id as i64;
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.page_id.load(Ordering::SeqCst) == target {
                slot.counter.fetch_add(1, Ordering::SeqCst);
                return Some(i);
            }
        }
        None
    }

    /// Claims the first empty entry for `page_id`, decrementing every other
    /// counter by one. Returns `None` if every slot is occupied.
    pub fn add(&self, page_id: u64) -> Option<usize> {
        let slot_index = self.slots.iter().position(|s| s.page_id.load(Ordering::SeqCst) == EMPTY)?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i == slot_index {
                slot.page_id.store(page_id as i64, Ordering::SeqCst);
                slot.counter.store(1, Ordering::SeqCst);
            } else {
                slot.counter.fetch_sub(1, Ordering::SeqCst);
            }
        }
        Some(slot_index)
    }

    /// No free slot: repeatedly decrements every counter until one reaches
    /// `<= 0`, then reclaims that entry for `page_id`.
    pub fn free(&self, page_id: u64) -> usize {
        loop {
            for (i, slot) in self.slots.iter().enumerate() {
                let after = slot.counter.fetch_sub(1, Ordering::SeqCst) - 1;
                if after <= 0 {
                    slot.page_id.store(page_id as i64, Ordering::SeqCst);
                    slot.counter.store(1, Ordering::SeqCst);
                    return i;
                }
            }
        }
    }

    pub fn delete(&self, page_id: u64) {
        let target = page_id as i64;
        for slot in &self.slots {
            if slot.page_id.load(Ordering::SeqCst) == target {
                slot.page_id.store(EMPTY, Ordering::SeqCst);
                slot.counter.store(0, Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_find_hits_same_slot() {
        let lru = Lru::new(4);
        let slot = lru.add(10).unwrap();
        assert_eq!(lru.find(10), Some(slot));
    }

    #[test]
    fn working_set_smaller_than_capacity_never_evicts() {
        let lru = Lru::new(4);
        for page in 0..4 {
            lru.add(page).unwrap();
        }
        // Repeated access to the whole working set should not require free().
        for _ in 0..20 {
            for page in 0..4 {
                assert!(lru.find(page).is_some(), "page {page} was evicted from an undersized working set");
            }
        }
    }

    #[test]
    fn free_reclaims_the_least_recently_used_slot() {
        let lru = Lru::new(2);
        lru.add(1).unwrap();
        lru.add(2).unwrap();
        // Keep touching page 2 so page 1 becomes the eviction candidate.
        for _ in 0..5 {
            lru.find(2);
        }
        let reclaimed = lru.free(3);
        assert_eq!(lru.find(1), None);
        assert_eq!(lru.find(3), Some(reclaimed));
    }

    #[test]
    fn delete_clears_the_entry() {
        let lru = Lru::new(2);
        lru.add(5).unwrap();
        lru.delete(5);
        assert_eq!(lru.find(5), None);
    }
}
