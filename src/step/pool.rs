//! Arena-backed pool for step records.
//!
//! Records live in a growable arena and are addressed by slot index.
//! `acquire` pops a free slot (or grows the arena), `release` pushes
//! the slot back. Pooling is a footprint optimization only and is not
//! observable in sequencer behavior.

use super::{StepConfig, StepRecord};

#[derive(Debug, Default)]
pub struct StepPool {
    slots: Vec<StepRecord>,
    free: Vec<usize>,
}

impl StepPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconfigure a previously released record, or allocate a new one
    /// if none are free. Returns the record's slot index.
    pub fn acquire(&mut self, config: StepConfig) -> usize {
        if let Some(slot) = self.free.pop() {
            self.slots[slot].reconfigure(config);
            slot
        } else {
            self.slots.push(StepRecord::new(config));
            self.slots.len() - 1
        }
    }

    /// Mark the record unusable and make its slot available for reuse.
    /// Releasing an already-free slot is a no-op.
    pub fn release(&mut self, slot: usize) {
        if slot >= self.slots.len() || self.free.contains(&slot) {
            return;
        }
        self.slots[slot].invalidate();
        self.free.push(slot);
    }

    pub fn get(&self, slot: usize) -> Option<&StepRecord> {
        self.slots.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut StepRecord> {
        self.slots.get_mut(slot)
    }

    /// Total slots ever allocated (live + free).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}
