// ABOUTME: Daily ceiling on remote analysis calls with lock-free slot reservation
// ABOUTME: A reservation is returned to the pool unless the caller commits it after success
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{debug, info};

/// Snapshot of quota usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    /// Successful remote calls counted so far
    pub used: u32,
    /// Ceiling
    pub max: u32,
    /// `max - used`
    pub remaining: u32,
}

/// Counter of remote calls that never exceeds its ceiling
///
/// Slots are taken with a compare-and-swap loop, so concurrent callers can
/// observe `used == max` but never `used > max`.
///
/// The high 32 bits of the state hold the reset epoch and the low 32 bits the
/// count, so a reservation taken before [`Self::reset`] never releases a slot
/// of the following period.
#[derive(Debug)]
pub struct QuotaCounter {
    state: AtomicU64,
    max: u32,
}

fn pack(epoch: u32, used: u32) -> u64 {
    (u64::from(epoch) << 32) | u64::from(used)
}

fn unpack(state: u64) -> (u32, u32) {
    ((state >> 32) as u32, state as u32)
}

impl QuotaCounter {
    /// Counter starting at zero
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self {
            state: AtomicU64::new(0),
            max,
        }
    }

    /// Take one slot if any remain
    ///
    /// The slot is given back when the returned guard is dropped without
    /// [`QuotaReservation::commit`].
    #[must_use]
    pub fn try_reserve(&self) -> Option<QuotaReservation<'_>> {
        let max = self.max;
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                let (epoch, used) = unpack(state);
                (used < max).then(|| pack(epoch, used + 1))
            })
            .ok()
            .map(|previous| {
                let (epoch, used) = unpack(previous);
                debug!(used = used + 1, max, "Reserved remote analysis slot");
                QuotaReservation {
                    counter: self,
                    epoch,
                    committed: false,
                }
            })
    }

    /// Calls counted so far
    #[must_use]
    pub fn used(&self) -> u32 {
        unpack(self.state.load(Ordering::Acquire)).1
    }

    /// Ceiling
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Slots still available
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.used())
    }

    /// Usage snapshot
    #[must_use]
    pub fn status(&self) -> QuotaStatus {
        let used = self.used();
        QuotaStatus {
            used,
            max: self.max,
            remaining: self.max.saturating_sub(used),
        }
    }

    /// Start a new period
    pub fn reset(&self) {
        let previous = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                let (epoch, _) = unpack(state);
                Some(pack(epoch.wrapping_add(1), 0))
            })
            .map_or(0, |state| unpack(state).1);
        info!(previous, max = self.max, "Remote analysis quota reset");
    }

    /// Give back a slot taken in `epoch`; slots from an earlier period are dropped
    fn release(&self, epoch: u32) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                let (current, used) = unpack(state);
                (current == epoch).then(|| pack(current, used.saturating_sub(1)))
            })
            .is_ok()
    }
}

/// One reserved slot
#[derive(Debug)]
#[must_use = "dropping a reservation releases the slot immediately"]
pub struct QuotaReservation<'a> {
    counter: &'a QuotaCounter,
    epoch: u32,
    committed: bool,
}

impl QuotaReservation<'_> {
    /// Keep the slot counted
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for QuotaReservation<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if self.counter.release(self.epoch) {
            debug!("Released unused remote analysis slot");
        } else {
            debug!("Quota was reset since reservation, nothing to release");
        }
    }
}
