use chrono::{DateTime, Utc};

use crate::{
    core::clock::{Clocks, Stamp},
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// Half-hour slot boundaries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SlotTimes {
    /// Inclusive.
    pub start: Stamp,

    /// Exclusive.
    pub end: Stamp,
}

impl SlotTimes {
    pub fn new(clocks: &Clocks, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start: clocks.stamp(start), end: clocks.stamp(end) }
    }

    /// Build `n` consecutive half-hour slots starting at `since`.
    #[cfg(test)]
    pub fn half_hours(
        clocks: &Clocks,
        since: DateTime<Utc>,
        n: usize,
    ) -> impl Iterator<Item = Self> + '_ {
        (0..n).scan(since, move |start, _| {
            let end = *start + chrono::TimeDelta::minutes(30);
            let slot_times = Self::new(clocks, *start, end);
            *start = end;
            Some(slot_times)
        })
    }
}

/// Single planning slot.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub index: usize,
    pub times: SlotTimes,

    /// Projected household energy deficit, negative is a solar surplus.
    pub net_energy: KilowattHours,

    pub unit_price: KilowattHourRate,

    /// Whether the battery is charged from the grid during this slot.
    pub charge: bool,

    /// Net energy as experienced by the battery once the charging is applied.
    pub charged_energy: KilowattHours,

    /// Simulated residual energy at the end of the slot.
    pub running_capacity: KilowattHours,
}
