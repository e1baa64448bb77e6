mod repair;
mod schedule;
mod simulation;

use bon::Builder;
use itertools::Itertools;

pub use self::schedule::Schedule;
use self::{repair::repair, simulation::simulate};
use crate::{
    core::slot::{Slot, SlotTimes},
    prelude::*,
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// Maximum number of corrections before giving up on the safety floor.
pub const MAX_CORRECTIONS: usize = 30;

/// The leading slots are already committed, so they never trigger a correction.
const N_COMMITTED_SLOTS: usize = 2;

#[must_use]
#[derive(Copy, Clone, Debug, Builder)]
pub struct BatteryLimits {
    /// Current residual energy.
    pub remaining: KilowattHours,

    /// Maximum residual energy.
    pub capacity: KilowattHours,

    /// Safety floor for the projected residual energy.
    pub lowest_threshold: KilowattHours,

    /// Energy the grid delivers to the battery during a single half-hour slot.
    pub charge_per_slot: KilowattHours,
}

/// Least-cost charging slot selection.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Scheduler<'a> {
    /// Per-slot unit prices, which also define the horizon.
    prices: &'a [(SlotTimes, KilowattHourRate)],

    /// Net energy deficit per slot, aligned with the prices.
    net_energy: &'a [KilowattHours],

    battery: BatteryLimits,

    #[builder(default = MAX_CORRECTIONS)]
    max_corrections: usize,
}

impl<S: scheduler_builder::IsComplete> SchedulerBuilder<'_, S> {
    pub fn schedule(self) -> Schedule {
        self.build().schedule()
    }
}

impl Scheduler<'_> {
    #[instrument(
        skip_all,
        fields(remaining = %self.battery.remaining, capacity = %self.battery.capacity),
    )]
    fn schedule(self) -> Schedule {
        let slots = self.initial_slots();
        let overall_energy_requirement = (slots
            .iter()
            .map(|slot| slot.net_energy)
            .sum::<KilowattHours>()
            + (self.battery.capacity - self.battery.remaining))
            .round_to(2);
        let slots_to_charge =
            count_slots_to_charge(overall_energy_requirement, self.battery.charge_per_slot);
        info!(
            n_slots = slots.len(),
            %overall_energy_requirement,
            slots_to_charge,
            "selecting the cheapest slots…",
        );

        let mut slots = simulate(select_cheapest(slots, slots_to_charge), &self.battery);
        let mut n_corrections = 0;
        while n_corrections < self.max_corrections {
            if self.lowest_capacity(&slots).is_none_or(|lowest| lowest >= self.battery.lowest_threshold)
            {
                break;
            }
            match repair(slots.clone(), &self.battery) {
                Some(repaired) => {
                    slots = repaired;
                    n_corrections += 1;
                }
                None => {
                    debug!(n_corrections, "no slot left to add before the breach");
                    break;
                }
            }
        }

        let lowest_capacity = self.lowest_capacity(&slots);
        let is_feasible =
            lowest_capacity.is_none_or(|lowest| lowest >= self.battery.lowest_threshold);
        if is_feasible {
            info!(n_corrections, "scheduled");
        } else {
            warn!(
                n_corrections,
                lowest_capacity = ?lowest_capacity,
                lowest_threshold = %self.battery.lowest_threshold,
                "the battery is still projected to breach the safety floor, continuing with the best effort",
            );
        }

        Schedule {
            slots,
            overall_energy_requirement,
            slots_to_charge,
            charge_per_slot: self.battery.charge_per_slot,
            n_corrections,
            lowest_capacity,
            is_feasible,
        }
    }

    /// Join the prices and net energy, truncating to the shortest series.
    fn initial_slots(&self) -> Vec<Slot> {
        if self.prices.len() != self.net_energy.len() {
            debug!(
                n_prices = self.prices.len(),
                n_net_energy = self.net_energy.len(),
                "series lengths differ, truncating",
            );
        }
        self.prices
            .iter()
            .zip(self.net_energy)
            .enumerate()
            .map(|(index, ((times, unit_price), net_energy))| Slot {
                index,
                times: *times,
                net_energy: *net_energy,
                unit_price: *unit_price,
                charge: false,
                charged_energy: *net_energy,
                running_capacity: KilowattHours::ZERO,
            })
            .collect()
    }

    /// Lowest running capacity past the committed slots.
    fn lowest_capacity(&self, slots: &[Slot]) -> Option<KilowattHours> {
        slots.iter().skip(N_COMMITTED_SLOTS).map(|slot| slot.running_capacity).min()
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count_slots_to_charge(
    overall_energy_requirement: KilowattHours,
    charge_per_slot: KilowattHours,
) -> usize {
    let n_slots = (overall_energy_requirement / charge_per_slot).ceil();
    if n_slots.is_finite() && n_slots > 0.0 { n_slots as usize } else { 0 }
}

/// Mark the `n` cheapest slots and every negative-price slot for charging.
///
/// Equal prices are resolved by the slot index, earlier first.
fn select_cheapest(mut slots: Vec<Slot>, n: usize) -> Vec<Slot> {
    let cheapest = slots
        .iter()
        .sorted_by_key(|slot| (slot.unit_price, slot.index))
        .take(n)
        .map(|slot| slot.index)
        .collect_vec();
    for index in cheapest {
        slots[index].charge = true;
    }
    for slot in &mut slots {
        if slot.unit_price.is_negative() {
            // Getting paid to consume:
            slot.charge = true;
        }
    }
    slots
}
