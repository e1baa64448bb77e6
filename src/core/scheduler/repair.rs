use crate::core::{
    scheduler::{BatteryLimits, simulation::simulate},
    slot::Slot,
};

/// Add one more charging slot in front of the first safety floor breach and re-simulate.
///
/// The slot is the cheapest one not yet charging, up to and including the breaching slot.
/// A breach in the very first slot is handled as a breach in the second one.
///
/// # Returns
///
/// - [`Some`] repaired slots.
/// - [`None`], if there is no breach or every slot before the breach is already charging.
pub fn repair(slots: Vec<Slot>, battery: &BatteryLimits) -> Option<Vec<Slot>> {
    let breach_index = slots
        .iter()
        .position(|slot| slot.running_capacity < battery.lowest_threshold)?
        .max(1);

    let mut before = slots;
    let after = before.split_off((breach_index + 1).min(before.len()));
    let index = before
        .iter()
        .enumerate()
        .filter(|(_, slot)| !slot.charge)
        .min_by_key(|(_, slot)| (slot.unit_price, slot.index))?
        .0;
    before[index].charge = true;
    before.extend(after);

    Some(simulate(before, battery))
}
