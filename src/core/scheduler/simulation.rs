use crate::{core::scheduler::BatteryLimits, core::slot::Slot, quantity::energy::KilowattHours};

/// Apply the charging decisions and simulate the residual energy slot by slot.
///
/// The battery cannot store more than its capacity: energy beyond the headroom is added back
/// to the slot's charged energy, so it only exists in the forecast.
pub fn simulate(slots: Vec<Slot>, battery: &BatteryLimits) -> Vec<Slot> {
    let mut previous = battery.remaining;
    slots
        .into_iter()
        .map(|mut slot| {
            slot.charged_energy = if slot.charge {
                slot.net_energy - battery.charge_per_slot
            } else {
                slot.net_energy
            };
            let overflow = previous - slot.charged_energy - battery.capacity;
            if overflow > KilowattHours::ZERO {
                slot.charged_energy += overflow;
            }
            slot.running_capacity = (previous - slot.charged_energy).max(KilowattHours::ZERO);
            previous = slot.running_capacity;
            slot
        })
        .collect()
}
