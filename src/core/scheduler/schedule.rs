use crate::{
    core::slot::Slot,
    quantity::{cost::Cost, energy::KilowattHours},
};

/// Outcome of a single planning pass.
#[must_use]
#[derive(Clone, Debug)]
pub struct Schedule {
    pub slots: Vec<Slot>,

    /// Net energy over the horizon plus the energy needed to top up the battery.
    pub overall_energy_requirement: KilowattHours,

    /// Number of the cheapest slots selected before any correction.
    pub slots_to_charge: usize,

    pub charge_per_slot: KilowattHours,

    /// Number of slots added to keep the battery above the safety floor.
    pub n_corrections: usize,

    /// Lowest projected residual energy past the committed slots.
    pub lowest_capacity: Option<KilowattHours>,

    /// Whether the projected residual energy stays above the safety floor.
    ///
    /// An infeasible schedule is still the best effort within the correction budget.
    pub is_feasible: bool,
}

impl Schedule {
    pub fn charging_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|slot| slot.charge)
    }

    /// Grid cost of the charging energy.
    pub fn charging_cost(&self) -> Cost {
        self.charging_slots().map(|slot| self.charge_per_slot * slot.unit_price).sum()
    }
}
