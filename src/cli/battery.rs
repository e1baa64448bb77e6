//! Battery-related CLI arguments.

use chrono::TimeDelta;
use clap::Parser;

use crate::{
    api::givenergy::CommunicationDevice,
    core::scheduler::MAX_CORRECTIONS,
    prelude::*,
    quantity::{energy::KilowattHours, power::Watts},
};

#[must_use]
#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Safety floor for the projected residual energy.
    #[clap(long = "lowest-charge-threshold-kwh", env = "LOWEST_CHARGE_THRESHOLD_KWH", default_value = "3.0")]
    pub lowest_threshold: KilowattHours,

    /// Grid charging power override in watts, by default the inverter maximum minus the base load.
    #[clap(long = "charging-power-watts", env = "CHARGING_POWER_WATTS")]
    pub charging_power: Option<Watts>,

    /// Average household base load which competes with the charging.
    #[clap(long = "house-base-load-watts", env = "HOUSE_BASE_LOAD_WATTS", default_value = "300")]
    pub house_base_load: Watts,

    /// Maximum number of slots added to keep the battery above the safety floor.
    #[clap(long = "max-corrections", env = "MAX_CORRECTIONS", default_value_t = MAX_CORRECTIONS)]
    pub max_corrections: usize,
}

impl BatteryArgs {
    /// Energy delivered to the battery during a half-hour slot.
    pub fn charge_per_slot(&self, device: &CommunicationDevice) -> Result<KilowattHours> {
        let power = self
            .charging_power
            .unwrap_or_else(|| device.inverter.info.max_charge_power - self.house_base_load);
        ensure!(power > Watts::ZERO, "the charging power must be positive, got {power}");
        Ok(power * TimeDelta::minutes(30))
    }
}
