use chrono::{DateTime, Local, Offset, Utc};
use chrono_tz::Tz;
use clap::Parser;

use crate::core::clock::Clocks;

#[derive(Parser)]
pub struct ClockArgs {
    /// Time zone of the inverter clock.
    #[clap(long = "device-time-zone", env = "DEVICE_TIME_ZONE", default_value = "Europe/London")]
    pub device: Tz,

    /// Time zone of the external scheduler.
    #[clap(long = "scheduler-time-zone", env = "SCHEDULER_TIME_ZONE", default_value = "UTC")]
    pub scheduler: Tz,
}

impl ClockArgs {
    /// Reconcile the clocks as of `now`, the tariff API speaks UTC.
    pub fn reconcile(&self, now: DateTime<Utc>) -> Clocks {
        let local = now.with_timezone(&Local).offset().fix();
        Clocks::reconcile(now, local, &Utc, &self.device, &self.scheduler)
    }
}
