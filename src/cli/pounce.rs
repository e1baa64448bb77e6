use chrono::Utc;
use clap::Parser;

use crate::{
    cli::{
        clocks::ClockArgs,
        device::DeviceArgs,
        givenergy::GivEnergyApiArgs,
        trigger::TriggerArgs,
    },
    core::{
        dispatch::{Device, Dispatcher, LogDevice},
        trigger::Payload,
    },
    prelude::*,
};

#[derive(Parser)]
pub struct PounceArgs {
    /// Replay payload as produced by `hunt`, for example: `{"windows":[{"start":"05:30","end":"06:00"}]}`.
    #[clap(long, env = "PAYLOAD")]
    payload: Payload,

    /// Do not write the inverter settings nor call the scheduler (dry run).
    #[clap(long)]
    scout: bool,

    #[clap(flatten)]
    givenergy: GivEnergyApiArgs,

    #[clap(flatten)]
    clocks: ClockArgs,

    #[clap(flatten)]
    device: DeviceArgs,

    #[clap(flatten)]
    trigger: TriggerArgs,
}

impl PounceArgs {
    #[instrument(skip_all, fields(scout = self.scout, n_windows = self.payload.windows.len()))]
    pub async fn run(self) -> Result {
        let clocks = self.clocks.reconcile(Utc::now());
        let givenergy = self.givenergy.new_client()?;
        let inverter = if self.scout {
            None
        } else {
            let communication_device = givenergy.get_communication_device().await?;
            Some(givenergy.inverter(communication_device.inverter.serial_number))
        };
        let device: &dyn Device = match &inverter {
            Some(inverter) => inverter,
            None => &LogDevice,
        };
        let trigger = self.trigger.new_trigger(self.scout)?;
        Dispatcher::builder()
            .device(device)
            .trigger(trigger.as_ref())
            .clocks(&clocks)
            .retry_policy(self.device.retry_policy())
            .unverified(self.scout)
            .build()
            .dispatch(&self.payload)
            .await?;
        Ok(())
    }
}
