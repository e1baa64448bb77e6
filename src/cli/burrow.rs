use chrono::Utc;
use clap::{Parser, Subcommand};
use itertools::Itertools;

use crate::{
    cli::{clocks::ClockArgs, givenergy::GivEnergyApiArgs, octopus::OctopusArgs},
    core::{dispatch::Device, slot::SlotTimes},
    prelude::*,
    tables::build_prices_table,
};

#[derive(Parser)]
pub struct BurrowArgs {
    #[command(subcommand)]
    command: BurrowCommand,
}

impl BurrowArgs {
    pub async fn run(self) -> Result {
        match self.command {
            BurrowCommand::Prices(args) => args.run().await,
            BurrowCommand::ReadSetting(args) => args.run().await,
        }
    }
}

#[derive(Subcommand)]
enum BurrowCommand {
    /// Show the upcoming unit rates in the local and device time.
    Prices(BurrowPricesArgs),

    /// Read an inverter setting.
    ReadSetting(BurrowReadSettingArgs),
}

#[derive(Parser)]
struct BurrowPricesArgs {
    #[clap(flatten)]
    octopus: OctopusArgs,

    #[clap(flatten)]
    clocks: ClockArgs,
}

impl BurrowPricesArgs {
    async fn run(self) -> Result {
        let now = Utc::now();
        let clocks = self.clocks.reconcile(now);
        let prices = self
            .octopus
            .new_client()?
            .get_upcoming_rates(now, self.octopus.horizon)
            .await?
            .into_iter()
            .map(|rate| (SlotTimes::new(&clocks, rate.valid_from, rate.valid_to), rate.value))
            .collect_vec();
        println!("{}", build_prices_table(&prices));
        Ok(())
    }
}

#[derive(Parser)]
struct BurrowReadSettingArgs {
    /// Setting ID, for example, 64 for the AC charge 1 start time.
    id: u32,

    #[clap(flatten)]
    givenergy: GivEnergyApiArgs,
}

impl BurrowReadSettingArgs {
    #[instrument(skip_all, fields(id = self.id))]
    async fn run(self) -> Result {
        let givenergy = self.givenergy.new_client()?;
        let communication_device = givenergy.get_communication_device().await?;
        let value = givenergy
            .inverter(communication_device.inverter.serial_number)
            .read_setting(self.id)
            .await?;
        info!(value, "gotcha");
        Ok(())
    }
}
