use chrono::{Days, NaiveTime, Timelike, Utc};
use clap::Parser;
use itertools::Itertools;

use crate::{
    cli::{
        battery::BatteryArgs,
        clocks::ClockArgs,
        device::DeviceArgs,
        forecast::ForecastArgs,
        givenergy::GivEnergyApiArgs,
        octopus::OctopusArgs,
        trigger::TriggerArgs,
    },
    core::{
        clock::Frame,
        dispatch::{Device, Dispatcher, LogDevice},
        scheduler::{BatteryLimits, Scheduler},
        series::{DailyProfile, Projection},
        slot::SlotTimes,
        trigger::Payload,
        window::ChargeWindow,
    },
    prelude::*,
    tables::{build_schedule_table, build_windows_table},
};

#[derive(Parser)]
pub struct HuntArgs {
    /// Do not write the inverter settings nor call the scheduler (dry run).
    #[clap(long)]
    scout: bool,

    #[clap(flatten)]
    battery: BatteryArgs,

    #[clap(flatten)]
    givenergy: GivEnergyApiArgs,

    #[clap(flatten)]
    octopus: OctopusArgs,

    #[clap(flatten)]
    forecast: ForecastArgs,

    #[clap(flatten)]
    clocks: ClockArgs,

    #[clap(flatten)]
    device: DeviceArgs,

    #[clap(flatten)]
    trigger: TriggerArgs,
}

impl HuntArgs {
    #[instrument(skip_all, fields(scout = self.scout))]
    pub async fn run(self) -> Result {
        let now = Utc::now().with_nanosecond(0).unwrap_or_else(Utc::now);
        let clocks = self.clocks.reconcile(now);
        info!(
            device_offset_hours = clocks.offset_hours(Frame::Device),
            scheduler_offset_hours = clocks.offset_hours(Frame::Scheduler),
            "reconciled the clocks",
        );

        let givenergy = self.givenergy.new_client()?;
        let communication_device = givenergy.get_communication_device().await?;
        let inverter = givenergy.inverter(communication_device.inverter.serial_number.clone());

        let (system_data, rates, solar_forecast) = tokio::try_join!(
            inverter.get_latest_system_data(),
            async { self.octopus.new_client()?.get_upcoming_rates(now, self.octopus.horizon).await },
            async { Ok::<_, Error>(self.forecast.get_solar_forecast().await) },
        )?;

        let capacity = communication_device.inverter.info.battery.capacity();
        let remaining = capacity * (system_data.battery.percent / 100.0);
        let battery = BatteryLimits::builder()
            .remaining(remaining)
            .capacity(capacity)
            .lowest_threshold(self.battery.lowest_threshold)
            .charge_per_slot(self.battery.charge_per_slot(&communication_device)?)
            .build();
        info!(%remaining, %capacity, charge_per_slot = %battery.charge_per_slot, "battery");

        let prices = rates
            .iter()
            .map(|rate| (SlotTimes::new(&clocks, rate.valid_from, rate.valid_to), rate.value))
            .collect_vec();

        let history = {
            let today = clocks.wall_clock(now, Frame::Device).date().and_time(NaiveTime::MIN);
            let since = today
                .checked_sub_days(Days::new(self.forecast.history_days))
                .context("the history period is out of range")?;
            inverter.get_energy_flows(since, today).await?
        };
        let profile = DailyProfile::from_samples(&history);
        let slot_times = prices.iter().map(|(times, _)| *times).collect_vec();
        let series = Projection::builder()
            .slots(&slot_times)
            .profile(&profile)
            .solar_forecast(&solar_forecast)
            .reference_uv_index(self.forecast.reference_uv_index)
            .fallback_bias(self.forecast.fallback_bias)
            .project();
        let net_energy = series.net_energy();

        let schedule = Scheduler::builder()
            .prices(&prices)
            .net_energy(&net_energy)
            .battery(battery)
            .max_corrections(self.battery.max_corrections)
            .schedule();
        println!("{}", build_schedule_table(&schedule));
        info!(
            overall_energy_requirement = %schedule.overall_energy_requirement,
            slots_to_charge = schedule.slots_to_charge,
            n_charging_slots = schedule.charging_slots().count(),
            n_corrections = schedule.n_corrections,
            lowest_capacity = ?schedule.lowest_capacity,
            is_feasible = schedule.is_feasible,
            cost = %schedule.charging_cost(),
            "planned",
        );

        let windows = ChargeWindow::from_schedule(&schedule);
        println!("{}", build_windows_table(&windows));

        let device: &dyn Device = if self.scout { &LogDevice } else { &inverter };
        let trigger = self.trigger.new_trigger(self.scout)?;
        Dispatcher::builder()
            .device(device)
            .trigger(trigger.as_ref())
            .clocks(&clocks)
            .retry_policy(self.device.retry_policy())
            .unverified(self.scout)
            .build()
            .dispatch(&Payload::from_charge_windows(&windows))
            .await?;
        Ok(())
    }
}
