//! Aligning the historical energy profile and the solar forecast with the price slots.

use std::collections::BTreeMap;

use bon::Builder;
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use itertools::Itertools;

use crate::{
    core::{projector::project_net_energy, slot::SlotTimes},
    prelude::*,
    quantity::energy::KilowattHours,
};

const N_HALF_HOURS_PER_DAY: usize = 48;

/// Historical half-hour energy flows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlowSample {
    /// Half-hour start on the device clock.
    pub start: NaiveDateTime,

    pub consumption: KilowattHours,
    pub production: KilowattHours,
}

/// Forecast solar UV index per half-hour start.
pub type SolarForecast = BTreeMap<DateTime<Utc>, f64>;

/// Zero-based half-hour of the day.
#[expect(clippy::cast_possible_truncation)]
pub fn half_hour_of_day(time: NaiveDateTime) -> usize {
    (time.hour() * 2 + time.minute() / 30) as usize
}

/// Mean consumption and production per half-hour of the day.
#[must_use]
#[derive(Clone, Debug)]
pub struct DailyProfile([(KilowattHours, KilowattHours); N_HALF_HOURS_PER_DAY]);

impl DailyProfile {
    #[expect(clippy::cast_precision_loss)]
    pub fn from_samples(samples: &[FlowSample]) -> Self {
        let means = samples
            .iter()
            .into_group_map_by(|sample| half_hour_of_day(sample.start))
            .into_iter()
            .map(|(half_hour, samples)| {
                let n = samples.len() as f64;
                let consumption = samples.iter().map(|sample| sample.consumption).sum::<KilowattHours>();
                let production = samples.iter().map(|sample| sample.production).sum::<KilowattHours>();
                (half_hour, (consumption / n, production / n))
            })
            .collect::<BTreeMap<_, _>>();
        debug!(n_samples = samples.len(), n_known = means.len(), "built the daily profile");

        let fallback = if means.is_empty() {
            (KilowattHours::ZERO, KilowattHours::ZERO)
        } else {
            let n = means.len() as f64;
            (
                means.values().map(|(consumption, _)| *consumption).sum::<KilowattHours>() / n,
                means.values().map(|(_, production)| *production).sum::<KilowattHours>() / n,
            )
        };
        Self(std::array::from_fn(|half_hour| means.get(&half_hour).copied().unwrap_or(fallback)))
    }

    pub const fn consumption(&self, half_hour: usize) -> KilowattHours {
        self.0[half_hour % N_HALF_HOURS_PER_DAY].0
    }

    pub const fn production(&self, half_hour: usize) -> KilowattHours {
        self.0[half_hour % N_HALF_HOURS_PER_DAY].1
    }
}

/// Per-slot series aligned with the planning horizon.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct SlotSeries {
    pub consumption: Vec<KilowattHours>,
    pub production: Vec<KilowattHours>,
    pub solar_bias: Vec<f64>,
}

impl SlotSeries {
    pub fn net_energy(&self) -> Vec<KilowattHours> {
        project_net_energy(&self.consumption, &self.production, &self.solar_bias)
    }
}

/// Projects the daily profile onto the horizon slots.
#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Projection<'a> {
    /// Horizon slots, normally the price slots.
    slots: &'a [SlotTimes],

    profile: &'a DailyProfile,

    solar_forecast: &'a SolarForecast,

    /// UV index which corresponds to the historical average production.
    reference_uv_index: f64,

    /// Bias for the slots not covered by the forecast.
    #[builder(default)]
    fallback_bias: f64,
}

impl<S: projection_builder::IsComplete> ProjectionBuilder<'_, S> {
    pub fn project(self) -> SlotSeries {
        self.build().project()
    }
}

impl Projection<'_> {
    #[instrument(skip_all, fields(n_slots = self.slots.len()))]
    fn project(self) -> SlotSeries {
        let mut series = SlotSeries::default();
        let mut n_forecasted = 0_usize;
        for times in self.slots {
            let half_hour = half_hour_of_day(times.start.device);
            series.consumption.push(self.profile.consumption(half_hour));
            series.production.push(self.profile.production(half_hour));
            let bias = match self.solar_forecast.get(&times.start.utc) {
                Some(uv_index) if self.reference_uv_index > 0.0 => {
                    n_forecasted += 1;
                    uv_index / self.reference_uv_index
                }
                _ => self.fallback_bias,
            };
            series.solar_bias.push(bias);
        }
        debug!(n_forecasted, "projected");
        series
    }
}
