//! [Octopus Energy](https://developer.octopus.energy/rest/) tariff client.

use std::time::Duration;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{prelude::*, quantity::rate::KilowattHourRate};

pub const DEFAULT_PRODUCT: &str = "AGILE-FLEX-22-11-25";

pub struct Api {
    client: Client,
    product: String,
    region: String,
}

impl Api {
    pub fn new(product: String, region: String) -> Result<Self> {
        let client = Client::builder().user_agent("kestrel").timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, product, region })
    }

    fn tariff_code(&self) -> String {
        format!("E-1R-{}-{}", self.product, self.region)
    }

    /// Get the unit rates starting from the current half-hour, in chronological order.
    #[instrument(skip_all, fields(product = %self.product, region = %self.region))]
    pub async fn get_upcoming_rates(&self, now: DateTime<Utc>, horizon: usize) -> Result<Vec<UnitRate>> {
        let since = now.duration_trunc(TimeDelta::minutes(30))?;
        info!(%since, "fetching…");
        let url = format!(
            "https://api.octopus.energy/v1/products/{}/electricity-tariffs/{}/standard-unit-rates/",
            self.product,
            self.tariff_code(),
        );
        let response = self
            .client
            .get(url)
            .query(&[("period_from", since.to_rfc3339())])
            .send()
            .await
            .context("failed to call the tariff API")?
            .error_for_status()
            .context("the tariff request failed")?
            .json::<Response>()
            .await
            .context("failed to deserialize the tariff response")?;
        let rates = response.into_upcoming(since, horizon);
        ensure!(!rates.is_empty(), "no unit rates are published since {since}");
        info!(n_rates = rates.len(), "fetched");
        Ok(rates)
    }
}

#[derive(Deserialize)]
struct Response {
    /// Reverse chronological.
    results: Vec<UnitRate>,
}

impl Response {
    fn into_upcoming(self, since: DateTime<Utc>, horizon: usize) -> Vec<UnitRate> {
        let mut rates = self.results;
        rates.retain(|rate| rate.valid_from >= since);
        rates.sort_by_key(|rate| rate.valid_from);
        rates.truncate(horizon);
        rates
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct UnitRate {
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,

    /// Pence per kilowatt-hour, VAT included.
    #[serde(rename = "value_inc_vat")]
    pub value: KilowattHourRate,
}
