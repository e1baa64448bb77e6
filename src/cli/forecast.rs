use clap::Parser;

use crate::{api::met_office, core::series::SolarForecast, prelude::*};

#[derive(Parser)]
pub struct ForecastArgs {
    /// Number of full days of energy flow history for the daily profile.
    #[clap(long = "history-days", env = "HISTORY_DAYS", default_value = "7")]
    pub history_days: u64,

    /// Met Office DataPoint API key, without it the solar bias falls back.
    #[clap(long = "met-office-api-key", env = "MET_OFFICE_API_KEY")]
    pub met_office_api_key: Option<String>,

    /// Met Office DataPoint site.
    #[clap(long = "met-office-location-id", env = "MET_OFFICE_LOCATION_ID", default_value = "320301")]
    pub location_id: String,

    /// UV index which corresponds to the historical average solar production.
    #[clap(long = "reference-uv-index", env = "REFERENCE_UV_INDEX", default_value = "5.0")]
    pub reference_uv_index: f64,

    /// Solar bias for the slots not covered by the forecast.
    #[clap(long = "fallback-solar-bias", env = "FALLBACK_SOLAR_BIAS", default_value = "0.0")]
    pub fallback_bias: f64,
}

impl ForecastArgs {
    /// Fetch the solar forecast, failures are not fatal.
    pub async fn get_solar_forecast(&self) -> SolarForecast {
        let Some(api_key) = &self.met_office_api_key else {
            info!("no forecast API key, using the fallback solar bias");
            return SolarForecast::new();
        };
        match self.try_get_solar_forecast(api_key).await {
            Ok(forecast) => forecast,
            Err(error) => {
                warn!("failed to get the solar forecast, using the fallback solar bias: {error:#}");
                SolarForecast::new()
            }
        }
    }

    async fn try_get_solar_forecast(&self, api_key: &str) -> Result<SolarForecast> {
        met_office::Api::new(api_key.to_string())?.get_solar_forecast(&self.location_id).await
    }
}
