//! [Met Office DataPoint](https://www.metoffice.gov.uk/services/data/datapoint) 3-hourly site forecast.

use std::time::Duration;

use chrono::{NaiveDate, TimeDelta};
use reqwest::Client;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::{core::series::SolarForecast, prelude::*};

/// Each forecast entry covers the next three hours.
const N_HALF_HOURS_PER_ENTRY: i64 = 6;

pub struct Api {
    client: Client,
    api_key: String,
}

impl Api {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder().user_agent("kestrel").timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, api_key })
    }

    #[instrument(skip_all, fields(location_id = location_id))]
    pub async fn get_solar_forecast(&self, location_id: &str) -> Result<SolarForecast> {
        info!("fetching…");
        let forecast = self
            .client
            .get(format!("http://datapoint.metoffice.gov.uk/public/data/val/wxfcs/all/json/{location_id}"))
            .query(&[("res", "3hourly"), ("key", self.api_key.as_str())])
            .send()
            .await
            .context("failed to call the forecast API")?
            .error_for_status()
            .context("the forecast request failed")?
            .json::<Response>()
            .await
            .context("failed to deserialize the forecast")?
            .into_solar_forecast()?;
        info!(n_half_hours = forecast.len(), "fetched");
        Ok(forecast)
    }
}

#[derive(Deserialize)]
struct Response {
    #[serde(rename = "SiteRep")]
    site_report: SiteReport,
}

impl Response {
    fn into_solar_forecast(self) -> Result<SolarForecast> {
        let mut forecast = SolarForecast::new();
        for period in self.site_report.data_values.location.periods {
            let date = NaiveDate::parse_from_str(&period.date, "%Y-%m-%dZ")
                .with_context(|| format!("invalid period date: `{}`", period.date))?;
            for report in period.reports {
                let start = date.and_time(chrono::NaiveTime::MIN).and_utc()
                    + TimeDelta::minutes(report.minutes_since_midnight);
                for i in 0..N_HALF_HOURS_PER_ENTRY {
                    forecast.insert(start + TimeDelta::minutes(30 * i), report.uv_index);
                }
            }
        }
        Ok(forecast)
    }
}

#[derive(Deserialize)]
struct SiteReport {
    #[serde(rename = "DV")]
    data_values: DataValues,
}

#[derive(Deserialize)]
struct DataValues {
    #[serde(rename = "Location")]
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    #[serde(rename = "Period")]
    periods: Vec<Period>,
}

#[derive(Deserialize)]
struct Period {
    /// For example, `2023-08-18Z`.
    #[serde(rename = "value")]
    date: String,

    #[serde(rename = "Rep")]
    reports: Vec<Report>,
}

#[serde_as]
#[derive(Deserialize)]
struct Report {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(rename = "$")]
    minutes_since_midnight: i64,

    #[serde_as(as = "DisplayFromStr")]
    #[serde(rename = "U")]
    uv_index: f64,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_solar_forecast_ok() -> Result {
        // language=JSON
        const RESPONSE: &str = r#"
            {
                "SiteRep": {
                    "Wx": {"Param": []},
                    "DV": {
                        "dataDate": "2023-08-18T09:00:00Z",
                        "type": "Forecast",
                        "Location": {
                            "i": "320301",
                            "lat": "54.0465",
                            "lon": "-2.7999",
                            "name": "LANCASTER",
                            "country": "ENGLAND",
                            "continent": "EUROPE",
                            "elevation": "26.0",
                            "Period": [
                                {
                                    "type": "Day",
                                    "value": "2023-08-18Z",
                                    "Rep": [
                                        {"D": "W", "F": "14", "G": "18", "H": "72", "Pp": "5", "S": "9", "T": "16", "V": "VG", "W": "3", "U": "4", "$": "720"},
                                        {"D": "W", "F": "13", "G": "16", "H": "80", "Pp": "7", "S": "7", "T": "14", "V": "VG", "W": "7", "U": "1", "$": "900"}
                                    ]
                                },
                                {
                                    "type": "Day",
                                    "value": "2023-08-19Z",
                                    "Rep": [
                                        {"D": "SW", "F": "11", "G": "13", "H": "90", "Pp": "10", "S": "4", "T": "12", "V": "GO", "W": "2", "U": "0", "$": "0"}
                                    ]
                                }
                            ]
                        }
                    }
                }
            }
        "#;
        let forecast = serde_json::from_str::<Response>(RESPONSE)?.into_solar_forecast()?;
        assert_eq!(forecast.len(), 18);
        assert_eq!(forecast[&Utc.with_ymd_and_hms(2023, 8, 18, 12, 0, 0).unwrap()], 4.0);
        assert_eq!(forecast[&Utc.with_ymd_and_hms(2023, 8, 18, 14, 30, 0).unwrap()], 4.0);
        assert_eq!(forecast[&Utc.with_ymd_and_hms(2023, 8, 18, 15, 0, 0).unwrap()], 1.0);
        assert_eq!(forecast[&Utc.with_ymd_and_hms(2023, 8, 19, 2, 30, 0).unwrap()], 0.0);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_get_solar_forecast_ok() -> Result {
        let api_key = std::env::var("MET_OFFICE_API_KEY")?;
        let forecast = Api::new(api_key)?.get_solar_forecast("320301").await?;
        assert!(!forecast.is_empty());
        Ok(())
    }
}
