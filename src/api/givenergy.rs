//! [GivEnergy Cloud](https://api.givenergy.cloud) client.

mod models;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use http::{HeaderMap, HeaderValue, header};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use serde_with::{DisplayFromStr, serde_as};

pub use self::models::{CommunicationDevice, SystemData};
use self::models::{EnergyFlows, GivEnergyTime, Response, SettingValue, flow_type};
use crate::{core::dispatch::Device, core::series::FlowSample, prelude::*};

const BASE_URL: &str = "https://api.givenergy.cloud/v1";

pub struct Api {
    client: Client,
}

impl Api {
    pub fn new(api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.append(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {api_key}"))?);
        headers.append(header::ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("kestrel")
            .timeout(Duration::from_secs(15))
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    #[instrument(skip_all)]
    pub async fn get_communication_device(&self) -> Result<CommunicationDevice> {
        info!("getting…");
        let devices: Vec<CommunicationDevice> = self
            .call(self.client.get(format!("{BASE_URL}/communication-device")).query(&[("page", "1")]))
            .await
            .context("failed to get the communication devices")?;
        devices.into_iter().next().context("no communication device is registered")
    }

    pub const fn inverter(&self, serial_number: String) -> Inverter<'_> {
        Inverter { api: self, serial_number }
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    async fn call<R: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<R> {
        Ok(request
            .send()
            .await
            .context("failed to call the API")?
            .error_for_status()
            .context("the request failed")?
            .json::<Response<R>>()
            .await
            .context("failed to deserialize the response JSON")?
            .data)
    }
}

pub struct Inverter<'a> {
    api: &'a Api,
    serial_number: String,
}

impl Inverter<'_> {
    fn url(&self, path: &str) -> String {
        format!("{BASE_URL}/inverter/{}/{path}", self.serial_number)
    }

    #[instrument(skip_all, fields(serial_number = %self.serial_number))]
    pub async fn get_latest_system_data(&self) -> Result<SystemData> {
        info!("getting…");
        self.api
            .call(self.api.client.get(self.url("system-data/latest")))
            .await
            .context("failed to get the latest system data")
    }

    /// Get the half-hourly energy flows between the specified device times.
    #[instrument(skip_all, fields(serial_number = %self.serial_number, start = %start, end = %end))]
    pub async fn get_energy_flows(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<FlowSample>> {
        #[serde_as]
        #[derive(Serialize)]
        struct GetEnergyFlowsRequest {
            #[serde_as(as = "DisplayFromStr")]
            start_time: GivEnergyTime,

            #[serde_as(as = "DisplayFromStr")]
            end_time: GivEnergyTime,

            /// Half-hourly.
            grouping: u8,

            types: [u8; 5],
        }

        info!("getting…");
        let request = GetEnergyFlowsRequest {
            start_time: GivEnergyTime(start),
            end_time: GivEnergyTime(end),
            grouping: 0,
            types: flow_type::ALL,
        };
        let flows: EnergyFlows = self
            .api
            .call(self.api.client.post(self.url("energy-flows")).json(&request))
            .await
            .context("failed to get the energy flows")?;
        let samples = flows.0.values().map(models::EnergyFlow::to_sample).collect::<Vec<_>>();
        info!(n_samples = samples.len(), "fetched");
        Ok(samples)
    }
}

#[async_trait]
impl Device for Inverter<'_> {
    #[instrument(skip_all, fields(serial_number = %self.serial_number, id = id, value = value))]
    async fn write_setting(&self, id: u32, value: &str) -> Result {
        #[derive(Serialize)]
        struct WriteSettingRequest<'a> {
            value: &'a str,
        }

        info!("writing…");
        let _: serde_json::Value = self
            .api
            .call(
                self.api
                    .client
                    .post(self.url(&format!("settings/{id}/write")))
                    .json(&WriteSettingRequest { value }),
            )
            .await
            .with_context(|| format!("failed to write setting #{id}"))?;
        Ok(())
    }

    #[instrument(skip_all, fields(serial_number = %self.serial_number, id = id))]
    async fn read_setting(&self, id: u32) -> Result<String> {
        let value: SettingValue = self
            .api
            .call(self.api.client.post(self.url(&format!("settings/{id}/read"))))
            .await
            .with_context(|| format!("failed to read setting #{id}"))?;
        let value = value.into_string();
        debug!(value, "read");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    use super::*;
    use crate::quantity::power::Watts;

    #[test]
    fn test_deserialize_communication_devices_ok() -> Result {
        // language=JSON
        const RESPONSE: &str = r#"
            {
                "data": [
                    {
                        "serial_number": "WF2222G111",
                        "type": "WIFI",
                        "commission_date": "2023-04-12T00:00:00Z",
                        "inverter": {
                            "serial": "FD2222G111",
                            "status": "NORMAL",
                            "last_online": "2023-08-19T10:01:02Z",
                            "last_updated": "2023-08-19T10:01:02Z",
                            "commission_date": "2023-04-12T00:00:00Z",
                            "info": {
                                "battery_type": "LITHIUM",
                                "battery": {
                                    "nominal_capacity": 186,
                                    "nominal_voltage": 51.2
                                },
                                "model": "GEN-1-HYBRID",
                                "max_charge_rate": 2600
                            },
                            "warranty": {
                                "type": "Standard",
                                "expiry_date": "2035-04-12T00:00:00Z"
                            },
                            "firmware_version": {
                                "ARM": 182,
                                "DSP": 449
                            },
                            "connections": {
                                "batteries": [],
                                "meters": []
                            },
                            "flags": []
                        }
                    }
                ],
                "links": {},
                "meta": {}
            }
        "#;
        let devices = serde_json::from_str::<Response<Vec<CommunicationDevice>>>(RESPONSE)?.data;
        let inverter = &devices[0].inverter;
        assert_eq!(inverter.serial_number, "FD2222G111");
        assert_eq!(inverter.info.max_charge_power, Watts(2600.0));
        assert_abs_diff_eq!(inverter.info.battery.capacity().0, 9.5232, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_deserialize_system_data_ok() -> Result {
        // language=JSON
        const RESPONSE: &str = r#"
            {
                "data": {
                    "time": "2023-08-19T10:01:02Z",
                    "status": "Normal",
                    "solar": {"power": 1234, "arrays": []},
                    "grid": {"voltage": 241.2, "current": 0.1, "power": -12, "frequency": 50.01},
                    "battery": {"percent": 78, "power": -1024, "temperature": 21},
                    "inverter": {"temperature": 40.2, "power": 1200, "output_voltage": 241.1},
                    "consumption": 341
                }
            }
        "#;
        let system_data = serde_json::from_str::<Response<SystemData>>(RESPONSE)?.data;
        assert_abs_diff_eq!(system_data.battery.percent, 78.0);
        Ok(())
    }

    #[test]
    fn test_deserialize_energy_flows_ok() -> Result {
        // language=JSON
        const RESPONSE: &str = r#"
            {
                "data": {
                    "0": {
                        "start_time": "2023-08-18 00:00",
                        "end_time": "2023-08-18 00:30",
                        "data": {"0": 0.0, "1": 0.0, "2": 0.0, "3": 0.12, "5": 0.2}
                    },
                    "1": {
                        "start_time": "2023-08-18 12:00",
                        "end_time": "2023-08-18 12:30",
                        "data": {"0": 0.5, "1": 0.9, "2": 0.3, "3": 0.0, "5": 0.0}
                    }
                }
            }
        "#;
        let flows = serde_json::from_str::<Response<EnergyFlows>>(RESPONSE)?.data;
        let samples = flows.0.values().map(models::EnergyFlow::to_sample).collect::<Vec<_>>();
        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples[1].start,
            NaiveDate::from_ymd_opt(2023, 8, 18).unwrap().and_hms_opt(12, 0, 0).unwrap(),
        );
        assert_abs_diff_eq!(samples[0].consumption.0, 0.32, epsilon = 1e-9);
        assert_abs_diff_eq!(samples[0].production.0, 0.0);
        assert_abs_diff_eq!(samples[1].consumption.0, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(samples[1].production.0, 1.7, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_setting_value() -> Result {
        // language=JSON
        let time = serde_json::from_str::<Response<SettingValue>>(r#"{"data": {"value": "05:30"}}"#)?;
        assert_eq!(time.data.into_string(), "05:30");
        // language=JSON
        let flag = serde_json::from_str::<Response<SettingValue>>(r#"{"data": {"value": true}}"#)?;
        assert_eq!(flag.data.into_string(), "true");
        Ok(())
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_get_communication_device_ok() -> Result {
        let api_key = std::env::var("GIVENERGY_API_KEY")?;
        let device = Api::new(&api_key)?.get_communication_device().await?;
        assert!(!device.inverter.serial_number.is_empty());
        Ok(())
    }
}
