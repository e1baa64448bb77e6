use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_with::serde_as;

use crate::{
    core::series::FlowSample,
    quantity::{energy::KilowattHours, power::Watts},
};

/// Envelope of every successful response.
#[derive(Deserialize)]
pub struct Response<T> {
    pub data: T,
}

#[derive(Deserialize)]
pub struct CommunicationDevice {
    pub inverter: InverterDetails,
}

#[derive(Deserialize)]
pub struct InverterDetails {
    #[serde(rename = "serial")]
    pub serial_number: String,

    pub info: InverterInfo,
}

#[derive(Deserialize)]
pub struct InverterInfo {
    pub battery: BatteryInfo,

    #[serde(rename = "max_charge_rate")]
    pub max_charge_power: Watts,
}

#[derive(Deserialize)]
pub struct BatteryInfo {
    pub nominal_capacity: f64,
    pub nominal_voltage: f64,
}

impl BatteryInfo {
    pub fn capacity(&self) -> KilowattHours {
        KilowattHours::from_watt_hours(self.nominal_voltage * self.nominal_capacity)
    }
}

#[derive(Deserialize)]
pub struct SystemData {
    pub battery: BatteryData,
}

#[derive(Deserialize)]
pub struct BatteryData {
    pub percent: f64,
}

/// Energy flow types as numbered by the API.
pub mod flow_type {
    pub const PV_TO_HOME: u8 = 0;
    pub const PV_TO_BATTERY: u8 = 1;
    pub const PV_TO_GRID: u8 = 2;
    pub const GRID_TO_HOME: u8 = 3;
    pub const BATTERY_TO_HOME: u8 = 5;

    pub const ALL: [u8; 5] = [PV_TO_HOME, PV_TO_BATTERY, PV_TO_GRID, GRID_TO_HOME, BATTERY_TO_HOME];
}

/// Energy flows keyed by a string index.
#[derive(Deserialize)]
pub struct EnergyFlows(pub BTreeMap<String, EnergyFlow>);

#[serde_as]
#[derive(Deserialize)]
pub struct EnergyFlow {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub start_time: GivEnergyTime,

    /// Energy per flow type.
    #[serde_as(as = "BTreeMap<serde_with::DisplayFromStr, _>")]
    pub data: BTreeMap<u8, KilowattHours>,
}

impl EnergyFlow {
    fn total(&self, types: &[u8]) -> KilowattHours {
        types.iter().filter_map(|type_| self.data.get(type_)).copied().sum()
    }

    pub fn to_sample(&self) -> FlowSample {
        FlowSample {
            start: self.start_time.0,
            consumption: self.total(&[
                flow_type::PV_TO_HOME,
                flow_type::GRID_TO_HOME,
                flow_type::BATTERY_TO_HOME,
            ]),
            production: self.total(&[
                flow_type::PV_TO_HOME,
                flow_type::PV_TO_BATTERY,
                flow_type::PV_TO_GRID,
            ]),
        }
    }
}

/// Naive device time as formatted by the API: `YYYY-MM-DD HH:MM`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GivEnergyTime(pub NaiveDateTime);

impl GivEnergyTime {
    const FORMAT: &str = "%Y-%m-%d %H:%M";
}

impl FromStr for GivEnergyTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s, Self::FORMAT).map(Self)
    }
}

impl Display for GivEnergyTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

/// Setting value, which the API returns as a string, number or boolean.
#[derive(Deserialize)]
pub struct SettingValue {
    pub value: serde_json::Value,
}

impl SettingValue {
    pub fn into_string(self) -> String {
        match self.value {
            serde_json::Value::String(value) => value,
            value => value.to_string(),
        }
    }
}
