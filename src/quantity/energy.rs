use std::ops::{Div, Mul};

use crate::quantity::{cost::Cost, rate::KilowattHourRate};

quantity!(KilowattHours, via: f64, suffix: "kWh", precision: 2);

impl KilowattHours {
    pub fn from_watt_hours(watt_hours: f64) -> Self {
        Self(watt_hours * 0.001)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost(self.0 * rhs.0)
    }
}

/// Energy ratio, for example, the number of charging slots needed to cover a demand.
impl Div<Self> for KilowattHours {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}
