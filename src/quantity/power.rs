use std::ops::Mul;

use chrono::TimeDelta;

use crate::quantity::energy::KilowattHours;

quantity!(Watts, via: f64, suffix: "W", precision: 0);

impl Mul<TimeDelta> for Watts {
    type Output = KilowattHours;

    fn mul(self, rhs: TimeDelta) -> Self::Output {
        let hours = rhs.as_seconds_f64() / 3600.0;
        KilowattHours::from_watt_hours(self.0 * hours)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_half_hour_energy() {
        assert_abs_diff_eq!((Watts(3600.0) * TimeDelta::minutes(30)).0, 1.8);
    }
}
