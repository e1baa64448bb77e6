quantity!(KilowattHourRate, via: f64, suffix: "p/kWh", precision: 2);

impl KilowattHourRate {
    pub const fn is_negative(self) -> bool {
        self.0 < 0.0
    }
}
