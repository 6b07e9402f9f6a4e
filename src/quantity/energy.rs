use std::{
    fmt::{Debug, Display, Formatter},
    ops::{Div, Mul},
};

use crate::quantity::{Quantity, cost::Cost, percent::Percent, rate::KilowattHourRate};

pub type KilowattHours = Quantity<f64, 1, 1, 0>;

impl KilowattHours {
    pub fn from_watt_hours(watt_hours: f64) -> Self {
        Self(watt_hours * 0.001)
    }

    /// Express the energy as a share of the battery capacity.
    pub fn percent_of(self, capacity: Self) -> Percent {
        Percent(self.0 / capacity.0 * 100.0)
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}Wh", self.0 * 1000.0)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost::from(self.0 * rhs.0)
    }
}

/// How many times the right-hand energy fits into the left-hand one.
impl Div<Self> for KilowattHours {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_from_watt_hours() {
        assert_abs_diff_eq!(KilowattHours::from_watt_hours(1850.0).0, 1.85, epsilon = 1e-9);
    }

    #[test]
    fn test_percent_of() {
        let percent = KilowattHours::from(2.5).percent_of(KilowattHours::from(50.0));
        assert_abs_diff_eq!(percent.0, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mul_rate() {
        let cost = KilowattHours::from(2.0) * KilowattHourRate::from(0.25);
        assert_abs_diff_eq!(cost.0, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_div_energy() {
        let ratio = KilowattHours::from(3.0) / KilowattHours::from(1.5);
        assert_abs_diff_eq!(ratio, 2.0, epsilon = 1e-9);
    }
}
