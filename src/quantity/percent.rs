use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

/// State of charge, or a change of it, in percent of the battery capacity.
#[derive(
    Copy,
    Clone,
    Default,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Sub,
)]
#[serde(transparent)]
pub struct Percent(pub f64);

impl Percent {
    pub const fn to_proportion(self) -> f64 {
        self.0 / 100.0
    }

    /// Round to a whole percent, half away from zero.
    #[must_use]
    pub fn round(self) -> Self {
        Self(self.0.round())
    }

    pub const fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Debug for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}
