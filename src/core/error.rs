use crate::quantity::energy::KilowattHours;

/// Planner input which makes no physical sense.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum InvalidConfiguration {
    #[error("energy stored per slot must be positive, got {0}")]
    BatteryEnergyPerSlot(KilowattHours),

    #[error("energy drawn per slot must not be negative, got {0}")]
    GridEnergyPerSlot(KilowattHours),

    #[error("battery capacity must be positive, got {0}")]
    Capacity(KilowattHours),

    #[error("state of charge must be a finite number")]
    StateOfCharge,

    #[error("a charging window must span at least one slot")]
    MinSlotsPerWindow,

    #[error("at least one charging window must be allowed")]
    MaxWindows,
}
