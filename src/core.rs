pub mod charge_slot;
pub mod enumerator;
pub mod error;
pub mod interval;
pub mod plan;
pub mod planner;
pub mod price_slot;
pub mod trim;
pub mod window;
