use std::path::PathBuf;

use chrono::{NaiveTime, TimeDelta};
use clap::{Parser, Subcommand, ValueEnum};

use crate::{
    core::charge_slot::SlotEnergy,
    quantity::{energy::KilowattHours, percent::Percent, power::Kilowatts},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Find the cheapest charging windows for the price forecast and print the plan as JSON.
    #[clap(name = "plan")]
    Plan(Box<PlanArgs>),
}

#[derive(Parser)]
pub struct PlanArgs {
    /// JSON file with `raw_today` and `raw_tomorrow` price lists.
    #[clap(long = "prices", env = "PRICES_PATH")]
    pub prices_path: PathBuf,

    /// Finish charging by this time of day (`HH:MM`), today or tomorrow, whichever comes first.
    #[clap(long = "complete-by", env = "COMPLETE_BY", value_parser = parse_time_of_day)]
    pub complete_by: Option<NaiveTime>,

    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub charger: ChargerArgs,

    #[clap(flatten)]
    pub windows: WindowArgs,
}

#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Current state-of-charge percent.
    #[clap(long = "current-soc", env = "CURRENT_SOC_PERCENT")]
    pub current_soc: Percent,

    /// Desired state-of-charge percent.
    #[clap(long = "target-soc", default_value = "80", env = "TARGET_SOC_PERCENT")]
    pub target_soc: Percent,

    /// Usable battery capacity in kilowatt-hours.
    #[clap(long = "battery-size-kwh", env = "BATTERY_SIZE_KWH")]
    pub capacity: KilowattHours,
}

#[derive(Copy, Clone, Parser)]
pub struct ChargerArgs {
    /// Charging rate drawn from the grid.
    #[clap(long = "energy-in", env = "ENERGY_IN")]
    pub energy_in: f64,

    #[clap(long = "energy-in-unit", default_value = "kw", env = "ENERGY_IN_UNIT")]
    pub energy_in_unit: EnergyUnit,

    /// Charging rate stored in the battery, defaults to the grid rate.
    #[clap(long = "energy-out", env = "ENERGY_OUT")]
    pub energy_out: Option<f64>,

    /// Defaults to the grid rate unit.
    #[clap(long = "energy-out-unit", env = "ENERGY_OUT_UNIT")]
    pub energy_out_unit: Option<EnergyUnit>,
}

impl ChargerArgs {
    /// Energy moved per price slot of the specified duration.
    pub fn slot_energy(&self, slot_duration: TimeDelta) -> SlotEnergy {
        SlotEnergy {
            grid: self.energy_in_unit.per_slot(self.energy_in, slot_duration),
            battery: self
                .energy_out_unit
                .unwrap_or(self.energy_in_unit)
                .per_slot(self.energy_out.unwrap_or(self.energy_in), slot_duration),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum EnergyUnit {
    /// Power, multiplied by the slot duration.
    #[value(name = "kw")]
    Kilowatts,

    /// Energy per slot.
    #[value(name = "kwh")]
    KilowattHours,

    /// Energy per slot.
    #[value(name = "wh")]
    WattHours,
}

impl EnergyUnit {
    pub fn per_slot(self, value: f64, slot_duration: TimeDelta) -> KilowattHours {
        match self {
            Self::Kilowatts => Kilowatts::from(value) * slot_duration,
            Self::KilowattHours => KilowattHours::from(value),
            Self::WattHours => KilowattHours::from_watt_hours(value),
        }
    }
}

#[derive(Copy, Clone, Parser)]
pub struct WindowArgs {
    /// Minimal number of price slots in a single charging window.
    #[clap(long, default_value = "1", env = "MIN_SLOTS_PER_WINDOW")]
    pub min_slots_per_window: usize,

    /// Maximal number of separate charging windows.
    #[clap(long, default_value = "3", env = "MAX_WINDOWS")]
    pub max_windows: usize,
}

fn parse_time_of_day(text: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(text, "%H:%M")
}
