mod cli;
mod core;
mod forecast;
mod prelude;
mod quantity;

use chrono::{Local, TimeDelta};
use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command, PlanArgs},
    core::planner::Planner,
    forecast::{RawForecast, resolve_deadline},
    prelude::*,
};

/// Assumed when the forecast is too short to tell.
const DEFAULT_SLOT_DURATION: TimeDelta = TimeDelta::minutes(15);

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().with_writer(std::io::stderr).init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Plan(args) => plan(&args)?,
    }

    info!("done!");
    Ok(())
}

#[instrument(skip_all)]
fn plan(args: &PlanArgs) -> Result {
    let now = Local::now();
    let price_slots = RawForecast::read_from(&args.prices_path)?.into_price_slots(now);
    info!(n_slots = price_slots.len(), "fetched the forecast");

    let slot_duration =
        price_slots.first().map_or(DEFAULT_SLOT_DURATION, |slot| slot.interval.duration());
    let complete_by = args.complete_by.map(|time| resolve_deadline(now, time)).transpose()?;

    let plan = Planner::builder()
        .current_soc(args.battery.current_soc)
        .target_soc(args.battery.target_soc)
        .capacity(args.battery.capacity)
        .slot_energy(args.charger.slot_energy(slot_duration))
        .price_slots(&price_slots)
        .min_slots_per_window(args.windows.min_slots_per_window)
        .max_windows(args.windows.max_windows)
        .maybe_complete_by(complete_by)
        .plan()
        .context("failed to plan the charging")?;
    info!(
        outcome = ?plan.outcome,
        n_windows = plan.charge_slots.len(),
        total_energy = %plan.total_energy,
        total_cost = %plan.total_cost,
        "planned",
    );
    for charge_slot in &plan.charge_slots {
        info!(
            start = %charge_slot.interval.start.format("%d.%m %H:%M"),
            end = %charge_slot.interval.end.format("%d.%m %H:%M"),
            energy = %charge_slot.energy,
            cost = %charge_slot.cost,
            charge = %charge_slot.charge,
            "window",
        );
    }

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
