use std::{fmt::Debug, fs, path::Path};

use chrono::{DateTime, Days, Local, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::{
    core::{interval::Interval, price_slot::PriceSlot},
    prelude::*,
    quantity::rate::KilowattHourRate,
};

/// Price sensor attributes, as exported by the energy provider integration.
#[derive(Deserialize)]
pub struct RawForecast {
    #[serde(default)]
    pub raw_today: Vec<Option<RawSlot>>,

    #[serde(default)]
    pub raw_tomorrow: Vec<Option<RawSlot>>,
}

#[derive(Deserialize)]
pub struct RawSlot {
    pub start: Option<String>,
    pub end: Option<String>,

    /// Kept loose, so that a malformed price only drops its own slot.
    pub value: Option<serde_json::Value>,
}

impl RawForecast {
    #[instrument(name = "Reading the forecast…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?;
        serde_json::from_slice(&contents)
            .with_context(|| format!("failed to parse `{}`", path.display()))
    }

    /// Clean up the raw entries into an ordered sequence of upcoming price slots.
    #[instrument(name = "Cleaning up the forecast…", skip_all)]
    pub fn into_price_slots(self, now: DateTime<Local>) -> Vec<PriceSlot> {
        let mut price_slots: Vec<PriceSlot> = self
            .raw_today
            .into_iter()
            .chain(self.raw_tomorrow)
            .filter_map(|raw_slot| match raw_slot?.try_into_price_slot() {
                Ok(price_slot) => Some(price_slot),
                Err(error) => {
                    warn!("skipping the slot: {error:#}");
                    None
                }
            })
            .filter(|price_slot| price_slot.interval.end > now)
            .collect();
        price_slots.sort_by_key(|price_slot| price_slot.interval.start);
        price_slots
    }
}

impl RawSlot {
    fn try_into_price_slot(self) -> Result<PriceSlot> {
        let start = strip_quotes(&self.start.context("missing start")?);
        let end = strip_quotes(&self.end.context("missing end")?);
        let value = self.value.context("missing value")?;
        let value = value.as_f64().with_context(|| format!("`{value}` is not a price"))?;
        let start = parse_timestamp(&with_time_of(&start, &end))?;
        let end = parse_timestamp(&end)?;
        ensure!(start < end, "the slot starts at {start} but ends at {end}");
        Ok(PriceSlot::new(Interval::new(start, end), KilowattHourRate::from(value)))
    }
}

fn strip_quotes(text: &str) -> String {
    text.replace(['\'', '"'], "")
}

/// Shortest timestamp carrying the time of day.
const MIN_TIMESTAMP_LEN: usize = "YYYY-MM-DDTHH:MM:SS".len();

/// Complete a date-only start with the time of day and offset of its end.
fn with_time_of(start: &str, end: &str) -> String {
    if start.len() < MIN_TIMESTAMP_LEN
        && end.len() >= MIN_TIMESTAMP_LEN
        && let (Some(date), Some(time)) = (start.get(..10), end.get(10..))
    {
        return format!("{date}{time}");
    }
    start.to_owned()
}

/// Parse an RFC 3339 timestamp, or a local one without the offset.
fn parse_timestamp(text: &str) -> Result<DateTime<Local>> {
    let text = strip_quotes(text);
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&text) {
        return Ok(timestamp.with_timezone(&Local));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
        .with_context(|| format!("`{text}` is not a timestamp"))?
        .and_local_timezone(Local)
        .earliest()
        .with_context(|| format!("`{text}` does not exist in the local time zone"))
}

/// Next occurrence of the time of day, strictly after `now`.
pub fn resolve_deadline(now: DateTime<Local>, time: NaiveTime) -> Result<DateTime<Local>> {
    let today = now.date_naive().and_time(time);
    let deadline = today
        .and_local_timezone(Local)
        .earliest()
        .filter(|deadline| *deadline > now)
        .or_else(|| {
            today.checked_add_days(Days::new(1))?.and_local_timezone(Local).earliest()
        })
        .with_context(|| format!("cannot resolve {time} in the local time zone"))?;
    debug!(%deadline, "resolved the deadline");
    Ok(deadline)
}
