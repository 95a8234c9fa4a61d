//! Daily aggregation of the 3-hourly forecast feed.
//!
//! Samples are grouped by calendar date in the order dates first appear,
//! capped at [`MAX_FORECAST_DAYS`]. Each group becomes one [`DaySummary`]:
//! rounded mean/min/max temperature and the most frequent condition label.
//! When several labels tie for the highest count, the one seen first in the
//! group wins; description and icon come from the first sample carrying
//! that label.

use chrono::NaiveDate;

use crate::model::{Condition, DaySummary, WeatherSample, round_half_up};

pub const MAX_FORECAST_DAYS: usize = 5;

struct DayBucket<'a> {
    date: NaiveDate,
    samples: Vec<&'a WeatherSample>,
}

/// Reduce forecast samples to at most five per-day summaries.
///
/// Never fails: an empty input yields an empty output.
pub fn aggregate_daily(samples: &[WeatherSample]) -> Vec<DaySummary> {
    let mut buckets: Vec<DayBucket<'_>> = Vec::new();

    for sample in samples {
        let date = sample.date();
        match buckets.iter().position(|b| b.date == date) {
            Some(idx) => buckets[idx].samples.push(sample),
            None if buckets.len() < MAX_FORECAST_DAYS => buckets.push(DayBucket {
                date,
                samples: vec![sample],
            }),
            None => {}
        }
    }

    buckets.iter().filter_map(summarize).collect()
}

fn summarize(bucket: &DayBucket<'_>) -> Option<DaySummary> {
    let first = bucket.samples.first()?;

    let temps = bucket.samples.iter().map(|s| s.temperature_c);
    let sum: f64 = temps.clone().sum();
    let max = temps.clone().fold(f64::NEG_INFINITY, f64::max);
    let min = temps.fold(f64::INFINITY, f64::min);
    let avg = sum / bucket.samples.len() as f64;

    let condition = dominant_condition(&bucket.samples).unwrap_or_else(|| first.condition.clone());
    let representative = bucket
        .samples
        .iter()
        .find(|s| s.condition == condition)
        .unwrap_or(first);

    Some(DaySummary {
        date: bucket.date,
        avg_temp_c: round_half_up(avg),
        min_temp_c: round_half_up(min),
        max_temp_c: round_half_up(max),
        condition,
        description: representative.description.clone(),
        icon: representative.icon.clone(),
    })
}

/// Most frequent label; ties resolve to the first-seen label.
fn dominant_condition(samples: &[&WeatherSample]) -> Option<Condition> {
    let mut counts: Vec<(&Condition, usize)> = Vec::new();
    for sample in samples {
        match counts.iter().position(|(c, _)| **c == sample.condition) {
            Some(idx) => counts[idx].1 += 1,
            None => counts.push((&sample.condition, 1)),
        }
    }

    let mut best: Option<(&Condition, usize)> = None;
    for (condition, count) in counts {
        // strictly greater keeps the earlier label on a tie
        if best.is_none_or(|(_, n)| count > n) {
            best = Some((condition, count));
        }
    }

    best.map(|(c, _)| c.clone())
}
