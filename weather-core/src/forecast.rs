//! Reduction of the 3-hour forecast into one representative sample per day.

use chrono::{Local, NaiveDate, TimeZone};

use crate::model::{DailySummary, ForecastSample};

pub const MAX_FORECAST_DAYS: usize = 5;

/// Summarize samples by calendar date in the local timezone.
///
/// See [`summarize_daily_in`].
pub fn summarize_daily(samples: &[ForecastSample]) -> Vec<DailySummary> {
    summarize_daily_in(samples, &Local)
}

/// Pick the first sample of each calendar date (as seen in `tz`), in the order
/// the dates first appear, keeping at most [`MAX_FORECAST_DAYS`] of them.
///
/// No averaging takes place: a day's representative may well be a pre-dawn
/// reading.
pub fn summarize_daily_in<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailySummary> {
    let mut days = DailyBuckets::default();

    for sample in samples {
        days.offer(date_key(sample, tz), sample);
    }

    days.into_summaries()
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .collect()
}

fn date_key<Tz: TimeZone>(sample: &ForecastSample, tz: &Tz) -> NaiveDate {
    sample.timestamp.with_timezone(tz).date_naive()
}

/// Date -> first sample, iterated in insertion order.
#[derive(Debug, Default)]
struct DailyBuckets<'a> {
    entries: Vec<(NaiveDate, &'a ForecastSample)>,
}

impl<'a> DailyBuckets<'a> {
    /// Record `sample` for `date` unless that date already has one.
    fn offer(&mut self, date: NaiveDate, sample: &'a ForecastSample) {
        if !self.entries.iter().any(|(seen, _)| *seen == date) {
            self.entries.push((date, sample));
        }
    }

    fn into_summaries(self) -> Vec<DailySummary> {
        self.entries
            .into_iter()
            .map(|(date, sample)| DailySummary {
                date,
                sample: sample.clone(),
            })
            .collect()
    }
}
