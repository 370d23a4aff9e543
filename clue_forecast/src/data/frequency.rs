//! Sampling frequency of a time series

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_DAY: i64 = 86_400;

/// Implied step between consecutive observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// A constant step measured in seconds
    Fixed { seconds: i64 },
    /// One step per weekday, skipping Saturdays and Sundays
    BusinessDaily,
}

impl Frequency {
    /// Daily calendar frequency
    pub fn daily() -> Self {
        Frequency::Fixed {
            seconds: SECONDS_PER_DAY,
        }
    }

    /// Fixed frequency of `minutes` minutes
    pub fn minutes(minutes: i64) -> Self {
        Frequency::Fixed {
            seconds: minutes * 60,
        }
    }

    /// The timestamp one period after `ts`
    pub fn next(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Frequency::Fixed { seconds } => ts + Duration::seconds(*seconds),
            Frequency::BusinessDaily => {
                let mut next = ts + Duration::days(1);
                while is_weekend(&next) {
                    next += Duration::days(1);
                }
                next
            }
        }
    }

    /// Number of whole periods from `from` to `to`.
    ///
    /// Returns `None` when `to` is not reachable from `from` by stepping
    /// forward on this frequency's grid.
    pub fn steps_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Option<usize> {
        if to < from {
            return None;
        }

        match self {
            Frequency::Fixed { seconds } => {
                if *seconds <= 0 {
                    return None;
                }
                let delta = (to - from).num_seconds();
                if delta % seconds != 0 || (to - from).subsec_nanos() != 0 {
                    return None;
                }
                usize::try_from(delta / seconds).ok()
            }
            Frequency::BusinessDaily => {
                if is_weekend(&from) || is_weekend(&to) {
                    return None;
                }
                let delta = to - from;
                if delta.num_seconds() % SECONDS_PER_DAY != 0 || delta.subsec_nanos() != 0 {
                    return None;
                }
                let days = delta.num_days();
                let full_weeks = days / 7;
                let mut steps = full_weeks * 5;
                let mut current = from + Duration::days(full_weeks * 7);
                while current < to {
                    current += Duration::days(1);
                    if !is_weekend(&current) {
                        steps += 1;
                    }
                }
                usize::try_from(steps).ok()
            }
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::BusinessDaily => write!(f, "business daily"),
            Frequency::Fixed { seconds } if seconds % SECONDS_PER_DAY == 0 => {
                write!(f, "every {} day(s)", seconds / SECONDS_PER_DAY)
            }
            Frequency::Fixed { seconds } if seconds % 60 == 0 => {
                write!(f, "every {} minute(s)", seconds / 60)
            }
            Frequency::Fixed { seconds } => write!(f, "every {} second(s)", seconds),
        }
    }
}

pub(crate) fn is_weekend(ts: &DateTime<Utc>) -> bool {
    matches!(ts.weekday(), Weekday::Sat | Weekday::Sun)
}
