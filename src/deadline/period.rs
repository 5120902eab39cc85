#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt::Display, str::FromStr};

use chrono::TimeDelta;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::DeadlineError;

/// Seconds in one minute.
const MINUTE: i64 = 60;
/// Seconds in one hour.
const HOUR: i64 = 60 * MINUTE;
/// Seconds in one day.
const DAY: i64 = 24 * HOUR;
/// Seconds in one week.
const WEEK: i64 = 7 * DAY;

peg::parser! {
    /// grammar for late periods written as text, eg. `1 day` or `1d 12h`.
    grammar period_text() for str {
        /// matches spaces and tabs
        rule _() = quiet!{[' ' | '\t']*}

        /// matches any sequence of 1 or more digits
        rule number() -> i64
            = n:$(['0'..='9']+) {? n.parse().or(Err("integer")) }

        /// matches a unit and returns its length in seconds
        rule unit() -> i64
            = ("weeks" / "week" / "w") { WEEK }
            / ("days" / "day" / "d") { DAY }
            / ("hours" / "hour" / "hrs" / "hr" / "h") { HOUR }
            / ("minutes" / "minute" / "mins" / "min" / "m") { MINUTE }
            / ("seconds" / "second" / "secs" / "sec" / "s") { 1 }
            / expected!("a unit (weeks, days, hours, minutes or seconds)")

        /// matches one `<number> <unit>` pair and returns seconds
        rule term() -> i64
            = n:number() _ u:unit() {? n.checked_mul(u).ok_or("a shorter period") }

        /// parses a whole period and returns its length in seconds
        pub rule seconds() -> i64
            = _ t:(term() ++ (_ ","? _)) _ ![_]
            {? t.into_iter().try_fold(0i64, i64::checked_add).ok_or("a shorter period") }
    }
}

/// Nanoseconds in a duration, without overflow for any `TimeDelta`.
fn nanos(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * 1_000_000_000 + i128::from(delta.subsec_nanos())
}

/// The interval at which a variable late policy charges its deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LatePeriod(TimeDelta);

impl LatePeriod {
    /// Wraps a positive duration made of whole seconds.
    pub fn new(duration: TimeDelta) -> Result<Self, DeadlineError> {
        if duration.num_seconds() > 0 && duration.subsec_nanos() == 0 {
            Ok(Self(duration))
        } else {
            Err(DeadlineError::NonPositivePeriod(format!("{} seconds", duration.num_seconds())))
        }
    }

    /// A period of whole days.
    pub fn days(days: i64) -> Result<Self, DeadlineError> {
        Self::new(TimeDelta::try_days(days).unwrap_or(TimeDelta::zero()))
    }

    /// A period of whole hours.
    pub fn hours(hours: i64) -> Result<Self, DeadlineError> {
        Self::new(TimeDelta::try_hours(hours).unwrap_or(TimeDelta::zero()))
    }

    /// Length of the period.
    pub fn duration(&self) -> TimeDelta {
        self.0
    }

    /// Number of periods charged for being `late_by` past the deadline: any
    /// started period counts in full, and any lateness at all counts as at
    /// least one period.
    pub fn periods_elapsed(&self, late_by: TimeDelta) -> u32 {
        let late = nanos(late_by);
        if late <= 0 {
            return 0;
        }
        let period = nanos(self.0);
        let periods = (late + period - 1) / period;
        u32::try_from(periods.max(1)).unwrap_or(u32::MAX)
    }
}

impl FromStr for LatePeriod {
    type Err = DeadlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds = period_text::seconds(s).map_err(|e| DeadlineError::PeriodSyntax {
            text:     s.to_string(),
            expected: e.expected.to_string(),
        })?;
        TimeDelta::try_seconds(seconds)
            .ok_or_else(|| DeadlineError::NonPositivePeriod(s.to_string()))
            .and_then(|delta| {
                Self::new(delta).map_err(|_| DeadlineError::NonPositivePeriod(s.to_string()))
            })
    }
}

impl TryFrom<String> for LatePeriod {
    type Error = DeadlineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LatePeriod> for String {
    fn from(value: LatePeriod) -> Self {
        value.to_string()
    }
}

impl Display for LatePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rest = self.0.num_seconds();
        let text = [(DAY, "day"), (HOUR, "hour"), (MINUTE, "minute"), (1, "second")]
            .into_iter()
            .filter_map(|(size, unit)| {
                let count = rest / size;
                rest %= size;
                match count {
                    0 => None,
                    1 => Some(format!("1 {unit}")),
                    n => Some(format!("{n} {unit}s")),
                }
            })
            .join(" ");
        f.write_str(&text)
    }
}
