#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use bon::Builder;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::period::LatePeriod;
use crate::{criteria::Total, error::DeadlineError};

/// How early/late point values are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeUnit {
    /// The value is a number of points.
    #[default]
    Points,
    /// The value is a percentage of the scoped out-of total.
    Percentage,
}

impl GradeUnit {
    /// Converts a configured value into points against `out_of`.
    pub fn to_points(&self, value: f64, out_of: f64) -> f64 {
        match self {
            GradeUnit::Points => value,
            GradeUnit::Percentage => out_of * (value / 100.0),
        }
    }
}

/// Which totals a timeliness adjustment is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Only the part that was handed in.
    Part,
    /// Every part of the assignment.
    Assignment,
}

impl Scope {
    /// Picks the totals for this scope.
    pub fn select(&self, part: Total, assignment: Total) -> Total {
        match self {
            Scope::Part => part,
            Scope::Assignment => assignment,
        }
    }
}

/// A per-group deadline override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(on(String, into))]
pub struct Extension {
    /// The group's new on-time deadline.
    pub on_time:     DateTime<Utc>,
    /// Move the early and late deadlines by as much as the on-time one moved.
    #[serde(default)]
    #[builder(default)]
    pub shift_dates: bool,
    /// Why the extension was granted.
    #[serde(default)]
    pub note:        Option<String>,
}

/// A deadline policy and its thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DeadlineSpec {
    /// No deadline; timing never changes the score.
    None,
    /// Fixed early, on-time and late deadlines with one adjustment each. Any
    /// of the three may be left out, but not all of them.
    Fixed {
        /// Last moment for an early bonus.
        #[serde(default)]
        early:        Option<DateTime<Utc>>,
        /// Last moment to be on time.
        #[serde(default)]
        on_time:      Option<DateTime<Utc>>,
        /// Last moment to be accepted late.
        #[serde(default)]
        late:         Option<DateTime<Utc>>,
        /// Adjustment for early submissions (positive for a bonus).
        #[serde(default)]
        early_points: Option<f64>,
        /// Adjustment for late submissions (negative for a penalty).
        #[serde(default)]
        late_points:  Option<f64>,
        /// How the two adjustments are read.
        #[serde(default)]
        unit:         GradeUnit,
        /// Measure against the whole assignment rather than this part.
        #[serde(default)]
        affects_all:  bool,
    },
    /// A deduction charged for every late period after the on-time deadline,
    /// up to a final late deadline.
    Variable {
        /// Last moment to be on time.
        #[serde(default)]
        on_time:     Option<DateTime<Utc>>,
        /// Last moment to be accepted late.
        #[serde(default)]
        late:        Option<DateTime<Utc>>,
        /// Length of one late period.
        #[serde(default)]
        late_period: Option<LatePeriod>,
        /// Adjustment per late period (negative for a penalty).
        #[serde(default)]
        late_points: Option<f64>,
        /// How the adjustment is read.
        #[serde(default)]
        unit:        GradeUnit,
        /// Measure against the whole assignment rather than this part.
        #[serde(default)]
        affects_all: bool,
    },
    /// Legacy policy: a deduction for every day past the on-time deadline,
    /// with no early bonus and no final cut-off. A submission under this
    /// policy is never [`NonCreditLate`](super::TimeStatus::NonCreditLate);
    /// however late it is, it resolves to `Late` and keeps paying per day.
    DailyDeduction {
        /// Last moment to be on time.
        #[serde(default)]
        on_time:     Option<DateTime<Utc>>,
        /// Adjustment per day late (negative for a penalty).
        #[serde(default)]
        deduction:   Option<f64>,
        /// How the adjustment is read.
        #[serde(default)]
        unit:        GradeUnit,
        /// Measure against the whole assignment rather than this part.
        #[serde(default)]
        affects_all: bool,
    },
}

/// Requires a field to be present.
fn require<T: Copy>(policy: &'static str, field: &'static str, value: Option<T>) -> Result<T, DeadlineError> {
    value.ok_or(DeadlineError::MissingField { policy, field })
}

/// Requires a present point value to be finite.
fn finite(policy: &'static str, field: &'static str, value: Option<f64>) -> Result<(), DeadlineError> {
    match value {
        Some(v) if !v.is_finite() => Err(DeadlineError::NonFinite { policy, field }),
        _ => Ok(()),
    }
}

/// Requires `earlier <= later` when both are present.
fn ordered(
    policy: &'static str,
    (earlier_name, earlier): (&'static str, Option<DateTime<Utc>>),
    (later_name, later): (&'static str, Option<DateTime<Utc>>),
) -> Result<(), DeadlineError> {
    match (earlier, later) {
        (Some(a), Some(b)) if a > b => Err(DeadlineError::ThresholdOrder {
            policy,
            earlier: earlier_name,
            later: later_name,
        }),
        _ => Ok(()),
    }
}

/// Moves an optional instant by `delta`, leaving it alone on overflow.
fn shift(instant: Option<DateTime<Utc>>, delta: TimeDelta) -> Option<DateTime<Utc>> {
    instant.map(|t| t.checked_add_signed(delta).unwrap_or(t))
}

/// Moves an early threshold back to `on_time` if it falls after it.
fn no_later_than(instant: Option<DateTime<Utc>>, on_time: DateTime<Utc>) -> Option<DateTime<Utc>> {
    instant.map(|t| t.min(on_time))
}

/// Moves a late threshold up to `on_time` if it falls before it.
fn no_earlier_than(instant: Option<DateTime<Utc>>, on_time: DateTime<Utc>) -> Option<DateTime<Utc>> {
    instant.map(|t| t.max(on_time))
}

impl DeadlineSpec {
    /// Name of the policy, as written in configuration.
    pub fn policy(&self) -> &'static str {
        match self {
            DeadlineSpec::None => "none",
            DeadlineSpec::Fixed { .. } => "fixed",
            DeadlineSpec::Variable { .. } => "variable",
            DeadlineSpec::DailyDeduction { .. } => "daily_deduction",
        }
    }

    /// The totals an adjustment under this policy is measured against.
    pub fn scope(&self) -> Scope {
        let affects_all = match self {
            DeadlineSpec::None => false,
            DeadlineSpec::Fixed { affects_all, .. }
            | DeadlineSpec::Variable { affects_all, .. }
            | DeadlineSpec::DailyDeduction { affects_all, .. } => *affects_all,
        };
        if affects_all { Scope::Assignment } else { Scope::Part }
    }

    /// The on-time deadline, if the policy has one.
    pub fn on_time(&self) -> Option<DateTime<Utc>> {
        match self {
            DeadlineSpec::None => None,
            DeadlineSpec::Fixed { on_time, .. }
            | DeadlineSpec::Variable { on_time, .. }
            | DeadlineSpec::DailyDeduction { on_time, .. } => *on_time,
        }
    }

    /// Checks that the policy carries everything it needs to resolve a
    /// submission.
    pub fn validate(&self) -> Result<(), DeadlineError> {
        let policy = self.policy();
        match self {
            DeadlineSpec::None => Ok(()),
            DeadlineSpec::Fixed {
                early,
                on_time,
                late,
                early_points,
                late_points,
                ..
            } => {
                if early.is_none() && on_time.is_none() && late.is_none() {
                    return Err(DeadlineError::MissingField {
                        policy,
                        field: "early, onTime or late",
                    });
                }
                if early.is_some() {
                    require(policy, "earlyPoints", *early_points)?;
                }
                if late.is_some() {
                    require(policy, "latePoints", *late_points)?;
                }
                finite(policy, "earlyPoints", *early_points)?;
                finite(policy, "latePoints", *late_points)?;
                ordered(policy, ("early", *early), ("onTime", *on_time))?;
                ordered(policy, ("onTime", *on_time), ("late", *late))?;
                ordered(policy, ("early", *early), ("late", *late))
            }
            DeadlineSpec::Variable {
                on_time,
                late,
                late_period,
                late_points,
                ..
            } => {
                require(policy, "onTime", *on_time)?;
                require(policy, "late", *late)?;
                require(policy, "latePeriod", *late_period)?;
                require(policy, "latePoints", *late_points)?;
                finite(policy, "latePoints", *late_points)?;
                ordered(policy, ("onTime", *on_time), ("late", *late))
            }
            DeadlineSpec::DailyDeduction {
                on_time, deduction, ..
            } => {
                require(policy, "onTime", *on_time)?;
                require(policy, "deduction", *deduction)?;
                finite(policy, "deduction", *deduction)
            }
        }
    }

    /// Returns the policy as it applies to a group holding `extension`: the
    /// on-time deadline is replaced, and with `shift_dates` the early and
    /// late deadlines move by the same amount. Without `shift_dates` they stay
    /// put, except that none may cross the new on-time deadline.
    pub fn with_extension(&self, extension: &Extension) -> DeadlineSpec {
        let delta = self
            .on_time()
            .map(|old| extension.on_time - old)
            .filter(|_| extension.shift_dates)
            .unwrap_or_else(TimeDelta::zero);
        let target = extension.on_time;
        let new_on_time = Some(target);

        let mut spec = self.clone();
        match &mut spec {
            DeadlineSpec::None => {}
            DeadlineSpec::Fixed {
                early,
                on_time,
                late,
                ..
            } => {
                *early = no_later_than(shift(*early, delta), target);
                *on_time = new_on_time;
                *late = no_earlier_than(shift(*late, delta), target);
            }
            DeadlineSpec::Variable { on_time, late, .. } => {
                *on_time = new_on_time;
                *late = no_earlier_than(shift(*late, delta), target);
            }
            DeadlineSpec::DailyDeduction { on_time, .. } => {
                *on_time = new_on_time;
            }
        }
        spec
    }
}
