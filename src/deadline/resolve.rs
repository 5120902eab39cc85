#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use bon::Builder;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{
    period::LatePeriod,
    spec::{DeadlineSpec, GradeUnit},
};
use crate::{config, criteria::Total, error::DeadlineError};

/// How a submission's timing compares to its deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeStatus {
    /// Before the early deadline.
    Early,
    /// Before the on-time deadline.
    OnTime,
    /// Before the late deadline.
    Late,
    /// After every deadline; no credit.
    #[serde(rename = "NC_LATE")]
    NonCreditLate,
}

impl Display for TimeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TimeStatus::Early => "early",
            TimeStatus::OnTime => "on time",
            TimeStatus::Late => "late",
            TimeStatus::NonCreditLate => "NC late",
        })
    }
}

/// The outcome of resolving a submission against a deadline policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Timeliness classification.
    pub status:       TimeStatus,
    /// Signed points to apply, already scaled and multiplied by late periods.
    pub adjustment:   f64,
    /// Late periods charged; zero unless a period-based policy found the
    /// submission late.
    pub periods_late: u32,
}

impl Resolution {
    /// A resolution that changes nothing.
    pub fn on_time() -> Self {
        Self {
            status:       TimeStatus::OnTime,
            adjustment:   0.0,
            periods_late: 0,
        }
    }

    /// Applies the resolution to a scoped earned total. A no-credit
    /// submission replaces the total with zero; every other status adds the
    /// adjustment. An unknown total stays unknown.
    pub fn apply(&self, earned: Option<f64>) -> Option<f64> {
        earned.map(|earned| match self.status {
            TimeStatus::NonCreditLate => 0.0,
            _ => earned + self.adjustment,
        })
    }

    /// Applies the resolution to the earned side of a total.
    pub fn apply_total(&self, total: Total) -> Total {
        Total {
            earned: self.apply(total.earned),
            out_of: total.out_of,
        }
    }
}

/// The thresholds a policy exposes to classification.
struct Thresholds {
    /// Early deadline.
    early:          Option<DateTime<Utc>>,
    /// On-time deadline.
    on_time:        Option<DateTime<Utc>>,
    /// Late deadline.
    late:           Option<DateTime<Utc>>,
    /// Whether anything past on time is still late rather than no-credit.
    unbounded_late: bool,
}

impl Thresholds {
    /// Pulls the thresholds out of a policy.
    fn of(spec: &DeadlineSpec) -> Self {
        match spec {
            DeadlineSpec::None => Self {
                early:          None,
                on_time:        None,
                late:           None,
                unbounded_late: true,
            },
            DeadlineSpec::Fixed {
                early,
                on_time,
                late,
                ..
            } => Self {
                early:          *early,
                on_time:        *on_time,
                late:           *late,
                unbounded_late: false,
            },
            DeadlineSpec::Variable { on_time, late, .. } => Self {
                early:          None,
                on_time:        *on_time,
                late:           *late,
                unbounded_late: false,
            },
            DeadlineSpec::DailyDeduction { on_time, .. } => Self {
                early:          None,
                on_time:        *on_time,
                late:           None,
                unbounded_late: true,
            },
        }
    }
}

/// Resolves submissions against deadline policies with a fixed leniency.
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct DeadlineResolver {
    /// Grace window added to every threshold before comparing.
    #[builder(default)]
    leniency: TimeDelta,
}

impl DeadlineResolver {
    /// A resolver using the configured leniency.
    pub fn from_config() -> Self {
        Self {
            leniency: config::leniency(),
        }
    }

    /// The grace window in use.
    pub fn leniency(&self) -> TimeDelta {
        self.leniency
    }

    /// Whether `submission` falls on or before `threshold` plus leniency.
    fn within(&self, threshold: Option<DateTime<Utc>>, submission: DateTime<Utc>) -> bool {
        threshold.is_some_and(|t| {
            submission <= t.checked_add_signed(self.leniency).unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    /// Classifies a submission. The policy is validated first.
    pub fn classify(
        &self,
        spec: &DeadlineSpec,
        submission: DateTime<Utc>,
    ) -> Result<TimeStatus, DeadlineError> {
        spec.validate()?;
        if matches!(spec, DeadlineSpec::None) {
            return Ok(TimeStatus::OnTime);
        }

        let thresholds = Thresholds::of(spec);
        let status = if self.within(thresholds.early, submission) {
            TimeStatus::Early
        } else if self.within(thresholds.on_time, submission) {
            TimeStatus::OnTime
        } else if thresholds.unbounded_late || self.within(thresholds.late, submission) {
            TimeStatus::Late
        } else {
            TimeStatus::NonCreditLate
        };
        Ok(status)
    }

    /// Resolves a submission made at `submission` against `spec`.
    ///
    /// * `scoped_out_of`: out-of total of the scope the policy measures
    ///   against (see [`DeadlineSpec::scope`]); used for percentage units.
    /// * `scoped_earned`: earned total of that scope; forfeited in full by a
    ///   no-credit submission.
    pub fn resolve(
        &self,
        spec: &DeadlineSpec,
        submission: DateTime<Utc>,
        scoped_out_of: Option<f64>,
        scoped_earned: Option<f64>,
    ) -> Result<Resolution, DeadlineError> {
        let status = self.classify(spec, submission)?;
        let out_of = scoped_out_of.unwrap_or(0.0);

        let resolution = match status {
            TimeStatus::OnTime => Resolution::on_time(),
            TimeStatus::NonCreditLate => Resolution {
                status,
                adjustment: -scoped_earned.unwrap_or(0.0),
                periods_late: 0,
            },
            TimeStatus::Early | TimeStatus::Late => match spec {
                DeadlineSpec::None => Resolution::on_time(),
                DeadlineSpec::Fixed {
                    early_points,
                    late_points,
                    unit,
                    ..
                } => {
                    let value = if status == TimeStatus::Early {
                        early_points
                    } else {
                        late_points
                    };
                    Resolution {
                        status,
                        adjustment: unit.to_points(value.unwrap_or(0.0), out_of),
                        periods_late: 0,
                    }
                }
                DeadlineSpec::Variable {
                    on_time,
                    late_period,
                    late_points,
                    unit,
                    ..
                } => {
                    let period = late_period.ok_or(DeadlineError::MissingField {
                        policy: "variable",
                        field:  "latePeriod",
                    })?;
                    per_period(*on_time, submission, period, *late_points, *unit, out_of)
                }
                DeadlineSpec::DailyDeduction {
                    on_time,
                    deduction,
                    unit,
                    ..
                } => {
                    per_period(*on_time, submission, LatePeriod::days(1)?, *deduction, *unit, out_of)
                }
            },
        };

        tracing::debug!(
            policy = spec.policy(),
            %submission,
            status = %resolution.status,
            adjustment = resolution.adjustment,
            periods_late = resolution.periods_late,
            "resolved submission timing"
        );
        Ok(resolution)
    }
}

/// Late adjustment for policies that charge per elapsed late period, counted
/// from the on-time deadline.
fn per_period(
    on_time: Option<DateTime<Utc>>,
    submission: DateTime<Utc>,
    period: LatePeriod,
    value: Option<f64>,
    unit: GradeUnit,
    out_of: f64,
) -> Resolution {
    let periods = on_time
        .map(|t| period.periods_elapsed(submission - t))
        .unwrap_or(0)
        .max(1);
    Resolution {
        status:       TimeStatus::Late,
        adjustment:   unit.to_points(value.unwrap_or(0.0) * f64::from(periods), out_of),
        periods_late: periods,
    }
}

/// Resolves a submission using the configured leniency. See
/// [`DeadlineResolver::resolve`].
pub fn resolve(
    spec: &DeadlineSpec,
    submission: DateTime<Utc>,
    scoped_out_of: Option<f64>,
    scoped_earned: Option<f64>,
) -> Result<Resolution, DeadlineError> {
    DeadlineResolver::from_config().resolve(spec, submission, scoped_out_of, scoped_earned)
}
