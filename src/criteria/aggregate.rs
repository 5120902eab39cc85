#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign},
};

use serde::{Deserialize, Serialize};

use super::{Instance, Section, Sheet, Subsection};

/// Adds two optional point values; an absent side contributes nothing, and
/// two absent sides stay absent.
pub fn add_points(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

/// Earned and out-of points, either of which may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Total {
    /// Points earned; `None` when nothing has been graded.
    pub earned: Option<f64>,
    /// Points possible; `None` when nothing declares an out-of.
    pub out_of: Option<f64>,
}

impl Total {
    /// Creates a total with both values known.
    pub fn new(earned: f64, out_of: f64) -> Self {
        Self {
            earned: Some(earned),
            out_of: Some(out_of),
        }
    }

    /// Earned points as a percentage of out-of, or `None` when either is
    /// unknown or out-of is zero.
    pub fn percentage(&self) -> Option<f64> {
        match (self.earned, self.out_of) {
            (Some(earned), Some(out_of)) if out_of != 0.0 => Some(earned / out_of * 100.0),
            _ => None,
        }
    }
}

impl Add for Total {
    type Output = Total;

    fn add(self, rhs: Self) -> Self::Output {
        Total {
            earned: add_points(self.earned, rhs.earned),
            out_of: add_points(self.out_of, rhs.out_of),
        }
    }
}

impl AddAssign for Total {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Total {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Total::default(), Add::add)
    }
}

impl Display for Total {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        write!(f, "{}/{}", show(self.earned), show(self.out_of))
    }
}

/// Anything that can report earned/out-of totals.
pub trait Aggregate {
    /// Computes the totals for this node and everything under it.
    fn total(&self) -> Total;
}

impl Aggregate for Subsection {
    fn total(&self) -> Total {
        Total {
            earned: self.earned(),
            out_of: self.out_of(),
        }
    }
}

impl Aggregate for Section {
    fn total(&self) -> Total {
        if self.subsections().is_empty() {
            return Total {
                earned: Some(0.0),
                out_of: Some(self.out_of().unwrap_or(0.0)),
            };
        }

        let summed: Total = self.subsections().iter().map(Aggregate::total).sum();
        match self.out_of() {
            Some(out_of) => Total {
                earned: summed.earned,
                out_of: Some(out_of),
            },
            None => summed,
        }
    }
}

impl Aggregate for Sheet {
    fn total(&self) -> Total {
        self.sections().iter().map(Aggregate::total).sum()
    }
}

impl Aggregate for Instance {
    fn total(&self) -> Total {
        self.sheet().total()
    }
}

/// Computes the earned/out-of totals of a sheet, instance or any of their
/// nodes.
pub fn aggregate<A: Aggregate + ?Sized>(node: &A) -> Total {
    let total = node.total();
    tracing::trace!(earned = ?total.earned, out_of = ?total.out_of, "aggregated totals");
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_points_do_not_poison_sums() {
        assert_eq!(add_points(None, None), None);
        assert_eq!(add_points(Some(2.0), None), Some(2.0));
        assert_eq!(add_points(None, Some(3.5)), Some(3.5));
        assert_eq!(add_points(Some(2.0), Some(3.5)), Some(5.5));
    }

    #[test]
    fn percentage_guards_zero_out_of() {
        assert_eq!(Total::new(0.0, 0.0).percentage(), None);
        assert_eq!(Total::default().percentage(), None);
        assert_eq!(Total::new(15.0, 20.0).percentage(), Some(75.0));
    }

    #[test]
    fn display_marks_unknown_values() {
        let total = Total {
            earned: None,
            out_of: Some(10.0),
        };
        assert_eq!(total.to_string(), "-/10.00");
    }
}
