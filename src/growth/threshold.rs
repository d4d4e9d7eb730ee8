//! Threshold evaluation for growth alerts.

use serde::Serialize;

use crate::store::Counts;

/// Most negative and most positive delta seen during one growth check.
///
/// Both ends start at zero and only widen, so a check where every table
/// grew still reports `low == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Extremes {
    pub low: i64,
    pub high: i64,
}

impl Extremes {
    pub fn observe(&mut self, diff: &Counts) {
        for value in diff.values() {
            self.low = self.low.min(value);
            self.high = self.high.max(value);
        }
    }
}

/// Optional lower and upper bounds on row changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thresholds {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Thresholds {
    /// A check is only armed by a non-zero bound; `--min 0` on its own
    /// never alerts.
    pub fn is_configured(&self) -> bool {
        self.min.is_some_and(|min| min != 0) || self.max.is_some_and(|max| max != 0)
    }
}

/// True when `min` has been reached from above or `max` from below.
pub fn should_alert(thresholds: Thresholds, extremes: Extremes) -> bool {
    if thresholds.min.is_some_and(|min| min >= extremes.low) {
        return true;
    }

    thresholds.max.is_some_and(|max| max <= extremes.high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bounds(min: Option<i64>, max: Option<i64>) -> Thresholds {
        Thresholds { min, max }
    }

    #[test]
    fn min_reached() {
        assert!(should_alert(bounds(Some(5), None), Extremes { low: 3, high: 10 }));
    }

    #[test]
    fn min_not_reached() {
        assert!(!should_alert(bounds(Some(5), None), Extremes { low: 6, high: 10 }));
    }

    #[test]
    fn max_reached_inclusive() {
        assert!(should_alert(bounds(None, Some(10)), Extremes { low: 0, high: 10 }));
        assert!(!should_alert(bounds(None, Some(11)), Extremes { low: 0, high: 10 }));
    }

    #[test]
    fn zero_bounds_alone_do_not_arm_the_check() {
        assert!(!bounds(Some(0), None).is_configured());
        assert!(!bounds(None, Some(0)).is_configured());
        assert!(!bounds(Some(0), Some(0)).is_configured());
        assert!(bounds(Some(-1), None).is_configured());
    }

    #[test]
    fn zero_still_counts_once_armed() {
        let armed = bounds(Some(0), Some(50));
        assert!(armed.is_configured());
        assert!(should_alert(armed, Extremes::default()));
    }

    #[test]
    fn negative_min_against_shrinkage() {
        let shrank = Extremes { low: -500, high: 0 };
        assert!(should_alert(bounds(Some(-100), None), shrank));
        assert!(!should_alert(bounds(Some(-1000), None), shrank));
    }

    #[test]
    fn observe_keeps_zero_baseline() {
        let mut extremes = Extremes::default();
        extremes.observe(&[("a", 4), ("b", 9)].into_iter().collect());
        assert_eq!(extremes, Extremes { low: 0, high: 9 });

        extremes.observe(&[("c", -3)].into_iter().collect());
        assert_eq!(extremes, Extremes { low: -3, high: 9 });
    }

    proptest! {
        #[test]
        fn unconfigured_never_alerts(low in any::<i64>(), high in any::<i64>()) {
            let extremes = Extremes { low, high };
            prop_assert!(!should_alert(Thresholds::default(), extremes));
        }

        #[test]
        fn extremes_straddle_zero(diffs in prop::collection::vec(
            prop::collection::vec(("[a-z]{1,4}", -1_000i64..1_000), 0..8), 0..5)
        ) {
            let mut extremes = Extremes::default();
            for diff in &diffs {
                extremes.observe(&diff.iter().map(|(l, v)| (l.as_str(), *v)).collect());
            }
            prop_assert!(extremes.low <= 0 && 0 <= extremes.high);
        }
    }
}
