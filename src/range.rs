use bevy::prelude::*;

use crate::value::PickerValue;

/// Optional start/end bounds constraining which values a picker accepts.
///
/// Unset bounds behave as minus/plus infinity. When both bounds are
/// supplied inverted they are swapped rather than rejected, restoring
/// the start ≤ end invariant.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<PickerValue>,
    end: Option<PickerValue>,
}

impl DateRange {
    pub fn new(start: Option<PickerValue>, end: Option<PickerValue>) -> Self {
        let mut range = Self { start, end };
        range.normalize();
        range
    }

    pub fn start(&self) -> Option<PickerValue> {
        self.start
    }

    pub fn end(&self) -> Option<PickerValue> {
        self.end
    }

    /// Whether either bound is configured; with no bounds every
    /// candidate is admissible and no validation styling applies.
    pub fn is_constrained(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn set_start(&mut self, start: Option<PickerValue>) {
        self.start = start;
        self.normalize();
    }

    pub fn set_end(&mut self, end: Option<PickerValue>) {
        self.end = end;
        self.normalize();
    }

    /// True iff the candidate's calendar day falls within the bounds at
    /// date granularity: the start day counts from its beginning and
    /// the end day counts through its end, whatever their times.
    pub fn date_allowed(&self, candidate: PickerValue) -> bool {
        if let Some(start) = self.start {
            if candidate.date_key() < start.date_key() {
                return false;
            }
        }
        if let Some(end) = self.end {
            if candidate.date_key() > end.date_key() {
                return false;
            }
        }
        true
    }

    /// True iff the exact timestamp falls within `[start, end]`
    /// inclusive.
    pub fn time_allowed(&self, candidate: PickerValue) -> bool {
        if let Some(start) = self.start {
            if candidate < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if candidate > end {
                return false;
            }
        }
        true
    }

    /// Pulls an out-of-range value to the nearest bound.
    pub fn clamp(&self, candidate: PickerValue) -> PickerValue {
        if let Some(start) = self.start {
            if candidate < start {
                return start;
            }
        }
        if let Some(end) = self.end {
            if candidate > end {
                return end;
            }
        }
        candidate
    }

    fn normalize(&mut self) {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                self.start = Some(end);
                self.end = Some(start);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(y: i32, m: u32, d: u32, h: u32, min: u32) -> PickerValue {
        PickerValue::new(y, m, d, h, min).expect("valid test value")
    }

    fn bounded() -> DateRange {
        DateRange::new(
            PickerValue::from_ymd(2020, 1, 10),
            PickerValue::from_ymd(2020, 1, 20),
        )
    }

    #[test]
    fn unconstrained_range_allows_everything() {
        let range = DateRange::default();
        assert!(!range.is_constrained());
        assert!(range.date_allowed(value(1970, 1, 1, 0, 0)));
        assert!(range.time_allowed(value(2999, 12, 31, 23, 55)));
    }

    #[test]
    fn date_validation_is_day_granular() {
        let range = bounded();
        assert!(!range.date_allowed(value(2020, 1, 5, 12, 0)));
        assert!(range.date_allowed(value(2020, 1, 15, 12, 0)));
        // The end day counts through its end even though the bound
        // itself is midnight.
        assert!(range.date_allowed(value(2020, 1, 20, 23, 59)));
        assert!(!range.date_allowed(value(2020, 1, 21, 0, 0)));
    }

    #[test]
    fn time_validation_is_exact() {
        let range = bounded();
        assert!(range.time_allowed(value(2020, 1, 10, 0, 0)));
        assert!(!range.time_allowed(value(2020, 1, 20, 0, 5)));
        assert!(!range.time_allowed(value(2020, 1, 9, 23, 55)));
    }

    #[test]
    fn clamp_pulls_to_nearest_bound() {
        let range = bounded();
        assert_eq!(
            range.clamp(value(2019, 12, 1, 8, 0)),
            value(2020, 1, 10, 0, 0)
        );
        assert_eq!(
            range.clamp(value(2020, 2, 1, 8, 0)),
            value(2020, 1, 20, 0, 0)
        );
        assert_eq!(
            range.clamp(value(2020, 1, 15, 8, 0)),
            value(2020, 1, 15, 8, 0)
        );
    }

    #[test]
    fn inverted_bounds_are_swapped() {
        let range = DateRange::new(
            PickerValue::from_ymd(2020, 1, 20),
            PickerValue::from_ymd(2020, 1, 10),
        );
        assert_eq!(range.start(), PickerValue::from_ymd(2020, 1, 10));
        assert_eq!(range.end(), PickerValue::from_ymd(2020, 1, 20));
    }

    #[test]
    fn bound_updates_renormalize() {
        let mut range = bounded();
        range.set_start(PickerValue::from_ymd(2020, 2, 1));
        assert_eq!(range.start(), PickerValue::from_ymd(2020, 1, 20));
        assert_eq!(range.end(), PickerValue::from_ymd(2020, 2, 1));
    }
}
