#[cfg(target_arch = "wasm32")]
use js_sys::Date;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;

/// A single selected moment in time, at minute resolution.
///
/// Values are immutable: every `with_*` method returns a new value, so
/// the controller always holds the latest reference and nothing aliases
/// a half-updated timestamp. The derived ordering is chronological.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PickerValue {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

/// Which half of the day an hour falls into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Meridiem {
    #[default]
    Am,
    Pm,
}

/// Which portions of the value an update touched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub date: bool,
    pub time: bool,
}

impl ChangeSet {
    pub fn any(&self) -> bool {
        self.date || self.time
    }

    /// Space-separated event names for this change, e.g.
    /// `"change change:date change:time"`.
    pub fn event_names(&self) -> String {
        let mut names = String::from("change");
        if self.date {
            names.push_str(" change:date");
        }
        if self.time {
            names.push_str(" change:time");
        }
        names
    }
}

/// Options for [`ValueModel::set`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SetOptions {
    /// Update the value without reporting change events.
    pub silent: bool,
}

/// Result of a [`ValueModel::set`] call.
#[derive(Clone, Copy, Debug)]
pub struct SetOutcome {
    /// The stored (quantized) value after the update.
    pub value: PickerValue,
    pub change: ChangeSet,
    /// Whether the caller should emit `change` events.
    pub emit: bool,
}

impl PickerValue {
    /// Builds a value, rejecting impossible calendar dates.
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
        })
    }

    /// Midnight on the given calendar day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        Self::new(year, month, day, 0, 0)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// The calendar-day portion, for date-granularity comparisons.
    pub fn date_key(&self) -> (i32, u32, u32) {
        (self.year, self.month, self.day)
    }

    pub fn time_key(&self) -> (u32, u32) {
        (self.hour, self.minute)
    }

    pub fn meridiem(&self) -> Meridiem {
        if self.hour < 12 { Meridiem::Am } else { Meridiem::Pm }
    }

    /// The hour as shown on a 12-hour clock face (1..=12).
    pub fn hour12(&self) -> u32 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }

    /// Returns a value with the date portion replaced. The day is pulled
    /// back to the last day of the month when it would overflow.
    pub fn with_date(self, year: i32, month: u32, day: u32) -> Self {
        let month = month.clamp(1, 12);
        let day = day.clamp(1, days_in_month(year, month));
        Self {
            year,
            month,
            day,
            ..self
        }
    }

    /// Returns a value with the time portion replaced (wrapping into the
    /// valid range rather than failing).
    pub fn with_time(self, hour: u32, minute: u32) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
            ..self
        }
    }

    pub fn with_hour(self, hour: u32) -> Self {
        self.with_time(hour, self.minute)
    }

    pub fn with_minute(self, minute: u32) -> Self {
        self.with_time(self.hour, minute)
    }

    /// Returns a value with the minute rounded to the nearest multiple
    /// of five (half rounds up). A `:60` carry rolls into the hour and,
    /// past midnight, onto the next civil day, so the result is always a
    /// valid calendar date-time.
    pub fn quantized(self) -> Self {
        let rounded = (self.minute * 2 + 5) / 10 * 5;
        if rounded < 60 {
            return Self {
                minute: rounded,
                ..self
            };
        }
        let mut value = Self {
            minute: 0,
            hour: self.hour + 1,
            ..self
        };
        if value.hour == 24 {
            value.hour = 0;
            value = value.next_day();
        }
        value
    }

    /// The same time on the following calendar day.
    pub fn next_day(self) -> Self {
        if self.day < days_in_month(self.year, self.month) {
            return Self {
                day: self.day + 1,
                ..self
            };
        }
        let (year, month) = shift_month(self.year, self.month, 1);
        Self {
            year,
            month,
            day: 1,
            ..self
        }
    }

    /// The current wall-clock moment, truncated to the hour. Used as the
    /// construction default; resolved when called, never at load time.
    pub fn now_truncated_to_hour() -> Self {
        let secs = unix_seconds_now();
        let days_since_epoch = secs.div_euclid(86_400);
        let secs_of_day = secs.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days_since_epoch);
        Self {
            year,
            month,
            day,
            hour: (secs_of_day / 3_600) as u32,
            minute: 0,
        }
    }
}

/// Holds the single authoritative selected value for one picker.
///
/// The model starts unset, so the first [`set`](Self::set) always
/// reports both a date and a time change and the initial render
/// populates both the calendar and the clock face.
#[derive(Component, Debug, Default)]
pub struct ValueModel {
    current: Option<PickerValue>,
}

impl ValueModel {
    /// A copy of the current value, if one has been set.
    pub fn get(&self) -> Option<PickerValue> {
        self.current
    }

    /// Quantizes `candidate` to the minute step, stores it, and reports
    /// which portions changed.
    pub fn set(&mut self, candidate: PickerValue, options: SetOptions) -> SetOutcome {
        self.set_exact(candidate.quantized(), options)
    }

    /// Stores `candidate` without quantizing and reports which portions
    /// changed. Callers that clamp against a range quantize first and
    /// clamp the result, so a bound whose minute sits off the step is
    /// stored exactly. When nothing changed the outcome carries an
    /// empty [`ChangeSet`] and asks for no emission; `silent`
    /// suppresses emission without suppressing the update itself.
    pub fn set_exact(&mut self, candidate: PickerValue, options: SetOptions) -> SetOutcome {
        let change = match self.current {
            Some(current) => ChangeSet {
                date: current.date_key() != candidate.date_key(),
                time: current.time_key() != candidate.time_key(),
            },
            None => ChangeSet {
                date: true,
                time: true,
            },
        };
        if change.any() {
            self.current = Some(candidate);
        }
        SetOutcome {
            value: candidate,
            change,
            emit: change.any() && !options.silent,
        }
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

/// Shifts a (year, month) pair by `delta` months.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let idx = year * 12 + (month as i32 - 1) + delta;
    let new_year = idx.div_euclid(12);
    let new_month = idx.rem_euclid(12) + 1;
    (new_year, new_month as u32)
}

/// Day of week for a calendar day, 0 = Sunday.
pub fn day_of_week(year: i32, month: u32, day: u32) -> u32 {
    let mut y = year;
    let mut m = month as i32;
    let d = day as i32;
    if m < 3 {
        y -= 1;
        m += 12;
    }
    let k = y % 100;
    let j = y / 100;
    let h = (d + ((13 * (m + 1)) / 5) + k + (k / 4) + (j / 4) + (5 * j)) % 7;
    ((h + 6) % 7) as u32
}

pub(crate) fn civil_from_days(days_since_epoch: i64) -> (i32, u32, u32) {
    let z = days_since_epoch + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let mut y = yoe as i32 + era as i32 * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = mp + if mp < 10 { 3 } else { -9 };
    if m <= 2 {
        y += 1;
    }
    (y, m as u32, d as u32)
}

#[cfg(not(target_arch = "wasm32"))]
fn unix_seconds_now() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs() as i64,
        Err(_) => 0,
    }
}

#[cfg(target_arch = "wasm32")]
fn unix_seconds_now() -> i64 {
    let ms = Date::now();
    if !ms.is_finite() {
        return 0;
    }
    (ms / 1000.0).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(y: i32, m: u32, d: u32, h: u32, min: u32) -> PickerValue {
        PickerValue::new(y, m, d, h, min).expect("valid test value")
    }

    #[test]
    fn first_set_reports_date_and_time() {
        let mut model = ValueModel::default();
        let outcome = model.set(value(2021, 6, 15, 14, 30), SetOptions::default());

        assert!(outcome.change.date);
        assert!(outcome.change.time);
        assert!(outcome.emit);
        assert_eq!(
            outcome.change.event_names(),
            "change change:date change:time"
        );
    }

    #[test]
    fn time_only_update_reports_change_time_only() {
        let mut model = ValueModel::default();
        model.set(value(2021, 6, 15, 14, 30), SetOptions::default());
        let outcome = model.set(value(2021, 6, 15, 9, 45), SetOptions::default());

        assert!(!outcome.change.date);
        assert!(outcome.change.time);
        assert_eq!(outcome.change.event_names(), "change change:time");
    }

    #[test]
    fn date_only_update_reports_change_date_only() {
        let mut model = ValueModel::default();
        model.set(value(2021, 6, 15, 14, 30), SetOptions::default());
        let outcome = model.set(value(2021, 6, 16, 14, 30), SetOptions::default());

        assert!(outcome.change.date);
        assert!(!outcome.change.time);
        assert_eq!(outcome.change.event_names(), "change change:date");
    }

    #[test]
    fn date_and_time_update_reports_both() {
        let mut model = ValueModel::default();
        model.set(value(2021, 6, 15, 14, 30), SetOptions::default());
        let outcome = model.set(value(2022, 1, 2, 3, 5), SetOptions::default());

        assert!(outcome.change.date);
        assert!(outcome.change.time);
    }

    #[test]
    fn silent_set_updates_without_emission() {
        let mut model = ValueModel::default();
        let outcome = model.set(value(2021, 6, 15, 14, 30), SetOptions { silent: true });

        assert!(!outcome.emit);
        assert!(outcome.change.any());
        assert_eq!(model.get(), Some(value(2021, 6, 15, 14, 30)));
    }

    #[test]
    fn identical_set_reports_nothing() {
        let mut model = ValueModel::default();
        model.set(value(2021, 6, 15, 14, 30), SetOptions::default());
        let outcome = model.set(value(2021, 6, 15, 14, 30), SetOptions::default());

        assert!(!outcome.change.any());
        assert!(!outcome.emit);
    }

    #[test]
    fn minutes_round_to_nearest_five() {
        let mut model = ValueModel::default();
        let outcome = model.set(value(2020, 1, 1, 10, 7), SetOptions::default());
        assert_eq!(outcome.value.minute(), 5);

        let outcome = model.set(value(2020, 1, 1, 10, 8), SetOptions::default());
        assert_eq!(outcome.value.minute(), 10);
    }

    #[test]
    fn quantization_carry_rolls_into_the_hour() {
        assert_eq!(value(2020, 1, 1, 10, 58).quantized(), value(2020, 1, 1, 11, 0));
    }

    #[test]
    fn quantization_carry_rolls_past_midnight() {
        assert_eq!(
            value(2020, 1, 31, 23, 58).quantized(),
            value(2020, 2, 1, 0, 0)
        );
        assert_eq!(
            value(2020, 12, 31, 23, 59).quantized(),
            value(2021, 1, 1, 0, 0)
        );
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(PickerValue::new(2021, 2, 29, 0, 0).is_none());
        assert!(PickerValue::new(2020, 2, 29, 0, 0).is_some());
        assert!(PickerValue::new(2021, 13, 1, 0, 0).is_none());
        assert!(PickerValue::new(2021, 6, 0, 0, 0).is_none());
        assert!(PickerValue::new(2021, 6, 1, 24, 0).is_none());
    }

    #[test]
    fn hour12_and_meridiem() {
        assert_eq!(value(2021, 6, 15, 0, 0).hour12(), 12);
        assert_eq!(value(2021, 6, 15, 0, 0).meridiem(), Meridiem::Am);
        assert_eq!(value(2021, 6, 15, 12, 0).hour12(), 12);
        assert_eq!(value(2021, 6, 15, 12, 0).meridiem(), Meridiem::Pm);
        assert_eq!(value(2021, 6, 15, 14, 30).hour12(), 2);
        assert_eq!(value(2021, 6, 15, 14, 30).meridiem(), Meridiem::Pm);
    }

    #[test]
    fn with_date_clamps_day_overflow() {
        let v = value(2021, 1, 31, 10, 0).with_date(2021, 2, 31);
        assert_eq!(v.date_key(), (2021, 2, 28));
        assert_eq!(v.time_key(), (10, 0));
    }

    #[test]
    fn month_shifts_wrap_across_years() {
        assert_eq!(shift_month(2021, 1, -1), (2020, 12));
        assert_eq!(shift_month(2021, 12, 1), (2022, 1));
        assert_eq!(shift_month(2021, 6, -18), (2019, 12));
    }

    #[test]
    fn set_exact_keeps_minutes_off_the_step() {
        let mut model = ValueModel::default();
        let outcome = model.set_exact(value(2021, 1, 10, 10, 7), SetOptions::default());
        assert_eq!(outcome.value.time_key(), (10, 7));
        assert_eq!(model.get().map(|v| v.time_key()), Some((10, 7)));

        let outcome = model.set(value(2021, 1, 10, 10, 7), SetOptions::default());
        assert_eq!(outcome.value.time_key(), (10, 5));
    }

    #[test]
    fn day_of_week_is_sunday_first() {
        // 2021-06-15 was a Tuesday.
        assert_eq!(day_of_week(2021, 6, 15), 2);
        // 2020-01-05 was a Sunday.
        assert_eq!(day_of_week(2020, 1, 5), 0);
    }
}
