use crate::value::{Meridiem, PickerValue, day_of_week};

/// The format written to the host element when none is configured.
pub const DEFAULT_FORMAT: &str = "DD/MM/YY";

/// Renders a value through a display-format string.
///
/// Recognized tokens: `YYYY`, `YY`, `MM`, `DD`, `HH` (24-hour), `hh`
/// (12-hour), `mm`, `A`/`a` (meridiem). Any other character is copied
/// through verbatim.
pub fn format_value(value: PickerValue, format: &str) -> String {
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::with_capacity(format.len());
    let mut idx = 0;

    while idx < chars.len() {
        let rest = &chars[idx..];
        let (text, consumed) = match rest {
            ['Y', 'Y', 'Y', 'Y', ..] => (format!("{:04}", value.year()), 4),
            ['Y', 'Y', ..] => (format!("{:02}", value.year().rem_euclid(100)), 2),
            ['M', 'M', ..] => (format!("{:02}", value.month()), 2),
            ['D', 'D', ..] => (format!("{:02}", value.day()), 2),
            ['H', 'H', ..] => (format!("{:02}", value.hour()), 2),
            ['h', 'h', ..] => (format!("{:02}", value.hour12()), 2),
            ['m', 'm', ..] => (format!("{:02}", value.minute()), 2),
            ['A', ..] => (meridiem_label(value.meridiem()).to_uppercase(), 1),
            ['a', ..] => (meridiem_label(value.meridiem()).to_string(), 1),
            [other, ..] => (other.to_string(), 1),
            [] => break,
        };
        out.push_str(&text);
        idx += consumed;
    }

    out
}

/// Full weekday name for the header's day-of-week line.
pub fn weekday_name(value: PickerValue) -> &'static str {
    match day_of_week(value.year(), value.month(), value.day()) {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        _ => "Saturday",
    }
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

pub fn month_short_name(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "???",
    }
}

/// Day of month with its English ordinal suffix, e.g. `15th`.
pub fn ordinal_day(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

/// The `Jun 2021` month/year line of the header.
pub fn header_month_year(value: PickerValue) -> String {
    format!("{} {:04}", month_short_name(value.month()), value.year())
}

fn meridiem_label(meridiem: Meridiem) -> &'static str {
    match meridiem {
        Meridiem::Am => "am",
        Meridiem::Pm => "pm",
    }
}
