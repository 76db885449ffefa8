//! Fixed category-label mappings for the rental dataset's coded columns.
//!
//! Codes outside the documented domain map to [`UNKNOWN`] rather than
//! panicking, so a stray value only shows up as an odd bar label.

use chrono::Weekday;

/// First calendar year of the dataset; the `yr` column is an offset from it.
pub const BASE_YEAR: i32 = 2011;

/// Label used for any code outside a column's known domain.
pub const UNKNOWN: &str = "Unknown";

const SEASONS: [&str; 4] = ["Spring", "Summer", "Fall", "Winter"];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const WEATHER: [&str; 4] = [
    "Clear / Partly cloudy",
    "Mist / Cloudy",
    "Light snow / Light rain",
    "Heavy rain / Ice pellets",
];

/// Season code 1–4.
pub fn season_label(code: u8) -> &'static str {
    one_based(&SEASONS, code)
}

/// Month code 1–12.
pub fn month_label(code: u8) -> &'static str {
    one_based(&MONTHS, code)
}

/// Year offset → calendar year, e.g. `1` → `"2012"`.
pub fn year_label(code: u8) -> String {
    (BASE_YEAR + i32::from(code)).to_string()
}

/// Weekday code 0 (Sunday) – 6 (Saturday).
pub fn weekday_label(code: u8) -> &'static str {
    WEEKDAYS.get(usize::from(code)).copied().unwrap_or(UNKNOWN)
}

/// Weather situation code 1–4.
pub fn weather_label(code: u8) -> &'static str {
    one_based(&WEATHER, code)
}

/// Full English weekday name, e.g. `"Sunday"`.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn one_based(table: &[&'static str], code: u8) -> &'static str {
    usize::from(code)
        .checked_sub(1)
        .and_then(|idx| table.get(idx))
        .copied()
        .unwrap_or(UNKNOWN)
}
