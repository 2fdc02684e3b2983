// Date utility functions
// Julian day numbering and minute-of-day helpers shared by layout and selection.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Weekday,
};

pub const MINUTES_PER_HOUR: i32 = 60;
pub const MINUTES_PER_DAY: i32 = 24 * MINUTES_PER_HOUR;
pub const HOURS_PER_DAY: i32 = 24;
pub const MILLIS_PER_MINUTE: i64 = 60_000;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Julian day number of 1970-01-01.
pub const EPOCH_JULIAN_DAY: i32 = 2_440_588;

/// Offset between chrono's day-of-common-era count and the Julian day number.
const CE_TO_JULIAN: i32 = EPOCH_JULIAN_DAY - 719_163;

/// Julian day number of a calendar date.
pub fn julian_day(date: NaiveDate) -> i32 {
    date.num_days_from_ce() + CE_TO_JULIAN
}

/// Calendar date for a Julian day number, `None` outside chrono's range.
pub fn date_from_julian_day(julian_day: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(julian_day - CE_TO_JULIAN)
}

/// Julian day of a zoned instant, using its local wall-clock date.
pub fn julian_day_of<Tz: TimeZone>(instant: &DateTime<Tz>) -> i32 {
    julian_day(instant.date_naive())
}

pub fn minutes_since_midnight(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

/// Resolve a wall-clock date and time in `tz` to UTC milliseconds.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap are pushed forward in half-hour steps until they exist.
pub fn local_to_millis<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<i64> {
    let mut candidate = local;
    for _ in 0..6 {
        if let Some(resolved) = tz.from_local_datetime(&candidate).earliest() {
            return Some(resolved.timestamp_millis());
        }
        candidate += Duration::minutes(30);
    }
    None
}

/// UTC milliseconds of `hour:00` on `julian_day` in `tz`.
pub fn day_hour_to_millis<Tz: TimeZone>(tz: &Tz, julian_day: i32, hour: i32) -> Option<i64> {
    let date = date_from_julian_day(julian_day)?;
    let time = NaiveTime::from_hms_opt(hour.clamp(0, HOURS_PER_DAY - 1) as u32, 0, 0)?;
    local_to_millis(tz, date.and_time(time))
}

/// Midnight UTC of a Julian day, in epoch milliseconds.
pub fn utc_day_start_millis(julian_day: i32) -> i64 {
    (julian_day - EPOCH_JULIAN_DAY) as i64 * MILLIS_PER_DAY
}

/// Julian day that starts the week containing `julian_day`.
///
/// `first_day_of_week`: 0 = Sunday, 1 = Monday, etc.
pub fn week_start(julian_day: i32, first_day_of_week: u8) -> i32 {
    let weekday = match date_from_julian_day(julian_day) {
        Some(date) => date.weekday().num_days_from_sunday() as i32,
        None => return julian_day,
    };
    let offset = (weekday - first_day_of_week as i32 % 7 + 7) % 7;
    julian_day - offset
}

/// Short day header such as "Mon 14".
pub fn format_day_header(julian_day: i32) -> String {
    match date_from_julian_day(julian_day) {
        Some(date) => format!("{} {}", weekday_abbrev(date.weekday()), date.day()),
        None => String::new(),
    }
}

fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Label drawn beside an hour row: "12am", "1pm" or "13:00".
pub fn format_hour_label(hour: i32, use_24_hour: bool) -> String {
    let hour = hour.rem_euclid(HOURS_PER_DAY);
    if use_24_hour {
        return format!("{:02}:00", hour);
    }
    let suffix = if hour < 12 { "am" } else { "pm" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}{}", display, suffix)
}
