//! Time-of-year distance to the solstices.
//!
//! Timestamps are mapped to a fraction of their calendar year in `[0, 1)`, so a
//! leap day stretches the year instead of shifting every later date. The
//! distance to a solstice is the circular distance between two such fractions
//! and is reported in mean-year days.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

const MEAN_YEAR_DAYS: f64 = 365.2425;
const SOLSTICE_DAY: u32 = 21;
const SOLSTICE_HOUR_FRACTION: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    const fn month(self) -> u32 {
        match self {
            Season::Summer => 6,
            Season::Winter => 12,
        }
    }
}

/// Position of `ts` within its year as a fraction in `[0, 1)`.
pub fn year_fraction(ts: &NaiveDateTime) -> f64 {
    let day_index = f64::from(ts.ordinal0());
    let seconds = f64::from(ts.num_seconds_from_midnight()) + f64::from(ts.nanosecond()) * 1e-9;
    (day_index + seconds / 86_400.0) / days_in_year(ts.year())
}

/// Fraction of the year at noon on June 21 / December 21 of `year`.
fn solstice_fraction(year: i32, season: Season) -> f64 {
    let ordinal0 = NaiveDate::from_ymd_opt(year, season.month(), SOLSTICE_DAY)
        .map(|d| d.ordinal0())
        .unwrap_or(0);
    (f64::from(ordinal0) + SOLSTICE_HOUR_FRACTION) / days_in_year(year)
}

fn days_in_year(year: i32) -> f64 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366.0
    } else {
        365.0
    }
}

/// Circular distance, in days, from `ts` to the nearest occurrence of the given solstice.
pub fn solstice_distance_days(ts: &NaiveDateTime, season: Season) -> f64 {
    let f = year_fraction(ts);
    let s = solstice_fraction(ts.year(), season);
    let d = (f - s).abs();
    d.min(1.0 - d) * MEAN_YEAR_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn solstice_itself_has_zero_distance() {
        assert_approx_eq!(
            solstice_distance_days(&ts("2023-06-21 12:00:00"), Season::Summer),
            0.0,
            1e-9
        );
        assert_approx_eq!(
            solstice_distance_days(&ts("2024-12-21 12:00:00"), Season::Winter),
            0.0,
            1e-9
        );
    }

    #[test]
    fn wraps_around_new_year() {
        // Jan 1 is 11.5 days after the previous winter solstice, not ~354 before the next.
        let d = solstice_distance_days(&ts("2023-01-01 00:00:00"), Season::Winter);
        assert!(d > 10.0 && d < 13.0, "got {d}");
    }

    #[test]
    fn opposite_solstice_is_about_half_a_year_away() {
        let d = solstice_distance_days(&ts("2023-06-21 12:00:00"), Season::Winter);
        assert!((d - MEAN_YEAR_DAYS / 2.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_is_continuous_across_years() {
        let late = solstice_distance_days(&ts("2022-12-31 23:59:59"), Season::Summer);
        let early = solstice_distance_days(&ts("2023-01-01 00:00:00"), Season::Summer);
        assert!((late - early).abs() < 0.01, "late={late} early={early}");
    }

    #[test]
    fn ordering_matches_calendar_proximity() {
        let oct = solstice_distance_days(&ts("2023-10-06 09:57:10"), Season::Winter);
        let sep = solstice_distance_days(&ts("2023-09-26 10:16:52"), Season::Winter);
        let jan = solstice_distance_days(&ts("2022-01-18 13:44:45"), Season::Winter);
        assert!(jan < oct && oct < sep);
    }
}
