use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A scheduling period, keyed `YYYY-Www` (ISO 8601 week), e.g. `2025-W43`.
/// Weeks are calendar keys, not instants: there is no timezone attached, and
/// arithmetic goes through the Monday of the week.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct IsoWeek {
    year: i32,
    week: u32,
}

impl IsoWeek {
    pub fn new(year: i32, week: u32) -> Result<Self, ParseError> {
        // from_isoywd_opt rejects week 53 in 52-week years.
        if NaiveDate::from_isoywd_opt(year, week, chrono::Weekday::Mon).is_none() {
            return Err(ParseError::InvalidWeek(format!("{year}-W{week:02}")));
        }
        Ok(IsoWeek { year, week })
    }

    pub fn current() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        IsoWeek {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Monday of this week.
    pub fn monday(&self) -> NaiveDate {
        // Validated at construction, so this cannot fail.
        NaiveDate::from_isoywd_opt(self.year, self.week, chrono::Weekday::Mon)
            .unwrap_or_default()
    }

    /// The week `delta` weeks away; handles year boundaries.
    pub fn shift(&self, delta: i64) -> Self {
        Self::from_date(self.monday() + Duration::weeks(delta))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u32 {
        self.week
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

impl FromStr for IsoWeek {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ParseError::InvalidWeek(trimmed.to_string());

        let (year_part, week_part) = trimmed.split_once("-W").ok_or_else(invalid)?;
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let week: u32 = week_part.parse().map_err(|_| invalid())?;
        IsoWeek::new(year, week)
    }
}

impl TryFrom<String> for IsoWeek {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IsoWeek> for String {
    fn from(week: IsoWeek) -> Self {
        week.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_week_keys() {
        let week: IsoWeek = "2025-W43".parse().expect("valid week");
        assert_eq!(week.year(), 2025);
        assert_eq!(week.week(), 43);
        assert_eq!(week.to_string(), "2025-W43");

        let padded: IsoWeek = "2025-W03".parse().expect("valid week");
        assert_eq!(padded.to_string(), "2025-W03");
    }

    #[test]
    fn rejects_malformed_and_out_of_range_weeks() {
        "2025W43".parse::<IsoWeek>().expect_err("missing separator");
        "2025-W00".parse::<IsoWeek>().expect_err("week zero");
        "2025-W54".parse::<IsoWeek>().expect_err("week 54 never exists");
        // 2025 has 52 ISO weeks.
        "2025-W53".parse::<IsoWeek>().expect_err("no week 53 in 2025");
        // 2026 has 53.
        "2026-W53".parse::<IsoWeek>().expect("2026 has week 53");
        "banana".parse::<IsoWeek>().expect_err("not a week at all");
    }

    #[test]
    fn shift_crosses_year_boundaries() {
        let last_of_2025: IsoWeek = "2025-W52".parse().expect("valid week");
        assert_eq!(last_of_2025.shift(1).to_string(), "2026-W01");
        let first_of_2026: IsoWeek = "2026-W01".parse().expect("valid week");
        assert_eq!(first_of_2026.shift(-1).to_string(), "2025-W52");
        assert_eq!(first_of_2026.shift(0), first_of_2026);
    }

    #[test]
    fn serde_round_trips_as_string() {
        let week: IsoWeek = "2025-W43".parse().expect("valid week");
        let json = serde_json::to_string(&week).expect("serializes");
        assert_eq!(json, "\"2025-W43\"");
        let back: IsoWeek = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, week);
    }
}
