use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ParseError;

/// Day of a scheduling week. Serialized everywhere (API, views, thread state)
/// as the 3-letter upper-case code, MON through SUN.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Mon => "MON",
            Weekday::Tue => "TUE",
            Weekday::Wed => "WED",
            Weekday::Thu => "THU",
            Weekday::Fri => "FRI",
            Weekday::Sat => "SAT",
            Weekday::Sun => "SUN",
        }
    }

    /// English full name, for rendered replies.
    pub fn full_name(self) -> &'static str {
        match self {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

impl FromStr for Weekday {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MON" => Ok(Weekday::Mon),
            "TUE" => Ok(Weekday::Tue),
            "WED" => Ok(Weekday::Wed),
            "THU" => Ok(Weekday::Thu),
            "FRI" => Ok(Weekday::Fri),
            "SAT" => Ok(Weekday::Sat),
            "SUN" => Ok(Weekday::Sun),
            other => Err(ParseError::InvalidWeekday(other.to_string())),
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_case_insensitively() {
        for day in Weekday::ALL {
            assert_eq!(day.as_str().parse::<Weekday>().expect("code parses"), day);
            assert_eq!(
                day.as_str().to_lowercase().parse::<Weekday>().expect("lowercase parses"),
                day
            );
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = "FRY".parse::<Weekday>().expect_err("not a weekday");
        assert_eq!(err, ParseError::InvalidWeekday("FRY".to_string()));
    }

    #[test]
    fn days_order_mon_to_sun() {
        assert!(Weekday::Mon < Weekday::Fri);
        assert!(Weekday::Fri < Weekday::Sun);
    }

    #[test]
    fn serde_uses_upper_case_codes() {
        let json = serde_json::to_string(&Weekday::Fri).expect("serializes");
        assert_eq!(json, "\"FRI\"");
        let back: Weekday = serde_json::from_str("\"SAT\"").expect("deserializes");
        assert_eq!(back, Weekday::Sat);
    }
}
