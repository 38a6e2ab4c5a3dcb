use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ParseError;

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Half-open interval of a single day, in minutes since midnight.
/// `08:00-12:00` is `{ start_minute: 480, end_minute: 720 }`. All shift and
/// availability data uses this representation, matching the scheduling views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeWindow {
    pub start_minute: i32,
    pub end_minute: i32,
}

impl TimeWindow {
    pub fn new(start_minute: i32, end_minute: i32) -> Result<Self, ParseError> {
        if start_minute < 0
            || end_minute > MINUTES_PER_DAY
            || start_minute >= end_minute
        {
            return Err(ParseError::InvalidWindow {
                start: start_minute,
                end: end_minute,
            });
        }
        Ok(TimeWindow {
            start_minute,
            end_minute,
        })
    }

    pub fn duration_minutes(&self) -> i32 {
        self.end_minute - self.start_minute
    }

    /// Minutes shared with `other`; zero when the windows do not touch.
    pub fn overlap_minutes(&self, other: &TimeWindow) -> i32 {
        let start = self.start_minute.max(other.start_minute);
        let end = self.end_minute.min(other.end_minute);
        (end - start).max(0)
    }

    /// True when `other` fits entirely inside this window.
    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.start_minute <= other.start_minute && other.end_minute <= self.end_minute
    }

    pub fn render(&self) -> String {
        format!(
            "{}-{}",
            render_clock(self.start_minute),
            render_clock(self.end_minute)
        )
    }
}

/// Minutes since midnight as `HH:MM`. 1440 renders as `24:00` (end of day).
pub fn render_clock(minute: i32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// A minute total as `32h00`, the product's convention for weekly hours.
pub fn render_duration(minutes: i32) -> String {
    format!("{}h{:02}", minutes / 60, (minutes % 60).abs())
}
