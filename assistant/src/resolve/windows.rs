//! Time-window detection: explicit clock ranges ("17:00-21:00", "5-9pm",
//! "van 9 tot 17", "de 17h a 21h") and named dayparts ("friday evening",
//! "vrijdagavond", "vendredi soir"). All matching runs on normalized text.

use std::sync::LazyLock;

use regex::Regex;

use rota_core::time::{MINUTES_PER_DAY, TimeWindow};

use crate::text::{normalize, tokenize};

pub const MORNING: TimeWindow = TimeWindow { start_minute: 480, end_minute: 720 };
pub const MIDDAY: TimeWindow = TimeWindow { start_minute: 660, end_minute: 840 };
pub const AFTERNOON: TimeWindow = TimeWindow { start_minute: 720, end_minute: 1020 };
pub const EVENING: TimeWindow = TimeWindow { start_minute: 1020, end_minute: 1260 };
pub const NIGHT: TimeWindow = TimeWindow { start_minute: 1260, end_minute: MINUTES_PER_DAY };

/// Whole-token daypart vocabulary, normalized. Flemish "voormiddag" is the
/// morning and "namiddag" the afternoon; bare "middag" maps to midday.
const DAYPART_FORMS: [(&str, TimeWindow); 18] = [
    ("morning", MORNING),
    ("ochtend", MORNING),
    ("voormiddag", MORNING),
    ("matin", MORNING),
    ("matinee", MORNING),
    ("midday", MIDDAY),
    ("noon", MIDDAY),
    ("middag", MIDDAY),
    ("midi", MIDDAY),
    ("afternoon", AFTERNOON),
    ("namiddag", AFTERNOON),
    ("evening", EVENING),
    ("avond", EVENING),
    ("soir", EVENING),
    ("soiree", EVENING),
    ("night", NIGHT),
    ("nacht", NIGHT),
    ("nuit", NIGHT),
];

/// Dutch compounds glue the daypart onto the day ("vrijdagavond"). Longest
/// suffix first so "namiddag" wins over its own tail "middag".
const COMPOUND_SUFFIXES: [(&str, TimeWindow); 6] = [
    ("voormiddag", MORNING),
    ("namiddag", AFTERNOON),
    ("ochtend", MORNING),
    ("middag", MIDDAY),
    ("avond", EVENING),
    ("nacht", NIGHT),
];

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(\d{1,2}(?:[:hu]\d{2})?\s*[hu]?(?:\s*(?:am|pm))?)\s*(?:-|\bto\b|\btot\b|\ba\b|\bau\b|\buntil\b)\s*(\d{1,2}(?:[:hu]\d{2})?\s*[hu]?(?:\s*(?:am|pm))?)\b",
    )
    .expect("valid range regex")
});

static BETWEEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:between|tussen|entre)\s+(\d{1,2}(?:[:hu]\d{2})?\s*[hu]?(?:\s*(?:am|pm))?)\s+(?:and|en|et)\s+(\d{1,2}(?:[:hu]\d{2})?\s*[hu]?(?:\s*(?:am|pm))?)\b",
    )
    .expect("valid between regex")
});

static SIDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:[:hu](\d{2}))?\s*(am|pm|h|u)?$").expect("valid side regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy)]
struct ClockSide {
    hour: i32,
    minute: i32,
    meridiem: Option<Meridiem>,
}

impl ClockSide {
    fn parse(text: &str) -> Option<Self> {
        let captures = SIDE_RE.captures(text.trim())?;
        let hour: i32 = captures.get(1)?.as_str().parse().ok()?;
        let minute: i32 = captures
            .get(2)
            .map(|m| m.as_str().parse())
            .transpose()
            .ok()?
            .unwrap_or(0);
        if hour > 24 || minute > 59 {
            return None;
        }
        let meridiem = match captures.get(3).map(|m| m.as_str()) {
            Some("am") => Some(Meridiem::Am),
            Some("pm") => Some(Meridiem::Pm),
            // "h"/"u" mark an explicit 24-hour reading; no meridiem to apply.
            _ => None,
        };
        Some(Self { hour, minute, meridiem })
    }

    fn minutes(&self, meridiem: Option<Meridiem>) -> i32 {
        let hour = match meridiem {
            Some(Meridiem::Am) => self.hour % 12,
            Some(Meridiem::Pm) => (self.hour % 12) + 12,
            None => self.hour,
        };
        hour * 60 + self.minute
    }
}

/// Parses an explicit clock range out of free text, if one is present.
/// A lone meridiem is inherited by the unmarked side when that still yields
/// a forward-running window ("5-9pm" means 17:00-21:00, "11-2pm" does not
/// become 23:00-14:00).
pub fn parse_range(text: &str) -> Option<TimeWindow> {
    let folded = normalize(text);
    let (left, right) = BETWEEN_RE
        .captures(&folded)
        .or_else(|| RANGE_RE.captures(&folded))
        .and_then(|captures| {
            Some((
                captures.get(1)?.as_str().to_owned(),
                captures.get(2)?.as_str().to_owned(),
            ))
        })?;
    let left = ClockSide::parse(&left)?;
    let right = ClockSide::parse(&right)?;
    combine_sides(left, right)
}

fn combine_sides(left: ClockSide, right: ClockSide) -> Option<TimeWindow> {
    let inherited = left.meridiem.or(right.meridiem);
    let left_candidates = candidate_minutes(left, inherited);
    let right_candidates = candidate_minutes(right, inherited);
    for &start in &left_candidates {
        for &end in &right_candidates {
            if let Ok(window) = TimeWindow::new(start, end) {
                return Some(window);
            }
        }
    }
    None
}

fn candidate_minutes(side: ClockSide, inherited: Option<Meridiem>) -> Vec<i32> {
    let mut candidates = Vec::with_capacity(2);
    if side.meridiem.is_some() {
        candidates.push(side.minutes(side.meridiem));
    } else {
        // Prefer the inherited reading, fall back to the literal 24h one.
        if inherited.is_some() {
            candidates.push(side.minutes(inherited));
        }
        let literal = side.minutes(None);
        if !candidates.contains(&literal) {
            candidates.push(literal);
        }
    }
    candidates.retain(|&m| (0..=MINUTES_PER_DAY).contains(&m));
    candidates
}

/// Finds a named daypart in the message, including Dutch day+part compounds.
pub fn find_daypart(text: &str) -> Option<TimeWindow> {
    let folded = normalize(text);
    let tokens = tokenize(&folded);

    // "apres midi" tokenizes into two words; the pair must be checked before
    // the bare-token scan or "midi" alone would claim it.
    if tokens
        .windows(2)
        .any(|pair| pair[0] == "apres" && pair[1] == "midi")
    {
        return Some(AFTERNOON);
    }

    for token in &tokens {
        if let Some((_, window)) = DAYPART_FORMS
            .iter()
            .find(|(form, _)| *form == token.as_str())
        {
            return Some(*window);
        }
        if let Some((_, window)) = COMPOUND_SUFFIXES
            .iter()
            .find(|(suffix, _)| token.len() > suffix.len() && token.ends_with(suffix))
        {
            return Some(*window);
        }
    }
    None
}

/// Full window resolution: an explicit clock range wins over a daypart.
pub fn find_window(text: &str) -> Option<TimeWindow> {
    parse_range(text).or_else(|| find_daypart(text))
}
