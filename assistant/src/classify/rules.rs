//! Deterministic intent classification. Ordered pattern rules over
//! normalized text; the first rule that fires wins, and every branch only
//! attaches the entities its intent actually consumes. Messages come in
//! English, Dutch or French, often mixed.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use rota_core::intent::{Confidence, ExtractedIntent, Intent, WeekRef};
use rota_core::scope::ScopeMode;
use rota_core::IsoWeek;

use crate::classify::IntentClassifier;
use crate::resolve::{days, windows};
use crate::text::{normalize, tokenize};

static ALL_STORES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:all (?:my |our )?(?:stores|shops|locations)|every store|both stores|alle (?:mijn |onze )?winkels|tous (?:mes|les) magasins|toutes (?:mes|les) boutiques)\b")
        .expect("valid all-stores regex")
});

static HOME_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:only (?:this|my) store|(?:this|my) store only|just (?:this|my) store|alleen (?:deze|mijn) winkel|enkel (?:deze|mijn) winkel|seulement (?:ce|mon) magasin|uniquement (?:ce|mon) magasin|que (?:ce|mon) magasin)\b")
        .expect("valid home-only regex")
});

static COMPARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:compare[ds]?|comparison|vergelijk\w*|vergeleken|compar\w+|vs|versus)\b")
        .expect("valid compare regex")
});

static WEEK_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:week|weeks|weken|semaine|semaines)\b").expect("valid week-word regex")
});

static SUGGEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:suggest\w*|recommend\w*|who (?:can|could|should) (?:\w+ ){0,3}?(?:work|cover|fill|take|come)|anyone (?:available )?(?:to|who can) (?:work|cover)|wie kan (?:er )?(?:\w+ ){0,3}?(?:werken|invallen|overnemen|bijspringen|komen)|wie zou (?:er )?kunnen|qui (?:peut|pourrait) (?:\w+ ){0,3}?(?:travailler|couvrir|prendre|remplacer|venir))\b")
        .expect("valid suggest regex")
});

static SUPERLATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:biggest|largest|worst|most|grootste|ergste|le plus grand|la plus grande|pire)\b")
        .expect("valid superlative regex")
});

static GAP_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:gap|gaps|unfilled|uncovered|understaffed|open shifts?|open slots?|niet ingevuld|onbezet|onderbezet|open diensten?|gat|gaten|tekort\w*|trou|trous|non couverts?|postes? ouverts?|decouverts?|sous effectif)\b")
        .expect("valid gap-word regex")
});

static UNDER_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:under|below|onder|sous|en dessous)\b.*\b(?:target|goal|contract\w*|doel\w*|objectif|quota)\b|\b(?:uren tekort|te weinig uren|not enough hours|short on hours|pas assez d.heures)\b")
        .expect("valid under-target regex")
});

static OVER_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:over|above|boven|au dessus|depasse\w*)\b.*\b(?:target|goal|contract\w*|doel\w*|objectif|quota)\b|\b(?:te veel uren|too many hours|trop d.heures|overtime|overuren)\b")
        .expect("valid over-target regex")
});

static TOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btop\s*(\d{1,2})\b").expect("valid top regex"));

static MOST_HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:most|meeste|le plus)\b.*\b(?:hours?|uren|uur|heures?)\b|\b(?:hours?|uren|uur|heures?)\b.*\b(?:most|meeste|le plus)\b")
        .expect("valid most-hours regex")
});

static AVAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:availab\w+|free|beschikbaar\w*|vrij|vrije|disponib\w+|libres?)\b")
        .expect("valid availability regex")
});

static WHO_WORKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:who(?:'s| is)? (?:work(?:s|ing)?|scheduled|in|on (?:the )?(?:floor|shift))|wie werkt|wie staat er|qui travaille|qui est de service)\b")
        .expect("valid who-works regex")
});

static WHICH_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:which|how many|welke|hoeveel|combien de|quel(?:le)?s?)\s+([a-z]+)\s+(?:work(?:s|ing)?|are working|werken|werkt|travaillent)\b")
        .expect("valid which-role regex")
});

static SCHEDULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:schedule[ds]?|shifts?|rooster|werkrooster|uurrooster|planning|horaires?)\b")
        .expect("valid schedule regex")
});

static WHEN_DOES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:when|wanneer|quand)\s+(?:does|do|is|werkt|travaille)\s+([a-z][a-z'\- ]{1,40})")
        .expect("valid when-does regex")
});

static HOURS_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:hours?|uren|uur|heures?)\b").expect("valid hours-word regex")
});

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]{2,40})""#).expect("valid quoted regex"));

static POSSESSIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-z][a-z\-]+)'s\s+(?:schedule|shifts?|hours|availability|rooster|planning)")
        .expect("valid possessive regex")
});

static DOES_HAVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:does|did|heeft)\s+([a-z][a-z'\- ]{1,40})").expect("valid does-have regex")
});

static IS_AVAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:is|est)\s+([a-z][a-z'\- ]{1,40}?)\s+(?:available|free|beschikbaar|vrij|disponible|libre)\b")
        .expect("valid is-available regex")
});

static FR_AVAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z][a-z'\- ]{1,40}?)\s+est\s+(?:disponible|libre)\b")
        .expect("valid french-availability regex")
});

static CAN_WORK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:can|kan|peut)\s+([a-z][a-z'\- ]{1,40}?)\s+(?:work|cover|come|werken|invallen|travailler|venir)\b")
        .expect("valid can-work regex")
});

static FOR_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:for|of|voor|van|pour|de|du)\s+([a-z][a-z'\- ]{1,40})")
        .expect("valid for-name regex")
});

static AS_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:as|als|comme|en tant qu[e']?)\s+(?:a |an |the |een |une? |le |la )?([a-z][a-z'\- ]{1,30})")
        .expect("valid as-role regex")
});

static EXPLICIT_WEEK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})\s*-?\s*w\s*(\d{1,2})\b").expect("valid explicit-week regex")
});

static LAST_WEEK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:last|past|previous|vorige|afgelopen|verleden)\s+week\b|\bsemaine (?:derniere|passee|precedente)\b")
        .expect("valid last-week regex")
});

static NEXT_WEEK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:next|volgende|komende)\s+week\b|\bsemaine prochaine\b")
        .expect("valid next-week regex")
});

/// Mention prefixes that are grammar, not name parts; dropped before
/// matching. Mid-mention particles ("Anna De Vos") are kept.
const LEADING_JUNK: [&str; 14] = [
    "the", "a", "an", "de", "het", "een", "la", "le", "les", "une", "un", "er", "iemand", "mr",
];

/// Tokens that end an employee or role mention: time words, verbs from the
/// trigger patterns, and query vocabulary that only shows up past the name.
const STOP_TOKENS: [&str; 52] = [
    "this", "last", "next", "deze", "vorige", "volgende", "komende", "cette", "semaine", "week",
    "weken", "weeks", "semaines", "on", "op", "om", "at", "in", "from", "tot", "until", "and",
    "work", "works", "working", "worked", "werken", "werkt", "gewerkt", "invallen", "overnemen",
    "bijspringen", "travailler", "travaille", "couvrir", "remplacer", "venir", "have", "has",
    "hours", "uren", "uur", "heures", "morning", "afternoon", "evening", "night", "available",
    "free", "beschikbaar", "disponible", "well",
]; // day names stop a mention too, via the day parser

/// Question words that sometimes land in a capture group; never a name.
const NON_NAMES: [&str; 10] = [
    "who", "wie", "qui", "anyone", "someone", "everyone", "iedereen", "quelqu", "personne", "que",
];

/// Short acknowledgements that should not be mistaken for a name fragment.
const JUNK_MESSAGES: [&str; 14] = [
    "ok", "okay", "yes", "no", "ja", "nee", "oui", "non", "merci", "thanks", "bedankt", "hello",
    "hi", "hey",
];

const MAX_FRAGMENT_TOKENS: usize = 3;

/// The deterministic classifier. Stateless; safe to share.
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        RuleClassifier
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntentClassifier for RuleClassifier {
    async fn classify(&self, message: &str) -> ExtractedIntent {
        classify_message(message)
    }
}

/// Runs the rule chain over one message. Pure and synchronous so tests can
/// call it directly.
pub fn classify_message(message: &str) -> ExtractedIntent {
    let folded = normalize(message);
    if folded.is_empty() {
        return ExtractedIntent::unknown();
    }

    let day = days::find_day(&folded);
    let window = windows::find_window(&folded);
    let week = find_week_ref(&folded);
    let employee = capture_employee(&folded);
    let work_type = capture_work_type(&folded);
    let top_n = capture_top_n(&folded);

    if let Some(mode) = detect_scope_change(&folded) {
        let mut extracted = ExtractedIntent::new(Intent::ScopeChange, Confidence::High);
        extracted.scope_mode = Some(mode);
        return extracted;
    }

    if COMPARE_RE.is_match(&folded) && WEEK_WORD_RE.is_match(&folded) {
        let mut extracted = ExtractedIntent::new(Intent::CompareWeeks, Confidence::High);
        // Relative phrases inside a comparison ("this vs last") are the
        // comparison itself; only an explicit week moves the anchor.
        extracted.week = Some(explicit_week(&folded).map(WeekRef::Explicit).unwrap_or(WeekRef::This));
        return extracted;
    }

    if SUGGEST_RE.is_match(&folded) {
        let confidence = if day.is_some() { Confidence::High } else { Confidence::Medium };
        let mut extracted = ExtractedIntent::new(Intent::SuggestCoverage, confidence);
        extracted.day = day;
        extracted.window = window;
        extracted.week = week;
        extracted.work_type_text = work_type;
        extracted.top_n = top_n;
        return extracted;
    }

    if SUPERLATIVE_RE.is_match(&folded) && GAP_WORD_RE.is_match(&folded) {
        let mut extracted = ExtractedIntent::new(Intent::BiggestGap, Confidence::High);
        extracted.week = week;
        return extracted;
    }

    if UNDER_TARGET_RE.is_match(&folded) {
        let mut extracted = ExtractedIntent::new(Intent::HoursUnderTarget, Confidence::High);
        extracted.week = week;
        return extracted;
    }

    if OVER_TARGET_RE.is_match(&folded) {
        let mut extracted = ExtractedIntent::new(Intent::HoursOverTarget, Confidence::High);
        extracted.week = week;
        return extracted;
    }

    if GAP_WORD_RE.is_match(&folded) {
        let mut extracted = ExtractedIntent::new(Intent::CoverageGaps, Confidence::High);
        extracted.day = day;
        extracted.week = week;
        return extracted;
    }

    if top_n.is_some() || MOST_HOURS_RE.is_match(&folded) {
        let mut extracted = ExtractedIntent::new(Intent::HoursTopN, Confidence::High);
        extracted.top_n = top_n;
        extracted.week = week;
        return extracted;
    }

    let availability = AVAIL_RE.is_match(&folded) || CAN_WORK_RE.is_match(&folded);
    if availability && employee.is_some() {
        let mut extracted = ExtractedIntent::new(Intent::AvailabilityForEmployee, Confidence::High);
        extracted.employee_text = employee;
        extracted.day = day;
        extracted.window = window;
        extracted.week = week;
        return extracted;
    }

    if availability {
        let confidence = if day.is_some() { Confidence::High } else { Confidence::Medium };
        let mut extracted = ExtractedIntent::new(Intent::AvailabilityOnDay, confidence);
        extracted.day = day;
        extracted.window = window;
        extracted.week = week;
        return extracted;
    }

    if WHO_WORKS_RE.is_match(&folded) || WHICH_ROLE_RE.is_match(&folded) {
        let confidence = if day.is_some() { Confidence::High } else { Confidence::Medium };
        let mut extracted = ExtractedIntent::new(Intent::WhoWorksOnDay, confidence);
        extracted.day = day;
        extracted.week = week;
        extracted.work_type_text = work_type;
        return extracted;
    }

    if employee.is_some() && (SCHEDULE_RE.is_match(&folded) || WHEN_DOES_RE.is_match(&folded)) {
        let mut extracted = ExtractedIntent::new(Intent::ScheduleForEmployee, Confidence::High);
        extracted.employee_text = employee;
        extracted.week = week;
        return extracted;
    }

    if employee.is_some() && HOURS_WORD_RE.is_match(&folded) {
        let mut extracted = ExtractedIntent::new(Intent::HoursForEmployee, Confidence::High);
        extracted.employee_text = employee;
        extracted.week = week;
        return extracted;
    }

    classify_fragment(&folded, day, window).unwrap_or_else(ExtractedIntent::unknown)
}

/// A terse follow-up: a bare day ("friday") or a bare name ("Bob Smith").
/// Either way the turn itself cannot run anything; the orchestrator decides
/// whether a pending clarification can absorb it.
fn classify_fragment(
    folded: &str,
    day: Option<rota_core::Weekday>,
    window: Option<rota_core::TimeWindow>,
) -> Option<ExtractedIntent> {
    let tokens = tokenize(folded);
    if tokens.is_empty() || tokens.len() > MAX_FRAGMENT_TOKENS {
        return None;
    }
    if tokens.iter().any(|token| JUNK_MESSAGES.contains(&token.as_str())) {
        return None;
    }

    if let Some(answer_day) = days::parse_day_answer(folded) {
        let mut extracted = ExtractedIntent::new(Intent::Clarify, Confidence::Medium);
        extracted.day = Some(answer_day);
        extracted.window = window;
        return Some(extracted);
    }

    let name_like = tokens.iter().all(|token| {
        token.chars().all(|c| c.is_alphabetic() || c == '\'' || c == '-')
            && !STOP_TOKENS.contains(&token.as_str())
            && !NON_NAMES.contains(&token.as_str())
    });
    if name_like && day.is_none() {
        let mut extracted = ExtractedIntent::new(Intent::Clarify, Confidence::Medium);
        extracted.employee_text = Some(folded.trim_end_matches(['?', '.', '!']).trim().to_owned());
        return Some(extracted);
    }
    None
}

fn detect_scope_change(folded: &str) -> Option<ScopeMode> {
    if HOME_ONLY_RE.is_match(folded) {
        return Some(ScopeMode::HomeOnly);
    }
    if ALL_STORES_RE.is_match(folded) {
        return Some(ScopeMode::AllManaged);
    }
    None
}

fn find_week_ref(folded: &str) -> Option<WeekRef> {
    if let Some(week) = explicit_week(folded) {
        return Some(WeekRef::Explicit(week));
    }
    if LAST_WEEK_RE.is_match(folded) {
        return Some(WeekRef::Last);
    }
    if NEXT_WEEK_RE.is_match(folded) {
        return Some(WeekRef::Next);
    }
    // "this week" is the default anyway; only mark it when said out loud.
    if folded.contains("this week")
        || folded.contains("deze week")
        || folded.contains("cette semaine")
    {
        return Some(WeekRef::This);
    }
    None
}

fn explicit_week(folded: &str) -> Option<IsoWeek> {
    let captures = EXPLICIT_WEEK_RE.captures(folded)?;
    let year: i32 = captures.get(1)?.as_str().parse().ok()?;
    let week: u32 = captures.get(2)?.as_str().parse().ok()?;
    IsoWeek::new(year, week).ok()
}

fn capture_top_n(folded: &str) -> Option<u32> {
    TOP_RE
        .captures(folded)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|n| *n > 0)
}

fn capture_employee(folded: &str) -> Option<String> {
    let patterns: [&Regex; 7] = [
        &QUOTED_RE,
        &POSSESSIVE_RE,
        &WHEN_DOES_RE,
        &DOES_HAVE_RE,
        &IS_AVAIL_RE,
        &FR_AVAIL_RE,
        &CAN_WORK_RE,
    ];
    for pattern in patterns {
        if let Some(mention) = first_group(pattern, folded).and_then(|raw| trim_mention(&raw)) {
            return Some(mention);
        }
    }
    first_group(&FOR_NAME_RE, folded).and_then(|raw| trim_mention(&raw))
}

fn capture_work_type(folded: &str) -> Option<String> {
    first_group(&AS_ROLE_RE, folded)
        .or_else(|| first_group(&WHICH_ROLE_RE, folded))
        .and_then(|raw| trim_mention(&raw))
}

fn first_group(pattern: &Regex, folded: &str) -> Option<String> {
    pattern
        .captures(folded)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Cuts a raw capture down to the mention itself: leading articles go, and
/// the first time or verb token ends it. Returns `None` when nothing is left
/// or the remainder is a question word.
fn trim_mention(raw: &str) -> Option<String> {
    let tokens = tokenize(raw);
    let mut index = 0;
    while index < tokens.len() && LEADING_JUNK.contains(&tokens[index].as_str()) {
        index += 1;
    }
    let mut kept: Vec<&str> = Vec::new();
    for token in &tokens[index..] {
        if STOP_TOKENS.contains(&token.as_str()) || days::parse_day_token(token).is_some() {
            break;
        }
        kept.push(token.as_str());
    }
    if kept.is_empty() || kept.iter().any(|token| NON_NAMES.contains(token)) {
        return None;
    }
    Some(kept.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::Weekday;

    #[test]
    fn availability_question_extracts_day_and_window() {
        let extracted = classify_message("Who is available Friday morning?");
        assert_eq!(extracted.intent, Intent::AvailabilityOnDay);
        assert_eq!(extracted.confidence, Confidence::High);
        assert_eq!(extracted.day, Some(Weekday::Fri));
        assert_eq!(extracted.window, Some(windows::MORNING));
        assert!(extracted.employee_text.is_none());
    }

    #[test]
    fn named_availability_goes_to_the_employee_variant() {
        let extracted = classify_message("Is Bob free on Friday?");
        assert_eq!(extracted.intent, Intent::AvailabilityForEmployee);
        assert_eq!(extracted.employee_text.as_deref(), Some("bob"));
        assert_eq!(extracted.day, Some(Weekday::Fri));
    }

    #[test]
    fn hours_for_a_named_employee() {
        let extracted = classify_message("How many hours does Bob have this week?");
        assert_eq!(extracted.intent, Intent::HoursForEmployee);
        assert_eq!(extracted.employee_text.as_deref(), Some("bob"));
    }

    #[test]
    fn hours_question_keeps_week_reference() {
        let extracted = classify_message("hours for Anna last week");
        assert_eq!(extracted.intent, Intent::HoursForEmployee);
        assert_eq!(extracted.employee_text.as_deref(), Some("anna"));
        assert_eq!(extracted.week, Some(WeekRef::Last));
    }

    #[test]
    fn dutch_cover_request_with_role() {
        let extracted = classify_message("Wie kan er vrijdagavond invallen als Kassier?");
        assert_eq!(extracted.intent, Intent::SuggestCoverage);
        assert_eq!(extracted.day, Some(Weekday::Fri));
        assert_eq!(extracted.window, Some(windows::EVENING));
        assert_eq!(extracted.work_type_text.as_deref(), Some("kassier"));
    }

    #[test]
    fn french_cover_request() {
        let extracted = classify_message("Qui peut travailler vendredi soir ?");
        assert_eq!(extracted.intent, Intent::SuggestCoverage);
        assert_eq!(extracted.day, Some(Weekday::Fri));
        assert_eq!(extracted.window, Some(windows::EVENING));
    }

    #[test]
    fn compare_is_anchored_to_the_current_week() {
        let extracted = classify_message("Compare this week with last week");
        assert_eq!(extracted.intent, Intent::CompareWeeks);
        assert_eq!(extracted.week, Some(WeekRef::This));
    }

    #[test]
    fn explicit_week_moves_the_compare_anchor() {
        let extracted = classify_message("compare week 2025-W41 with the week before");
        assert_eq!(extracted.intent, Intent::CompareWeeks);
        match extracted.week {
            Some(WeekRef::Explicit(week)) => assert_eq!(week.to_string(), "2025-W41"),
            other => panic!("expected explicit week, got {other:?}"),
        }
    }

    #[test]
    fn top_n_with_count() {
        let extracted = classify_message("top 3 by hours");
        assert_eq!(extracted.intent, Intent::HoursTopN);
        assert_eq!(extracted.top_n, Some(3));
    }

    #[test]
    fn most_hours_without_count_is_still_top_n() {
        let extracted = classify_message("who has the most hours this week?");
        assert_eq!(extracted.intent, Intent::HoursTopN);
        assert_eq!(extracted.top_n, None);
    }

    #[test]
    fn under_target_in_dutch() {
        let extracted = classify_message("wie zit er onder zijn doeluren?");
        assert_eq!(extracted.intent, Intent::HoursUnderTarget);
    }

    #[test]
    fn overtime_word_maps_to_over_target() {
        let extracted = classify_message("who has overtime?");
        assert_eq!(extracted.intent, Intent::HoursOverTarget);
    }

    #[test]
    fn gaps_with_a_day() {
        let extracted = classify_message("any gaps on Monday?");
        assert_eq!(extracted.intent, Intent::CoverageGaps);
        assert_eq!(extracted.day, Some(Weekday::Mon));
    }

    #[test]
    fn biggest_gap_beats_plain_gaps() {
        let extracted = classify_message("where is the biggest gap this week?");
        assert_eq!(extracted.intent, Intent::BiggestGap);
    }

    #[test]
    fn who_works_never_captures_a_phantom_employee() {
        let extracted = classify_message("who works on friday for the bakery team?");
        assert_eq!(extracted.intent, Intent::WhoWorksOnDay);
        assert_eq!(extracted.day, Some(Weekday::Fri));
        assert!(extracted.employee_text.is_none());
    }

    #[test]
    fn schedule_via_possessive() {
        let extracted = classify_message("show me Anna's schedule");
        assert_eq!(extracted.intent, Intent::ScheduleForEmployee);
        assert_eq!(extracted.employee_text.as_deref(), Some("anna"));
    }

    #[test]
    fn when_does_phrasing_is_a_schedule_question() {
        let extracted = classify_message("when does Bob work next week?");
        assert_eq!(extracted.intent, Intent::ScheduleForEmployee);
        assert_eq!(extracted.employee_text.as_deref(), Some("bob"));
        assert_eq!(extracted.week, Some(WeekRef::Next));
    }

    #[test]
    fn scope_change_to_all_stores() {
        let extracted = classify_message("look at all my stores please");
        assert_eq!(extracted.intent, Intent::ScopeChange);
        assert_eq!(extracted.scope_mode, Some(ScopeMode::AllManaged));
    }

    #[test]
    fn scope_change_back_to_one_store() {
        let extracted = classify_message("only this store");
        assert_eq!(extracted.intent, Intent::ScopeChange);
        assert_eq!(extracted.scope_mode, Some(ScopeMode::HomeOnly));
    }

    #[test]
    fn bare_day_is_a_clarify_fragment() {
        let extracted = classify_message("friday");
        assert_eq!(extracted.intent, Intent::Clarify);
        assert_eq!(extracted.day, Some(Weekday::Fri));
    }

    #[test]
    fn bare_name_is_a_clarify_fragment() {
        let extracted = classify_message("Bob Smith");
        assert_eq!(extracted.intent, Intent::Clarify);
        assert_eq!(extracted.employee_text.as_deref(), Some("bob smith"));
    }

    #[test]
    fn gibberish_is_unknown() {
        let extracted = classify_message("qqqq zzzz flurble wibble wobble");
        assert_eq!(extracted.intent, Intent::Unknown);
        assert_eq!(extracted.confidence, Confidence::Low);
    }

    #[test]
    fn acknowledgements_are_not_names() {
        assert_eq!(classify_message("ok").intent, Intent::Unknown);
        assert_eq!(classify_message("merci").intent, Intent::Unknown);
    }
}
