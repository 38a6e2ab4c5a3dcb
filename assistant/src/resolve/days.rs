//! Weekday detection in free text. Managers write day names in English,
//! Dutch or French, abbreviated or glued into compounds ("vrijdagavond").

use rota_core::Weekday;

use crate::text::{normalize, tokenize};

/// Every accepted spelling, normalized (lowercase, no accents). Short forms
/// are only honored by [`parse_day_token`], where the whole answer is the
/// token; free-text scanning skips entries under three characters so Dutch
/// "ma" or "do" inside a sentence never resolve to a day.
const DAY_FORMS: [(&str, Weekday); 49] = [
    ("mon", Weekday::Mon),
    ("monday", Weekday::Mon),
    ("ma", Weekday::Mon),
    ("maandag", Weekday::Mon),
    ("lun", Weekday::Mon),
    ("lundi", Weekday::Mon),
    ("tue", Weekday::Tue),
    ("tues", Weekday::Tue),
    ("tuesday", Weekday::Tue),
    ("di", Weekday::Tue),
    ("dinsdag", Weekday::Tue),
    ("mar", Weekday::Tue),
    ("mardi", Weekday::Tue),
    ("wed", Weekday::Wed),
    ("wednesday", Weekday::Wed),
    ("wo", Weekday::Wed),
    ("woe", Weekday::Wed),
    ("woensdag", Weekday::Wed),
    ("mer", Weekday::Wed),
    ("mercredi", Weekday::Wed),
    ("thu", Weekday::Thu),
    ("thur", Weekday::Thu),
    ("thurs", Weekday::Thu),
    ("thursday", Weekday::Thu),
    ("do", Weekday::Thu),
    ("don", Weekday::Thu),
    ("donderdag", Weekday::Thu),
    ("jeu", Weekday::Thu),
    ("jeudi", Weekday::Thu),
    ("fri", Weekday::Fri),
    ("friday", Weekday::Fri),
    ("vr", Weekday::Fri),
    ("vrij", Weekday::Fri),
    ("vrijdag", Weekday::Fri),
    ("ven", Weekday::Fri),
    ("vendredi", Weekday::Fri),
    ("sat", Weekday::Sat),
    ("saturday", Weekday::Sat),
    ("za", Weekday::Sat),
    ("zat", Weekday::Sat),
    ("zaterdag", Weekday::Sat),
    ("sam", Weekday::Sat),
    ("samedi", Weekday::Sat),
    ("sun", Weekday::Sun),
    ("sunday", Weekday::Sun),
    ("zo", Weekday::Sun),
    ("zon", Weekday::Sun),
    ("zondag", Weekday::Sun),
    ("dimanche", Weekday::Sun),
];

/// Full names eligible for compound-prefix matching, so Dutch glued forms
/// like "vrijdagavond" or English plurals like "fridays" still resolve.
const COMPOUND_PREFIXES: [(&str, Weekday); 21] = [
    ("monday", Weekday::Mon),
    ("maandag", Weekday::Mon),
    ("lundi", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("dinsdag", Weekday::Tue),
    ("mardi", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("woensdag", Weekday::Wed),
    ("mercredi", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("donderdag", Weekday::Thu),
    ("jeudi", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("vrijdag", Weekday::Fri),
    ("vendredi", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("zaterdag", Weekday::Sat),
    ("samedi", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("zondag", Weekday::Sun),
    ("dimanche", Weekday::Sun),
];

const MIN_FREE_TEXT_LEN: usize = 3;

/// Abbreviations that collide with everyday words or first names ("mon
/// magasin", March, Sam, Don). Honored only when the day is the whole answer.
const AMBIGUOUS_IN_TEXT: [&str; 4] = ["mon", "mar", "sam", "don"];

/// Resolves one standalone token to a weekday. Accepts every listed form,
/// including the two-letter Dutch abbreviations.
pub fn parse_day_token(token: &str) -> Option<Weekday> {
    let folded = normalize(token);
    DAY_FORMS
        .iter()
        .find(|(form, _)| *form == folded)
        .map(|(_, day)| *day)
}

/// Scans a whole message for a weekday mention. First match wins.
pub fn find_day(text: &str) -> Option<Weekday> {
    let folded = normalize(text);
    for token in tokenize(&folded) {
        if let Some(day) = match_token(&token) {
            return Some(day);
        }
    }
    None
}

/// Interprets a clarification answer: a bare token is matched against the
/// full form table, anything longer falls back to a free-text scan.
pub fn parse_day_answer(message: &str) -> Option<Weekday> {
    let folded = normalize(message);
    let tokens = tokenize(&folded);
    match tokens.as_slice() {
        [single] => parse_day_token(single).or_else(|| match_token(single)),
        _ => find_day(message),
    }
}

fn match_token(token: &str) -> Option<Weekday> {
    if token.len() >= MIN_FREE_TEXT_LEN && !AMBIGUOUS_IN_TEXT.contains(&token) {
        if let Some((_, day)) = DAY_FORMS
            .iter()
            .filter(|(form, _)| form.len() >= MIN_FREE_TEXT_LEN)
            .find(|(form, _)| *form == token)
        {
            return Some(*day);
        }
    }
    COMPOUND_PREFIXES
        .iter()
        .find(|(prefix, _)| token.len() > prefix.len() && token.starts_with(prefix))
        .map(|(_, day)| *day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_abbreviated_tokens() {
        assert_eq!(parse_day_token("Friday"), Some(Weekday::Fri));
        assert_eq!(parse_day_token("vrijdag"), Some(Weekday::Fri));
        assert_eq!(parse_day_token("VEN"), Some(Weekday::Fri));
        assert_eq!(parse_day_token("di"), Some(Weekday::Tue));
        assert_eq!(parse_day_token("yesterday"), None);
    }

    #[test]
    fn finds_days_inside_sentences() {
        assert_eq!(find_day("who is available friday morning?"), Some(Weekday::Fri));
        assert_eq!(find_day("wie werkt er woensdag?"), Some(Weekday::Wed));
        assert_eq!(find_day("qui travaille mercredi ?"), Some(Weekday::Wed));
    }

    #[test]
    fn resolves_dutch_compounds_and_plurals() {
        assert_eq!(find_day("kan iemand vrijdagavond invallen?"), Some(Weekday::Fri));
        assert_eq!(find_day("we are short on saturdays"), Some(Weekday::Sat));
    }

    #[test]
    fn short_forms_never_fire_in_free_text() {
        // "ma" and "do" are everyday words in Dutch and English sentences.
        assert_eq!(find_day("ma vraag gaat over de planning"), None);
        assert_eq!(find_day("do we have enough staff"), None);
        assert_eq!(find_day("je cherche quelqu'un pour le soir"), None);
    }

    #[test]
    fn name_like_abbreviations_never_fire_in_free_text() {
        assert_eq!(find_day("hours for sam"), None);
        assert_eq!(find_day("mon magasin est ouvert"), None);
        assert_eq!(parse_day_answer("sam"), Some(Weekday::Sat));
    }

    #[test]
    fn clarification_answers_accept_short_forms() {
        assert_eq!(parse_day_answer("vr"), Some(Weekday::Fri));
        assert_eq!(parse_day_answer("on friday please"), Some(Weekday::Fri));
        assert_eq!(parse_day_answer("no idea"), None);
    }
}
