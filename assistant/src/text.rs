//! Shared text normalization for matching user input against stored names.
//! The deployment is trilingual (EN/NL/FR), so accent folding matters as
//! much as case folding: "Hélène" and "helene" must compare equal.

/// Collapse whitespace, lowercase, and strip diacritics.
pub fn normalize(value: &str) -> String {
    let collapsed = value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    fold_diacritics(&collapsed.to_lowercase())
}

/// Map accented Latin characters onto their base letter. Covers the accents
/// that actually occur in Belgian rosters; anything else passes through.
pub fn fold_diacritics(value: &str) -> String {
    value
        .chars()
        .map(|ch| match ch {
            'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ò' | 'ó' | 'ô' | 'ö' | 'õ' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            'ç' => 'c',
            'ñ' => 'n',
            'æ' => 'a',
            'œ' => 'o',
            other => other,
        })
        .collect()
}

/// Split normalized text into alphanumeric tokens.
pub fn tokenize(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in value.chars() {
        if ch.is_alphanumeric() {
            current.push(ch);
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_folds_accents() {
        assert_eq!(normalize("  Hélène   De Vos "), "helene de vos");
        assert_eq!(normalize("François"), "francois");
        assert_eq!(normalize("GÉRANT"), "gerant");
    }

    #[test]
    fn tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("who's free friday, 17:00-21:00?"),
            vec!["who", "s", "free", "friday", "17", "00", "21", "00"]
        );
    }
}
