//! Work-type (role) matching. Stores label the same job differently across
//! languages, so an alias table maps common synonyms onto each other. An
//! unresolved mention is carried through as raw text instead of failing the
//! turn; downstream filters then match it verbatim.

use crate::store::WorkTypeRecord;
use crate::text::normalize;

pub const SCORE_EXACT: i32 = 100;
pub const SCORE_ALIAS: i32 = 90;
pub const SCORE_SUBSTRING: i32 = 80;

/// Synonym groups, normalized. Membership of the same group counts as an
/// alias match in either direction.
const ALIAS_GROUPS: [&[&str]; 7] = [
    &["cashier", "kassa", "kassier", "kassierster", "caissier", "caissiere", "checkout"],
    &["stock", "magazijn", "magazijnier", "magasinier", "warehouse", "reserve", "rayon"],
    &["manager", "gerant", "gerante", "filiaalleider", "shift leader", "shiftleader"],
    &["bakery", "bakker", "bakkerij", "boulanger", "boulangere", "boulangerie"],
    &["butcher", "slager", "slagerij", "boucher", "bouchere", "boucherie"],
    &["cleaning", "schoonmaak", "onderhoud", "nettoyage", "entretien"],
    &["delivery", "levering", "bezorging", "livraison", "chauffeur", "driver"],
];

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWorkType {
    pub id: Option<String>,
    pub name: Option<String>,
    /// The manager's wording, kept for raw filtering when unresolved.
    pub raw_text: String,
}

impl ResolvedWorkType {
    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }

    /// The value downstream filters compare against.
    pub fn filter_text(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.raw_text)
    }
}

fn same_alias_group(a: &str, b: &str) -> bool {
    ALIAS_GROUPS
        .iter()
        .any(|group| group.contains(&a) && group.contains(&b))
}

pub(crate) fn score_work_type(mention: &str, name: &str) -> i32 {
    if mention.is_empty() || name.is_empty() {
        return 0;
    }
    if mention == name {
        return SCORE_EXACT;
    }
    if same_alias_group(mention, name) {
        return SCORE_ALIAS;
    }
    if name.contains(mention) || mention.contains(name) {
        return SCORE_SUBSTRING;
    }
    0
}

/// Picks the best-scoring work type in scope, alphabetical on ties. A
/// mention nothing matches comes back unresolved with the raw text intact.
pub fn resolve_work_type(mention: &str, work_types: &[WorkTypeRecord]) -> ResolvedWorkType {
    let folded = normalize(mention);
    let mut best: Option<(i32, &WorkTypeRecord)> = None;
    for record in work_types {
        let score = score_work_type(&folded, &normalize(&record.name));
        if score == 0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_score, best_record)) => {
                score > best_score || (score == best_score && record.name < best_record.name)
            }
        };
        if better {
            best = Some((score, record));
        }
    }
    match best {
        Some((_, record)) => ResolvedWorkType {
            id: Some(record.id.clone()),
            name: Some(record.name.clone()),
            raw_text: mention.to_owned(),
        },
        None => ResolvedWorkType { id: None, name: None, raw_text: mention.to_owned() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<WorkTypeRecord> {
        [("wt-1", "Cashier"), ("wt-2", "Stock"), ("wt-3", "Bakery Counter")]
            .iter()
            .map(|(id, name)| WorkTypeRecord {
                id: (*id).to_owned(),
                store_id: "store-1".to_owned(),
                name: (*name).to_owned(),
            })
            .collect()
    }

    #[test]
    fn exact_name_wins() {
        let resolved = resolve_work_type("cashier", &catalog());
        assert_eq!(resolved.id.as_deref(), Some("wt-1"));
        assert_eq!(resolved.filter_text(), "Cashier");
    }

    #[test]
    fn aliases_cross_languages() {
        assert_eq!(resolve_work_type("kassier", &catalog()).id.as_deref(), Some("wt-1"));
        assert_eq!(resolve_work_type("caissière", &catalog()).id.as_deref(), Some("wt-1"));
        assert_eq!(resolve_work_type("magazijn", &catalog()).id.as_deref(), Some("wt-2"));
    }

    #[test]
    fn substring_matches_both_directions() {
        // Mention inside the store label.
        assert_eq!(resolve_work_type("bakery", &catalog()).id.as_deref(), Some("wt-3"));
        // Store label inside the mention.
        assert_eq!(resolve_work_type("stock room", &catalog()).id.as_deref(), Some("wt-2"));
    }

    #[test]
    fn unmatched_mentions_keep_their_raw_text() {
        let resolved = resolve_work_type("Florist", &catalog());
        assert!(!resolved.is_resolved());
        assert_eq!(resolved.filter_text(), "Florist");
    }
}
