use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Learns which expense account goes with a purchase description.
///
/// Keys are normalized (trimmed, lowercased, inner whitespace collapsed), so
/// `"Coffee "` and `"coffee"` share an entry. The latest association for a
/// key replaces earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Suggester {
    associations: BTreeMap<String, String>,
}

impl Suggester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn associate(&mut self, description: &str, account: &str) {
        let key = normalize(description);
        let account = account.trim();
        if key.is_empty() || account.is_empty() {
            return;
        }
        self.associations.insert(key, account.to_string());
    }

    /// Exact match first, then the shortest learned description that starts
    /// with what was typed.
    pub fn suggest(&self, description: &str) -> Option<&str> {
        let key = normalize(description);
        if key.is_empty() {
            return None;
        }
        if let Some(account) = self.associations.get(&key) {
            return Some(account);
        }
        self.associations
            .range(key.clone()..)
            .take_while(|(candidate, _)| candidate.starts_with(&key))
            .min_by_key(|(candidate, _)| candidate.len())
            .map(|(_, account)| account.as_str())
    }

    pub fn len(&self) -> usize {
        self.associations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }
}

fn normalize(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_ignores_case_and_spacing() {
        let mut suggester = Suggester::new();
        suggester.associate("coffee", "Expenses:Food");
        assert_eq!(suggester.suggest("coffee"), Some("Expenses:Food"));
        assert_eq!(suggester.suggest("  Coffee "), Some("Expenses:Food"));
    }

    #[test]
    fn prefix_match_prefers_shortest_description() {
        let mut suggester = Suggester::new();
        suggester.associate("coffee beans", "Expenses:Groceries");
        suggester.associate("coffee at work", "Expenses:Food:Out");
        suggester.associate("cof", "Expenses:Misc");
        assert_eq!(suggester.suggest("coffee"), Some("Expenses:Groceries"));
        assert_eq!(suggester.suggest("tea"), None);
    }

    #[test]
    fn latest_association_wins_and_blanks_are_ignored() {
        let mut suggester = Suggester::new();
        suggester.associate("milk", "Expenses:Food");
        suggester.associate("milk", "Expenses:Groceries");
        suggester.associate("   ", "Expenses:Nothing");
        suggester.associate("bread", " ");
        assert_eq!(suggester.suggest("milk"), Some("Expenses:Groceries"));
        assert_eq!(suggester.len(), 1);
        assert_eq!(suggester.suggest(""), None);
    }
}
