use serde::{ser::SerializeMap, Serialize, Serializer};
use tracing::{debug, warn};

use crate::{collect::Token, sort::sort_indices};

/// Insertion-ordered counter. Keys appear in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    pub fn bump(&mut self, key: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, n)) => *n += 1,
            None => self.entries.push((key.to_string(), 1)),
        }
    }

    pub fn get(&self, key: &str) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), *n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, n) in &self.entries {
            map.serialize_entry(k, n)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAnalysis {
    pub by_collection: Tally,
    pub by_type: Tally,
    pub by_mode: Tally,
    pub collections: Vec<CollectionGroup>,
}

impl TokenAnalysis {
    pub fn token_count(&self) -> usize {
        self.collections
            .iter()
            .flat_map(|c| &c.modes)
            .map(|m| m.tokens.len())
            .sum()
    }

    pub fn mode_count(&self) -> usize {
        self.collections.iter().map(|c| c.modes.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionGroup {
    pub name: String,
    pub modes: Vec<ModeGroup>,
}

/// Tokens of one mode, in sorter order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeGroup {
    pub name: String,
    pub tokens: Vec<Token>,
}

/// Group tokens into collection → mode buckets, count them, and order each
/// bucket with the token sorter.
///
/// Collections and modes keep the order in which they were first seen.
/// Tokens missing a collection, mode or name are dropped from every output;
/// the counts cover exactly the tokens that land in `collections`.
pub fn analyze_tokens(tokens: &[Token]) -> TokenAnalysis {
    let mut analysis = TokenAnalysis::default();
    if tokens.is_empty() {
        warn!("no tokens provided for analysis");
        return analysis;
    }

    let mut buckets: Vec<(String, Vec<(String, Vec<Token>)>)> = Vec::new();

    for token in tokens {
        if token.collection.is_empty() || token.mode.is_empty() || token.name.is_empty() {
            warn!(
                name = %token.name,
                collection = %token.collection,
                mode = %token.mode,
                "skipping invalid token"
            );
            continue;
        }

        analysis.by_collection.bump(&token.collection);
        analysis.by_type.bump(token.type_name());
        analysis.by_mode.bump(&token.mode);

        let ci = match buckets.iter().position(|(c, _)| *c == token.collection) {
            Some(i) => i,
            None => {
                buckets.push((token.collection.clone(), Vec::new()));
                buckets.len() - 1
            }
        };
        let modes = &mut buckets[ci].1;

        match modes.iter_mut().find(|(m, _)| *m == token.mode) {
            Some((_, list)) => list.push(token.clone()),
            None => modes.push((token.mode.clone(), vec![token.clone()])),
        }
    }

    analysis.collections = buckets
        .into_iter()
        .map(|(name, modes)| CollectionGroup {
            name,
            modes: modes
                .into_iter()
                .map(|(name, tokens)| ModeGroup {
                    name,
                    tokens: sorted_tokens(tokens),
                })
                .collect(),
        })
        .collect();

    debug!(
        collections = analysis.collections.len(),
        modes = analysis.mode_count(),
        tokens = analysis.token_count(),
        "token analysis complete"
    );

    analysis
}

fn sorted_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let order = sort_indices(&tokens.iter().map(|t| t.name.as_str()).collect::<Vec<_>>());
    let mut slots: Vec<Option<Token>> = tokens.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ResolvedType;
    use pretty_assertions::assert_eq;

    fn token(collection: &str, mode: &str, name: &str, ty: ResolvedType) -> Token {
        Token {
            name: name.into(),
            value: format!("v:{name}"),
            collection: collection.into(),
            mode: mode.into(),
            resolved_type: ty,
            original_value: serde_json::Value::Null,
        }
    }

    fn names(group: &ModeGroup) -> Vec<&str> {
        group.tokens.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(analyze_tokens(&[]), TokenAnalysis::default());
    }

    #[test]
    fn groups_in_first_seen_order_and_sorts_within_modes() {
        let tokens = vec![
            token("Theme", "Light", "color-10", ResolvedType::Color),
            token("Core", "Default", "space-2", ResolvedType::Float),
            token("Theme", "Light", "color-2", ResolvedType::Color),
            token("Theme", "Dark", "color-1", ResolvedType::Color),
            token("Core", "Default", "space-1", ResolvedType::Float),
        ];

        let a = analyze_tokens(&tokens);

        let collections: Vec<&str> = a.collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(collections, vec!["Theme", "Core"]);

        let theme = &a.collections[0];
        let modes: Vec<&str> = theme.modes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(modes, vec!["Light", "Dark"]);
        assert_eq!(names(&theme.modes[0]), vec!["color-2", "color-10"]);
        assert_eq!(names(&a.collections[1].modes[0]), vec!["space-1", "space-2"]);

        assert_eq!(a.by_collection.get("Theme"), 3);
        assert_eq!(a.by_type.get("FLOAT"), 2);
        assert_eq!(a.by_mode.keys().collect::<Vec<_>>(), vec!["Light", "Default", "Dark"]);
    }

    #[test]
    fn invalid_tokens_are_excluded_everywhere() {
        let tokens = vec![
            token("", "Light", "a", ResolvedType::Color),
            token("Theme", "", "b", ResolvedType::Color),
            token("Theme", "Light", "", ResolvedType::Color),
            token("Theme", "Light", "ok", ResolvedType::Unknown),
        ];

        let a = analyze_tokens(&tokens);
        assert_eq!(a.token_count(), 1);
        assert_eq!(a.by_collection.total(), 1);
        assert_eq!(a.by_type.get("UNKNOWN"), 1);
        assert_eq!(a.by_mode.len(), 1);
    }

    #[test]
    fn duplicate_names_in_a_mode_are_preserved() {
        let mut first = token("Theme", "Light", "dup", ResolvedType::String);
        first.value = "first".into();
        let mut second = token("Theme", "Light", "dup", ResolvedType::String);
        second.value = "second".into();

        let a = analyze_tokens(&[second.clone(), token("Theme", "Light", "a", ResolvedType::String), first.clone()]);
        let values: Vec<&str> = a.collections[0].modes[0]
            .tokens
            .iter()
            .map(|t| t.value.as_str())
            .collect();
        assert_eq!(values, vec!["v:a", "second", "first"]);
        assert_eq!(a.by_collection.get("Theme"), 3);
    }

    #[test]
    fn tally_serializes_in_insertion_order() {
        let mut t = Tally::default();
        t.bump("zeta");
        t.bump("alpha");
        t.bump("zeta");
        assert_eq!(serde_json::to_string(&t).unwrap(), r#"{"zeta":2,"alpha":1}"#);
    }
}
