//! Query generation: name (+ location, context) to an ordered query set
//!
//! Generation is pure and deterministic. The same inputs always yield the
//! same queries in the same order, and the sequence never exceeds
//! [`MAX_QUERIES`] however long the inputs are.

use super::types::{NameTokens, Query, QueryIntent};
use std::collections::HashSet;
use thiserror::Error;

/// Upper bound on generated queries, independent of input size.
pub const MAX_QUERIES: usize = 20;

/// Role keywords appended for professional queries.
const PROFESSIONAL_SUFFIXES: &[&str] = &[
    "LinkedIn",
    "profile",
    "professional",
    "CEO OR director OR manager OR founder",
    "company OR organization OR business",
];

const SOCIAL_SUFFIXES: &[&str] = &["Instagram", "Twitter", "Facebook", "social media"];

/// Errors raised before any collector is scheduled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryGenerationError {
    #[error("Name is empty or has no alphanumeric characters")]
    EmptyName,
}

/// Generate the query set for a search.
///
/// An invalid (empty) name yields an empty sequence.
pub fn generate(name: &str, location: Option<&str>, context: Option<&str>) -> Vec<Query> {
    try_generate(name, location, context).unwrap_or_default()
}

/// Generate the query set, failing fast on an invalid name.
pub fn try_generate(
    name: &str,
    location: Option<&str>,
    context: Option<&str>,
) -> Result<Vec<Query>, QueryGenerationError> {
    let tokens = NameTokens::parse(name);
    if tokens.is_empty() {
        return Err(QueryGenerationError::EmptyName);
    }

    let quoted = format!("\"{}\"", tokens.original());
    let plain = tokens.joined();
    let mut builder = QueryBuilder::default();

    builder.push(quoted.clone(), QueryIntent::NameOnly);
    builder.push(plain.clone(), QueryIntent::NameOnly);

    if let Some(location) = clean_extra(location) {
        builder.push(format!("{} {}", quoted, location), QueryIntent::NameLocation);
        builder.push(format!("{} \"{}\"", quoted, location), QueryIntent::NameLocation);
        builder.push(format!("{} {}", plain, location), QueryIntent::NameLocation);
    }

    if let Some(context) = clean_extra(context) {
        builder.push(format!("{} \"{}\"", quoted, context), QueryIntent::Context);
        builder.push(format!("{} {}", plain, context), QueryIntent::Context);
    }

    for suffix in PROFESSIONAL_SUFFIXES {
        builder.push(format!("{} {}", quoted, suffix), QueryIntent::Professional);
    }
    for suffix in SOCIAL_SUFFIXES {
        builder.push(format!("{} {}", quoted, suffix), QueryIntent::Social);
    }

    Ok(builder.finish())
}

/// Trim and collapse whitespace in an optional location/context string.
fn clean_extra(value: Option<&str>) -> Option<String> {
    let collapsed = value?.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Ordered, de-duplicated, capped accumulator
#[derive(Default)]
struct QueryBuilder {
    seen: HashSet<String>,
    queries: Vec<Query>,
}

impl QueryBuilder {
    fn push(&mut self, text: String, intent: QueryIntent) {
        if self.queries.len() >= MAX_QUERIES {
            return;
        }
        if self.seen.insert(text.clone()) {
            self.queries.push(Query::new(text, intent));
        }
    }

    fn finish(self) -> Vec<Query> {
        self.queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(queries: &[Query]) -> Vec<&str> {
        queries.iter().map(|q| q.text()).collect()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let first = generate("Jordan Lee", Some("Austin, TX"), Some("Acme"));
        let second = generate("Jordan Lee", Some("Austin, TX"), Some("Acme"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_keeps_unmodified_quoted_variant() {
        let queries = generate("  Jordan  O'Lee ", None, None);
        assert_eq!(queries[0].text(), "\"Jordan  O'Lee\"");
        assert!(queries[0].is_exact_phrase());
        assert_eq!(queries[1].text(), "jordan o lee");
    }

    #[test]
    fn test_generate_orders_intents() {
        let queries = generate("Jordan Lee", Some("Austin"), Some("Acme Corp"));
        let intents: Vec<QueryIntent> = queries.iter().map(|q| q.intent()).collect();

        assert_eq!(intents[0], QueryIntent::NameOnly);
        assert_eq!(intents[2], QueryIntent::NameLocation);
        assert_eq!(intents[5], QueryIntent::Context);
        assert_eq!(intents[7], QueryIntent::Professional);
        assert_eq!(*intents.last().unwrap(), QueryIntent::Social);
        assert!(texts(&queries).contains(&"\"Jordan Lee\" \"Austin\""));
        assert!(texts(&queries).contains(&"jordan lee Acme Corp"));
    }

    #[test]
    fn test_generate_skips_blank_extras() {
        let with_blank = generate("Jordan Lee", Some("   "), Some(""));
        let without = generate("Jordan Lee", None, None);
        assert_eq!(with_blank, without);
    }

    #[test]
    fn test_generate_is_capped() {
        let long_name = "word ".repeat(500);
        let long_location = "place ".repeat(500);
        let queries = generate(&long_name, Some(&long_location), Some(&long_location));
        assert!(queries.len() <= MAX_QUERIES);
    }

    #[test]
    fn test_generate_has_no_duplicates() {
        let queries = generate("jordan lee", None, None);
        let unique: HashSet<&str> = texts(&queries).into_iter().collect();
        assert_eq!(unique.len(), queries.len());
    }

    #[test]
    fn test_empty_name() {
        assert!(generate("", None, None).is_empty());
        assert!(generate(" -- ", Some("Austin"), None).is_empty());
        assert_eq!(
            try_generate("", None, None),
            Err(QueryGenerationError::EmptyName)
        );
    }
}
