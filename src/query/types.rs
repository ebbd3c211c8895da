//! Query types shared by the generator and the collectors

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a query is trying to find.
///
/// Collectors use the intent to pick the subset of queries they consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// The name on its own, exact-phrase or plain
    NameOnly,
    /// The name combined with a location
    NameLocation,
    /// Role, company or professional-network forms
    Professional,
    /// Social-platform forms
    Social,
    /// The name combined with caller-supplied context (company, title...)
    Context,
}

impl QueryIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::NameOnly => "name_only",
            QueryIntent::NameLocation => "name_location",
            QueryIntent::Professional => "professional",
            QueryIntent::Social => "social",
            QueryIntent::Context => "context",
        }
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable search string plus its intent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    text: String,
    intent: QueryIntent,
}

impl Query {
    pub fn new(text: impl Into<String>, intent: QueryIntent) -> Self {
        Self {
            text: text.into(),
            intent,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn intent(&self) -> QueryIntent {
        self.intent
    }

    /// Whether the query is an exact-phrase form (`"..."` quoted).
    pub fn is_exact_phrase(&self) -> bool {
        self.text.starts_with('"')
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The normalized form of a searched name.
///
/// Tokens are case-folded with every run of non-alphanumeric characters
/// collapsed into a single separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTokens {
    original: String,
    tokens: Vec<String>,
}

impl NameTokens {
    pub fn parse(name: &str) -> Self {
        let tokens = name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();
        Self {
            original: name.trim().to_string(),
            tokens,
        }
    }

    /// The name as the caller typed it, trimmed.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Last token, only when the name has more than one.
    pub fn last(&self) -> Option<&str> {
        if self.tokens.len() >= 2 {
            self.tokens.last().map(String::as_str)
        } else {
            None
        }
    }

    /// Tokens joined with single spaces.
    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }

    /// Tokens joined with no separator (`jordanlee`).
    pub fn compact(&self) -> String {
        self.tokens.concat()
    }
}
