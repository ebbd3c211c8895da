//! Username/handle candidates derived from a name
//!
//! Used by collectors that probe profile URLs directly instead of going
//! through a platform's search endpoint.

use super::types::NameTokens;
use std::collections::HashSet;

/// Upper bound on derived handles.
pub const MAX_HANDLES: usize = 16;

/// Derive common handle patterns from a name, most likely first.
pub fn candidate_handles(name: &str) -> Vec<String> {
    let tokens = NameTokens::parse(name);
    let mut handles = Vec::new();

    if let (Some(first), Some(last)) = (tokens.first(), tokens.last()) {
        let f = initial(first);
        let l = initial(last);
        handles.extend([
            format!("{first}{last}"),
            format!("{first}_{last}"),
            format!("{first}.{last}"),
            format!("{f}{last}"),
            format!("{first}{l}"),
            format!("{f}.{last}"),
            format!("{first}.{l}"),
            format!("{first}{last}1"),
            format!("{first}{last}2"),
            format!("real{first}{last}"),
            format!("the{first}{last}"),
            format!("{first}{last}official"),
        ]);
    }

    let compact = tokens.compact();
    if !compact.is_empty() {
        handles.extend([
            compact.clone(),
            format!("{compact}1"),
            format!("_{compact}"),
            format!("{compact}_"),
        ]);
    }

    let mut seen = HashSet::new();
    handles
        .into_iter()
        .filter(|h| seen.insert(h.clone()))
        .take(MAX_HANDLES)
        .collect()
}

fn initial(token: &str) -> String {
    token.chars().next().map(String::from).unwrap_or_default()
}
