//! Normalisation of free-text AI tag suggestions onto the closed tag sets.
//!
//! Matching rule: a suggestion matches a tag when, compared case-insensitively,
//! either string contains the other. The first matching tag in declaration
//! order wins. Blank and unmatched suggestions are dropped, and the result is
//! deduplicated in first-match order.

use super::model::TagLabel;

pub fn normalize_tags<T: TagLabel, S: AsRef<str>>(suggestions: &[S]) -> Vec<T> {
    let mut matched: Vec<T> = Vec::new();

    for raw in suggestions {
        let needle = raw.as_ref().trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }

        let hit = T::ALL.iter().copied().find(|tag| {
            let label = tag.label().to_lowercase();
            label.contains(&needle) || needle.contains(&label)
        });

        match hit {
            Some(tag) if !matched.contains(&tag) => matched.push(tag),
            Some(_) => {}
            None => log::debug!("dropping unmatched tag suggestion '{}'", raw.as_ref()),
        }
    }

    matched
}
