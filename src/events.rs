use crate::types::Fact;
use indexmap::IndexSet;

/// Distinct bill titles in first-seen order, for the event picker
pub fn vote_events(facts: &[Fact]) -> Vec<String> {
    facts
        .iter()
        .map(|fact| fact.title.as_str())
        .collect::<IndexSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
