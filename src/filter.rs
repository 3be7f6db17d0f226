use crate::types::{Fact, VoteDetail, ALL_OPTIONS_TYPE};
use serde::{Deserialize, Serialize};

/// Filter result indicating whether a record should be kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    Keep,
    FilterOut,
}

impl From<bool> for FilterResult {
    fn from(keep: bool) -> Self {
        if keep {
            FilterResult::Keep
        } else {
            FilterResult::FilterOut
        }
    }
}

/// Filter trait for the source record types
pub trait RecordFilter<T> {
    fn should_keep(&self, record: &T) -> FilterResult;
}

/// The user's current filter selection. `None` means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Selected bill title
    pub event: Option<String>,
    /// Selected vote option label
    pub option: Option<String>,
}

impl Selection {
    /// Build a selection, treating blank values as "no filter"
    pub fn new(event: Option<String>, option: Option<String>) -> Self {
        Self {
            event: event.filter(|e| !e.trim().is_empty()),
            option: option.filter(|o| !o.trim().is_empty()),
        }
    }

    /// Whether neither filter is set
    pub fn is_empty(&self) -> bool {
        self.event.is_none() && self.option.is_none()
    }

    /// The same event with the option filter cleared
    pub fn event_only(&self) -> Self {
        Self {
            event: self.event.clone(),
            option: None,
        }
    }

    fn matches_event(&self, title: &str) -> bool {
        self.event.as_deref().map_or(true, |event| event == title)
    }
}

impl RecordFilter<VoteDetail> for Selection {
    fn should_keep(&self, record: &VoteDetail) -> FilterResult {
        let option_matches = self
            .option
            .as_deref()
            .map_or(true, |option| option == record.option);
        (self.matches_event(&record.title) && option_matches).into()
    }
}

impl RecordFilter<Fact> for Selection {
    fn should_keep(&self, record: &Fact) -> FilterResult {
        if !self.matches_event(&record.title) {
            return FilterResult::FilterOut;
        }
        // Option summary rows repeat the option label in `type`; the aggregate
        // row of a bill carries the "All" sentinel instead.
        match self.option.as_deref() {
            Some(option) => (record.option == option && record.kind == option).into(),
            None => (record.kind == ALL_OPTIONS_TYPE).into(),
        }
    }
}

/// Keep the records accepted by `filter`, in input order
pub fn apply<T, F>(records: &[T], filter: &F) -> Vec<T>
where
    T: Clone,
    F: RecordFilter<T> + ?Sized,
{
    records
        .iter()
        .filter(|record| filter.should_keep(record) == FilterResult::Keep)
        .cloned()
        .collect()
}

/// Narrow vote-detail rows to the selected event and option
pub fn filter_vote_details(details: &[VoteDetail], selection: &Selection) -> Vec<VoteDetail> {
    apply(details, selection)
}

/// Narrow fact rows to the selected event, then to the selected option's
/// summary rows (or the bill aggregate rows when no option is selected)
pub fn filter_facts(facts: &[Fact], selection: &Selection) -> Vec<Fact> {
    apply(facts, selection)
}
