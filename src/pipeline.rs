//! The filtering and aggregation pipeline behind the map.
//!
//! A [`Dashboard`] owns the loaded collections together with the province
//! grouping and the event list derived from them. Every filter change goes
//! through [`Dashboard::apply_filters`], which returns freshly built
//! collections and never touches the loaded data.

use crate::color::{ColorMapper, MapColor, Rgb};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::vote_events;
use crate::filter::{filter_facts, filter_vote_details, Selection};
use crate::grouper::{group_by_province, ProvinceGroups};
use crate::loader::DataLoader;
use crate::stats::{aggregate_facts, aggregate_vote_details, ProvinceStats, ProvinceVoteStats};
use crate::summary::{summarize_vote_details, MemberVoteSummary};
use crate::types::{DataSet, Fact, Person, VoteDetail, VoteOption};
use log::debug;
use serde::Serialize;

/// Which collection the province stats are aggregated from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatsSource {
    /// Pre-aggregated fact rows
    #[default]
    Facts,
    /// Raw per-person vote rows
    Details,
}

impl std::str::FromStr for StatsSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "facts" => Ok(StatsSource::Facts),
            "details" => Ok(StatsSource::Details),
            other => Err(Error::Config(format!(
                "Invalid stats source '{}'. Allowed values are: facts, details",
                other
            ))),
        }
    }
}

/// Result of one filter pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilteredView {
    pub vote_details: Vec<VoteDetail>,
    pub facts: Vec<Fact>,
    pub stats: ProvinceStats,
}

/// What the map shows for one province
#[derive(Debug, Clone, Serialize)]
pub struct ProvinceView {
    pub province: String,
    pub members: usize,
    pub stats: Option<ProvinceVoteStats>,
    pub color: MapColor,
    pub text_color: Rgb,
}

/// Loaded data plus everything derived from it once
#[derive(Debug, Clone)]
pub struct Dashboard {
    data: DataSet,
    groups: ProvinceGroups,
    events: Vec<String>,
}

impl Dashboard {
    /// Load the data directory and derive the grouping and event list
    pub async fn load(config: &Config) -> Result<Self> {
        let data = DataLoader::new(config.clone()).load().await?;
        Ok(Self::from_data(data))
    }

    pub fn from_data(data: DataSet) -> Self {
        let groups = group_by_province(&data.persons);
        let events = vote_events(&data.facts);
        debug!("{} provinces, {} vote events", groups.len(), events.len());
        Self {
            data,
            groups,
            events,
        }
    }

    pub fn data(&self) -> &DataSet {
        &self.data
    }

    pub fn persons(&self) -> &[Person] {
        &self.data.persons
    }

    pub fn groups(&self) -> &ProvinceGroups {
        &self.groups
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Filter both collections and aggregate stats from the filtered facts
    pub fn apply_filters(&self, selection: &Selection) -> FilteredView {
        self.filtered(selection, StatsSource::Facts)
    }

    /// Filter both collections and aggregate stats from the filtered vote details
    pub fn apply_filters_from_details(&self, selection: &Selection) -> FilteredView {
        self.filtered(selection, StatsSource::Details)
    }

    pub fn filtered(&self, selection: &Selection, source: StatsSource) -> FilteredView {
        let vote_details = filter_vote_details(&self.data.vote_details, selection);
        let facts = filter_facts(&self.data.facts, selection);
        let stats = match source {
            StatsSource::Facts => aggregate_facts(&facts),
            StatsSource::Details => self.detail_stats(selection),
        };
        debug!(
            "selection {:?}: {} vote details, {} facts, {} provinces with data",
            selection,
            vote_details.len(),
            facts.len(),
            stats.len()
        );
        FilteredView {
            vote_details,
            facts,
            stats,
        }
    }

    // Portions need every eligible vote of the event, so the option filter is
    // applied by the aggregator rather than to its input.
    fn detail_stats(&self, selection: &Selection) -> ProvinceStats {
        let option = match selection.option.as_deref() {
            None => None,
            Some(label) => match VoteOption::from_label(label) {
                Some(option) => Some(option),
                None => return ProvinceStats::new(),
            },
        };
        let eligible = filter_vote_details(&self.data.vote_details, &selection.event_only());
        aggregate_vote_details(&eligible, option)
    }

    /// One view per grouped province, in grouping order
    pub fn province_views(
        &self,
        view: &FilteredView,
        mapper: &ColorMapper<'_>,
        selection: &Selection,
    ) -> Vec<ProvinceView> {
        self.groups
            .iter()
            .map(|(province, members)| {
                let stats = view.stats.get(province);
                let color = mapper.province_color(stats, selection.option.as_deref());
                ProvinceView {
                    province: province.clone(),
                    members: members.len(),
                    stats: stats.cloned(),
                    color,
                    text_color: mapper.text_color(&color),
                }
            })
            .collect()
    }

    /// Member summaries over every loaded vote-detail row
    pub fn member_summaries(&self) -> Vec<MemberVoteSummary> {
        summarize_vote_details(&self.data.vote_details, &self.data.persons)
    }
}
