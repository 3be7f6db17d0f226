use crate::types::{Fact, VoteDetail, VoteOption, ALL_OPTIONS_TYPE};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Five-way vote counter indexed by [`VoteOption::index`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally([u32; 5]);

impl VoteTally {
    pub fn from_counts(counts: [u32; 5]) -> Self {
        Self(counts)
    }

    pub fn counts(&self) -> [u32; 5] {
        self.0
    }

    pub fn record(&mut self, option: VoteOption) {
        self.0[option.index()] += 1;
    }

    pub fn add(&mut self, other: &VoteTally) {
        for (slot, count) in self.0.iter_mut().zip(other.0) {
            *slot += count;
        }
    }

    /// A tally holding only the counter of `option`
    pub fn only(&self, option: VoteOption) -> VoteTally {
        let mut counts = [0; 5];
        counts[option.index()] = self.get(option);
        Self(counts)
    }

    pub fn get(&self, option: VoteOption) -> u32 {
        self.0[option.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Votes in which the member exercised the right to vote
    pub fn cast(&self) -> u32 {
        VoteOption::ALL
            .into_iter()
            .filter(|option| option.is_cast())
            .map(|option| self.get(option))
            .sum()
    }

    /// Share of `option` in percent, 0 when nothing was counted
    pub fn percent(&self, option: VoteOption) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            f64::from(self.get(option)) / f64::from(total) * 100.0
        }
    }

    /// Option with the strictly highest count. Ties go to the option that
    /// comes first in enumeration order; an empty tally has no winner.
    pub fn winning_option(&self) -> Option<VoteOption> {
        VoteOption::ALL
            .into_iter()
            .fold(None, |best: Option<(VoteOption, u32)>, option| {
                let count = self.get(option);
                match best {
                    Some((_, best_count)) if count <= best_count => best,
                    _ if count == 0 => best,
                    _ => Some((option, count)),
                }
            })
            .map(|(option, _)| option)
    }
}

/// Aggregate of one province under the current filter selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceVoteStats {
    pub province: String,
    pub agree_count: u32,
    pub disagree_count: u32,
    pub abstain_count: u32,
    pub no_vote_count: u32,
    pub absent_count: u32,
    pub total: u32,
    /// Usage intensity in [0, 1] driving the map color
    pub portion: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_option: Option<VoteOption>,
}

impl ProvinceVoteStats {
    pub fn from_tally(province: impl Into<String>, tally: VoteTally, portion: f64) -> Self {
        Self {
            province: province.into(),
            agree_count: tally.get(VoteOption::Agree),
            disagree_count: tally.get(VoteOption::Disagree),
            abstain_count: tally.get(VoteOption::Abstain),
            no_vote_count: tally.get(VoteOption::NoVote),
            absent_count: tally.get(VoteOption::Absent),
            total: tally.total(),
            portion,
            winning_option: tally.winning_option(),
        }
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally::from_counts([
            self.agree_count,
            self.disagree_count,
            self.abstain_count,
            self.no_vote_count,
            self.absent_count,
        ])
    }

    pub fn count(&self, option: VoteOption) -> u32 {
        self.tally().get(option)
    }

    pub fn percent(&self, option: VoteOption) -> f64 {
        self.tally().percent(option)
    }
}

/// Stats keyed by province name. A missing province means "no data".
pub type ProvinceStats = IndexMap<String, ProvinceVoteStats>;

/// Tally vote-detail rows per province.
///
/// `details` are the rows of the selected vote event, not yet narrowed to an
/// option: every row counts as one eligible member-vote of its province. With
/// no option the portion is the share of those votes actually cast. With an
/// option only that option's counter is kept and the portion is its share of
/// the eligible votes, matching the option rows of [`fact_table`].
///
/// Rows without a province or with an unrecognized option are skipped.
pub fn aggregate_vote_details(details: &[VoteDetail], option: Option<VoteOption>) -> ProvinceStats {
    let mut skipped = 0usize;
    let tallies = details.iter().fold(
        IndexMap::<String, VoteTally>::new(),
        |mut tallies, row| {
            match (row.province.as_deref(), row.vote_option()) {
                (Some(province), Some(option)) if !province.is_empty() => {
                    tallies.entry(province.to_string()).or_default().record(option);
                }
                _ => skipped += 1,
            }
            tallies
        },
    );
    if skipped > 0 {
        debug!("skipped {} vote-detail rows without province or known option", skipped);
    }

    let stats: ProvinceStats = tallies
        .into_iter()
        .filter_map(|(province, eligible)| {
            let (tally, share) = match option {
                None => (eligible, eligible.cast()),
                Some(option) => (eligible.only(option), eligible.get(option)),
            };
            if tally.total() == 0 {
                return None;
            }
            let portion = f64::from(share) / f64::from(eligible.total());
            Some((province.clone(), ProvinceVoteStats::from_tally(province, tally, portion)))
        })
        .collect();
    debug!("aggregated {} provinces from {} vote-detail rows", stats.len(), details.len());
    stats
}

/// Combine filtered fact rows per province.
///
/// Counters of all rows of a province are summed; the portion is passed
/// through from the province's first row.
pub fn aggregate_facts(facts: &[Fact]) -> ProvinceStats {
    let combined = facts.iter().fold(
        IndexMap::<String, (VoteTally, f64)>::new(),
        |mut combined, fact| {
            let tally = VoteTally::from_counts(fact.counts());
            combined
                .entry(fact.province.clone())
                .and_modify(|(sum, _)| sum.add(&tally))
                .or_insert((tally, fact.portion));
            combined
        },
    );

    let stats: ProvinceStats = combined
        .into_iter()
        .filter(|(_, (tally, _))| tally.total() > 0)
        .map(|(province, (tally, portion))| {
            (province.clone(), ProvinceVoteStats::from_tally(province, tally, portion))
        })
        .collect();
    debug!("aggregated {} provinces from {} fact rows", stats.len(), facts.len());
    stats
}

/// Build the per-bill, per-province fact table from vote-detail rows.
///
/// Every (bill, province) pair gets an aggregate row typed [`ALL_OPTIONS_TYPE`]
/// carrying the usage portion, plus one summary row per option that received
/// votes. An option row only carries that option's counter and its share as
/// portion.
pub fn fact_table(details: &[VoteDetail]) -> Vec<Fact> {
    let tallies = details.iter().fold(
        IndexMap::<(&str, &str), VoteTally>::new(),
        |mut tallies, row| {
            if let (Some(province), Some(option)) = (row.province.as_deref(), row.vote_option()) {
                tallies
                    .entry((row.title.as_str(), province))
                    .or_default()
                    .record(option);
            }
            tallies
        },
    );

    let mut facts = Vec::new();
    for ((title, province), tally) in tallies {
        let total = f64::from(tally.total());
        let row = |kind: &str, counts: [u32; 5], portion: f64| Fact {
            title: title.to_string(),
            kind: kind.to_string(),
            option: kind.to_string(),
            province: province.to_string(),
            agree_count: counts[0],
            disagree_count: counts[1],
            abstain_count: counts[2],
            no_vote_count: counts[3],
            absent_count: counts[4],
            portion,
        };

        facts.push(row(
            ALL_OPTIONS_TYPE,
            tally.counts(),
            f64::from(tally.cast()) / total,
        ));
        for option in VoteOption::ALL {
            let count = tally.get(option);
            if count == 0 {
                continue;
            }
            facts.push(row(option.label(), tally.only(option).counts(), f64::from(count) / total));
        }
    }
    facts
}
