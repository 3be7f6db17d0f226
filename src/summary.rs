use crate::stats::VoteTally;
use crate::types::{Person, VoteDetail, VoteOption};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-member vote counts, in the shape of the static summary asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberVoteSummary {
    pub person: String,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "เห็นด้วย", default)]
    pub agree: u32,
    #[serde(rename = "ไม่เห็นด้วย", default)]
    pub disagree: u32,
    #[serde(rename = "งดออกเสียง", default)]
    pub abstain: u32,
    #[serde(rename = "ไม่ลงคะแนนเสียง", default)]
    pub no_vote: u32,
    #[serde(rename = "ลา / ขาดลงมติ", default)]
    pub absent: u32,
    /// Every vote except absences
    #[serde(rename = "รวมลงมติ", default)]
    pub total_cast: u32,
}

impl MemberVoteSummary {
    fn from_tally(person: String, province: Option<String>, image: Option<String>, tally: VoteTally) -> Self {
        Self {
            person,
            province,
            image,
            agree: tally.get(VoteOption::Agree),
            disagree: tally.get(VoteOption::Disagree),
            abstain: tally.get(VoteOption::Abstain),
            no_vote: tally.get(VoteOption::NoVote),
            absent: tally.get(VoteOption::Absent),
            total_cast: tally.total() - tally.get(VoteOption::Absent),
        }
    }

    pub fn tally(&self) -> VoteTally {
        VoteTally::from_counts([self.agree, self.disagree, self.abstain, self.no_vote, self.absent])
    }

    pub fn total_votes(&self) -> u32 {
        self.tally().total()
    }

    pub fn agree_percent(&self) -> f64 {
        self.tally().percent(VoteOption::Agree)
    }

    pub fn disagree_percent(&self) -> f64 {
        self.tally().percent(VoteOption::Disagree)
    }

    /// Most frequent action, `None` for a member without votes
    pub fn majority_action(&self) -> Option<VoteOption> {
        self.tally().winning_option()
    }
}

/// One vote of one member, borrowed from whichever record type carries it
#[derive(Debug, Clone, Copy)]
pub struct MemberVote<'a> {
    pub person: &'a str,
    pub province: Option<&'a str>,
    pub image: Option<&'a str>,
    pub option: &'a str,
}

/// Crosstab votes per member, in first-seen member order.
///
/// Province and image come from the first vote that carries them. Votes with
/// an unrecognized option are not counted.
pub fn summarize_members<'a, I>(votes: I) -> Vec<MemberVoteSummary>
where
    I: IntoIterator<Item = MemberVote<'a>>,
{
    struct Acc<'v> {
        province: Option<&'v str>,
        image: Option<&'v str>,
        tally: VoteTally,
    }

    let members = votes.into_iter().fold(IndexMap::<&str, Acc>::new(), |mut members, vote| {
        let acc = members.entry(vote.person).or_insert(Acc {
            province: None,
            image: None,
            tally: VoteTally::default(),
        });
        acc.province = acc.province.or(vote.province);
        acc.image = acc.image.or(vote.image);
        if let Some(option) = VoteOption::from_label(vote.option) {
            acc.tally.record(option);
        }
        members
    });

    members
        .into_iter()
        .map(|(person, acc)| {
            MemberVoteSummary::from_tally(
                person.to_string(),
                acc.province.map(str::to_string),
                acc.image.map(str::to_string),
                acc.tally,
            )
        })
        .collect()
}

/// Member summaries of vote-detail rows, with portraits from the person records
pub fn summarize_vote_details(details: &[VoteDetail], persons: &[Person]) -> Vec<MemberVoteSummary> {
    let images: HashMap<&str, &str> = persons
        .iter()
        .filter_map(|p| p.image.as_deref().map(|image| (p.name.as_str(), image)))
        .collect();

    summarize_members(details.iter().map(|row| MemberVote {
        person: &row.person,
        province: row.province.as_deref(),
        image: images.get(row.person.as_str()).copied(),
        option: &row.option,
    }))
}

/// Sort by votes cast, most active first. Equal members keep their order.
pub fn sort_by_total_cast(summaries: &mut [MemberVoteSummary]) {
    summaries.sort_by(|a, b| b.total_cast.cmp(&a.total_cast));
}

/// Members of one province, most active first
pub fn for_province(summaries: &[MemberVoteSummary], province: &str) -> Vec<MemberVoteSummary> {
    let mut selected: Vec<MemberVoteSummary> = summaries
        .iter()
        .filter(|s| s.province.as_deref() == Some(province))
        .cloned()
        .collect();
    sort_by_total_cast(&mut selected);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(person: &str, province: &str, option: VoteOption) -> VoteDetail {
        VoteDetail {
            title: "bill".to_string(),
            person: person.to_string(),
            province: Some(province.to_string()),
            option: option.label().to_string(),
        }
    }

    #[test]
    fn test_crosstab_counts_and_total_cast() {
        let details = vec![
            detail("a", "ภูเก็ต", VoteOption::Agree),
            detail("a", "ภูเก็ต", VoteOption::Absent),
            detail("a", "ภูเก็ต", VoteOption::NoVote),
            detail("b", "ระยอง", VoteOption::Disagree),
        ];
        let persons = vec![Person {
            name: "a".to_string(),
            province: Some("ภูเก็ต".to_string()),
            party: None,
            image: Some("a.png".to_string()),
            membership: None,
        }];

        let summaries = summarize_vote_details(&details, &persons);
        assert_eq!(summaries.len(), 2);

        let a = &summaries[0];
        assert_eq!((a.agree, a.no_vote, a.absent), (1, 1, 1));
        assert_eq!(a.total_cast, 2);
        assert_eq!(a.total_votes(), 3);
        assert_eq!(a.image.as_deref(), Some("a.png"));
        assert_eq!(summaries[1].image, None);
    }

    #[test]
    fn test_percentages_and_majority() {
        let details = vec![
            detail("a", "p", VoteOption::Agree),
            detail("a", "p", VoteOption::Disagree),
            detail("a", "p", VoteOption::Disagree),
            detail("a", "p", VoteOption::Agree),
        ];
        let summaries = summarize_vote_details(&details, &[]);
        let summary = &summaries[0];
        assert_eq!(summary.agree_percent(), 50.0);
        assert_eq!(summary.disagree_percent(), 50.0);
        assert_eq!(summary.majority_action(), Some(VoteOption::Agree));
    }

    #[test]
    fn test_member_without_votes() {
        let summaries = summarize_members([MemberVote {
            person: "a",
            province: None,
            image: None,
            option: "unknown",
        }]);
        let summary = &summaries[0];
        assert_eq!(summary.total_votes(), 0);
        assert_eq!(summary.agree_percent(), 0.0);
        assert_eq!(summary.majority_action(), None);
    }

    #[test]
    fn test_province_and_image_from_first_vote_carrying_them() {
        let votes = [
            MemberVote {
                person: "a",
                province: None,
                image: None,
                option: VoteOption::Agree.label(),
            },
            MemberVote {
                person: "a",
                province: Some("ภูเก็ต"),
                image: Some("a.png"),
                option: VoteOption::Agree.label(),
            },
            MemberVote {
                person: "a",
                province: Some("ระยอง"),
                image: Some("other.png"),
                option: VoteOption::Agree.label(),
            },
        ];
        let summaries = summarize_members(votes);
        assert_eq!(summaries[0].province.as_deref(), Some("ภูเก็ต"));
        assert_eq!(summaries[0].image.as_deref(), Some("a.png"));
        assert_eq!(summaries[0].agree, 3);
    }

    #[test]
    fn test_for_province_sorts_by_total_cast() {
        let details = vec![
            detail("a", "p", VoteOption::Agree),
            detail("b", "p", VoteOption::Agree),
            detail("b", "p", VoteOption::Abstain),
            detail("c", "q", VoteOption::Agree),
            detail("d", "p", VoteOption::Absent),
        ];
        let summaries = summarize_vote_details(&details, &[]);
        let names: Vec<String> = for_province(&summaries, "p").into_iter().map(|s| s.person).collect();
        assert_eq!(names, vec!["b", "a", "d"]);
    }

    #[test]
    fn test_reads_asset_keys() {
        let json = r#"{
            "person": "a",
            "province": "ภูเก็ต",
            "image": null,
            "เห็นด้วย": 10,
            "ไม่เห็นด้วย": 2,
            "งดออกเสียง": 1,
            "ไม่ลงคะแนนเสียง": 0,
            "ลา / ขาดลงมติ": 3,
            "รวมลงมติ": 13
        }"#;
        let summary: MemberVoteSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.agree, 10);
        assert_eq!(summary.absent, 3);
        assert_eq!(summary.total_cast, 13);
    }
}
