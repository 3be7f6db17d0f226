use serde::{Deserialize, Serialize};
use std::fmt;

/// Type discriminator of the aggregate fact row of a bill (all options combined)
pub const ALL_OPTIONS_TYPE: &str = "All";

/// One of the five canonical vote outcomes.
///
/// The declaration order is the enumeration order used for tie-breaks and
/// legends. The serialized form is the display label used by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VoteOption {
    #[serde(rename = "เห็นด้วย")]
    Agree,
    #[serde(rename = "ไม่เห็นด้วย")]
    Disagree,
    #[serde(rename = "งดออกเสียง")]
    Abstain,
    #[serde(rename = "ไม่ลงคะแนนเสียง")]
    NoVote,
    #[serde(rename = "ลา / ขาดลงมติ")]
    Absent,
}

impl VoteOption {
    /// All options in enumeration order
    pub const ALL: [VoteOption; 5] = [
        VoteOption::Agree,
        VoteOption::Disagree,
        VoteOption::Abstain,
        VoteOption::NoVote,
        VoteOption::Absent,
    ];

    /// Display label, exactly as it appears in the source records
    pub fn label(self) -> &'static str {
        match self {
            VoteOption::Agree => "เห็นด้วย",
            VoteOption::Disagree => "ไม่เห็นด้วย",
            VoteOption::Abstain => "งดออกเสียง",
            VoteOption::NoVote => "ไม่ลงคะแนนเสียง",
            VoteOption::Absent => "ลา / ขาดลงมติ",
        }
    }

    /// Resolve a display label. Unrecognized labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.label() == label)
    }

    /// Slot of this option in a five-way counter array
    pub fn index(self) -> usize {
        match self {
            VoteOption::Agree => 0,
            VoteOption::Disagree => 1,
            VoteOption::Abstain => 2,
            VoteOption::NoVote => 3,
            VoteOption::Absent => 4,
        }
    }

    /// Whether this option counts as exercising the right to vote
    pub fn is_cast(self) -> bool {
        matches!(
            self,
            VoteOption::Agree | VoteOption::Disagree | VoteOption::Abstain
        )
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Party affiliation of a legislator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    /// Display color, e.g. `#FF7F00`
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A legislator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default, alias = "m__province", skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party: Option<Party>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership: Option<String>,
}

impl Person {
    /// Province with blank values treated as missing
    pub fn province(&self) -> Option<&str> {
        self.province.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// One row of the per-bill, per-province outcome table.
///
/// `kind` is either [`ALL_OPTIONS_TYPE`] for the aggregate row of a bill, or
/// repeats the option label on that option's summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub option: String,
    pub province: String,
    #[serde(default)]
    pub agree_count: u32,
    #[serde(default)]
    pub disagree_count: u32,
    #[serde(default)]
    pub abstain_count: u32,
    #[serde(default)]
    pub no_vote_count: u32,
    #[serde(default)]
    pub absent_count: u32,
    #[serde(default)]
    pub portion: f64,
}

impl Fact {
    /// The five counters in enumeration order
    pub fn counts(&self) -> [u32; 5] {
        [
            self.agree_count,
            self.disagree_count,
            self.abstain_count,
            self.no_vote_count,
            self.absent_count,
        ]
    }
}

/// A single legislator's vote on a single bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDetail {
    pub title: String,
    pub person: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    pub option: String,
}

impl VoteDetail {
    /// Canonical option of this row, if the label is recognized
    pub fn vote_option(&self) -> Option<VoteOption> {
        VoteOption::from_label(&self.option)
    }
}

/// The three source collections as loaded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSet {
    pub persons: Vec<Person>,
    pub facts: Vec<Fact>,
    pub vote_details: Vec<VoteDetail>,
}
