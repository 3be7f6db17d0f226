//! Filtering, aggregation and coloring of parliamentary voting records.
//!
//! Person, fact and vote-detail collections are loaded from a data directory,
//! grouped by province, narrowed to the selected bill and vote option, and
//! aggregated into per-province stats that drive the map colors.

pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod grouper;
pub mod loader;
pub mod pipeline;
pub mod politigraph;
pub mod source;
pub mod stats;
pub mod summary;
pub mod types;

pub use color::{ColorMapper, ColorPolicy, Legend, MapColor, OpacityBand, Palette, Rgb};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use filter::{FilterResult, RecordFilter, Selection};
pub use pipeline::{Dashboard, FilteredView, ProvinceView, StatsSource};
pub use politigraph::{PolitigraphClient, VoteRecord};
pub use source::ProvinceSummarySource;
pub use stats::{ProvinceStats, ProvinceVoteStats, VoteTally};
pub use summary::MemberVoteSummary;
pub use types::{DataSet, Fact, Person, VoteDetail, VoteOption};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::color::{ColorMapper, ColorPolicy, MapColor, Palette};
    pub use crate::config::{Config, ConfigBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::filter::Selection;
    pub use crate::pipeline::{Dashboard, FilteredView, ProvinceView, StatsSource};
    pub use crate::source::ProvinceSummarySource;
    pub use crate::types::{DataSet, Fact, Person, VoteDetail, VoteOption};
}
