use crate::config::Config;
use crate::loader::read_json;
use crate::politigraph::{IngestOptions, PolitigraphClient};
use crate::summary::{for_province, MemberVoteSummary};
use log::{debug, warn};
use std::path::PathBuf;

/// Per-province member summaries, read from a static asset or the live API.
///
/// Nothing here fails: a source that cannot be read is logged and the next
/// one is tried, and when none is left the result is empty.
#[derive(Debug, Clone, Default)]
pub struct ProvinceSummarySource {
    asset: Option<PathBuf>,
    client: Option<PolitigraphClient>,
}

impl ProvinceSummarySource {
    pub fn new(asset: Option<PathBuf>, client: Option<PolitigraphClient>) -> Self {
        Self { asset, client }
    }

    /// Source described by the configuration
    pub fn from_config(config: &Config) -> Self {
        let client = config.graphql_endpoint.as_ref().map(|endpoint| {
            PolitigraphClient::new(
                endpoint.clone(),
                IngestOptions {
                    term: config.term,
                    excluded_options: config.excluded_options.clone(),
                },
            )
        });
        Self::new(config.summary_asset.clone(), client)
    }

    /// Members of `province`, most active first
    pub async fn load(&self, province: &str) -> Vec<MemberVoteSummary> {
        if let Some(asset) = &self.asset {
            match read_json::<Vec<MemberVoteSummary>>(asset).await {
                Ok(summaries) => {
                    let selected = for_province(&summaries, province);
                    if !selected.is_empty() {
                        debug!("province summary for {} from {}", province, asset.display());
                        return selected;
                    }
                    debug!("{} has no rows for {}", asset.display(), province);
                }
                Err(e) => warn!("summary asset {} unavailable: {}", asset.display(), e),
            }
        }

        if let Some(client) = &self.client {
            match client.province_summary(province).await {
                Ok(summaries) => return summaries,
                Err(e) => warn!("live summary query for {} failed: {}", province, e),
            }
        }

        Vec::new()
    }
}
