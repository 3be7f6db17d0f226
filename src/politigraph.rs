//! Client for the Politigraph GraphQL API.
//!
//! Fetches every person with their memberships and votes, then flattens the
//! nested response into one [`VoteRecord`] per person, vote event and
//! organization of the requested parliamentary term.

use crate::error::{Error, Result};
use crate::summary::{summarize_members, MemberVote, MemberVoteSummary};
use crate::types::{Person, VoteDetail};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Public Politigraph endpoint
pub const DEFAULT_ENDPOINT: &str = "https://politigraph.wevis.info/graphql";

/// Organization classification of the lower house
pub const HOUSE_OF_REPRESENTATIVES: &str = "HOUSE_OF_REPRESENTATIVE";

const PEOPLE_QUERY: &str = r#"
query ($where: OrganizationWhere){
  people {
    name
    image
    memberships {
      province
    }
    votes {
      option
      vote_events {
        title
        result
        organizations (where: $where){
          name
          term
        }
      }
    }
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PeopleData {
    people: Vec<ApiPerson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiPerson {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub memberships: Vec<ApiMembership>,
    #[serde(default)]
    pub votes: Vec<ApiVote>,
}

impl ApiPerson {
    /// Province of the latest membership that has one
    pub fn province(&self) -> Option<&str> {
        self.memberships
            .iter()
            .filter_map(|m| m.province.as_deref())
            .filter(|p| !p.is_empty())
            .last()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMembership {
    #[serde(default)]
    pub province: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiVote {
    pub option: String,
    #[serde(default)]
    pub vote_events: Vec<ApiVoteEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiVoteEvent {
    pub title: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub organizations: Vec<ApiOrganization>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiOrganization {
    pub name: String,
    #[serde(default)]
    pub term: Option<u32>,
}

/// One vote of one person on one bill, as flattened from the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub person: String,
    pub province: Option<String>,
    pub option: String,
    pub law: String,
    pub result: Option<String>,
    pub organization: String,
    pub term: u32,
    pub image: Option<String>,
}

/// Which records to keep while flattening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    pub term: u32,
    pub excluded_options: Vec<String>,
}

/// Flatten people into vote records of the requested term
pub fn flatten_people(people: &[ApiPerson], options: &IngestOptions) -> Vec<VoteRecord> {
    let mut records = Vec::new();
    for person in people {
        let province = person.province().map(str::to_string);
        for vote in &person.votes {
            if options.excluded_options.contains(&vote.option) {
                continue;
            }
            for event in &vote.vote_events {
                for org in event
                    .organizations
                    .iter()
                    .filter(|org| org.term == Some(options.term))
                {
                    records.push(VoteRecord {
                        person: person.name.clone(),
                        province: province.clone(),
                        option: vote.option.clone(),
                        law: event.title.clone(),
                        result: event.result.clone(),
                        organization: org.name.clone(),
                        term: options.term,
                        image: person.image.clone(),
                    });
                }
            }
        }
    }
    records
}

/// Person records of the API response
pub fn persons(people: &[ApiPerson]) -> Vec<Person> {
    people
        .iter()
        .map(|p| Person {
            name: p.name.clone(),
            province: p.province().map(str::to_string),
            party: None,
            image: p.image.clone(),
            membership: None,
        })
        .collect()
}

/// Vote-detail rows of flattened records
pub fn vote_details(records: &[VoteRecord]) -> Vec<VoteDetail> {
    records
        .iter()
        .map(|r| VoteDetail {
            title: r.law.clone(),
            person: r.person.clone(),
            province: r.province.clone(),
            option: r.option.clone(),
        })
        .collect()
}

/// Member summaries of flattened records
pub fn member_summaries(records: &[VoteRecord]) -> Vec<MemberVoteSummary> {
    summarize_members(records.iter().map(|r| MemberVote {
        person: &r.person,
        province: r.province.as_deref(),
        image: r.image.as_deref(),
        option: &r.option,
    }))
}

/// HTTP client for the live API
#[derive(Debug, Clone)]
pub struct PolitigraphClient {
    http: reqwest::Client,
    endpoint: String,
    options: IngestOptions,
}

impl PolitigraphClient {
    pub fn new(endpoint: impl Into<String>, options: IngestOptions) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            options,
        }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Run the people query against the lower house
    pub async fn fetch_people(&self) -> Result<Vec<ApiPerson>> {
        let request = GraphQlRequest {
            query: PEOPLE_QUERY,
            variables: json!({ "where": { "classification_EQ": HOUSE_OF_REPRESENTATIVES } }),
        };
        debug!("querying {}", self.endpoint);
        let response: GraphQlResponse<PeopleData> = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.errors.first() {
            return Err(Error::GraphQl(error.message.clone()));
        }
        let data = response
            .data
            .ok_or_else(|| Error::GraphQl("response carried no data".to_string()))?;
        debug!("received {} people", data.people.len());
        Ok(data.people)
    }

    /// Fetch and flatten all vote records of the configured term
    pub async fn fetch_records(&self) -> Result<Vec<VoteRecord>> {
        let people = self.fetch_people().await?;
        Ok(flatten_people(&people, &self.options))
    }

    /// Member summaries of one province, most active first
    pub async fn province_summary(&self, province: &str) -> Result<Vec<MemberVoteSummary>> {
        let records = self.fetch_records().await?;
        Ok(crate::summary::for_province(&member_summaries(&records), province))
    }
}
