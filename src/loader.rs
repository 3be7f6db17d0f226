use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{DataSet, Fact, Person, VoteDetail};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Loads the three source collections from the data directory
pub struct DataLoader {
    config: Config,
}

impl DataLoader {
    /// Create a new loader with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Read persons, facts and vote details concurrently.
    ///
    /// Any missing or malformed file fails the whole load.
    pub async fn load(&self) -> Result<DataSet> {
        let person_path = self.config.person_path();
        let fact_path = self.config.fact_path();
        let vote_detail_path = self.config.vote_detail_path();

        let (persons, facts, vote_details) = tokio::try_join!(
            read_json::<Vec<Person>>(&person_path),
            read_json::<Vec<Fact>>(&fact_path),
            read_json::<Vec<VoteDetail>>(&vote_detail_path),
        )?;

        info!(
            "loaded {} persons, {} facts, {} vote details from {}",
            persons.len(),
            facts.len(),
            vote_details.len(),
            self.config.data_dir.display()
        );

        Ok(DataSet {
            persons,
            facts,
            vote_details,
        })
    }
}

/// Read and parse one JSON file
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("reading {}", path.display());
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::DataFile {
            path: path.display().to_string(),
            source,
        })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Write a value as pretty JSON, creating parent directories as needed
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoteOption;

    #[tokio::test]
    async fn test_load_reads_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let persons = vec![Person {
            name: "a".to_string(),
            province: Some("ภูเก็ต".to_string()),
            party: None,
            image: None,
            membership: None,
        }];
        let details = vec![VoteDetail {
            title: "bill".to_string(),
            person: "a".to_string(),
            province: Some("ภูเก็ต".to_string()),
            option: VoteOption::Agree.label().to_string(),
        }];
        write_json(&dir.path().join("person.json"), &persons).await.unwrap();
        write_json(&dir.path().join("fact.json"), &Vec::<Fact>::new()).await.unwrap();
        write_json(&dir.path().join("vote_detail.json"), &details).await.unwrap();

        let data = DataLoader::new(Config::new(dir.path())).load().await.unwrap();
        assert_eq!(data.persons, persons);
        assert!(data.facts.is_empty());
        assert_eq!(data.vote_details, details);
    }

    #[tokio::test]
    async fn test_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataLoader::new(Config::new(dir.path())).load().await.unwrap_err();
        match err {
            Error::DataFile { path, .. } => assert!(path.ends_with(".json")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.json");
        tokio_test::block_on(async {
            write_json(&path, &["bill-1", "bill-2"]).await.unwrap();
            let events: Vec<String> = read_json(&path).await.unwrap();
            assert_eq!(events, vec!["bill-1", "bill-2"]);
        });
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "[{").await.unwrap();
        let err = read_json::<Vec<Person>>(&path).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
