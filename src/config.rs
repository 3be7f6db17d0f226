use crate::color::{ColorPolicy, OpacityBand, Palette};
use crate::error::{Error, Result};
use crate::politigraph::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Option values of the source that are not vote outcomes (names recorded
/// as the "option" of a prime-minister vote)
pub const DEFAULT_EXCLUDED_OPTIONS: [&str; 2] = ["นายชัยเกษม นิติสิริ", "นายอนุทิน ชาญวีรกูล"];

/// Parliamentary term ingested by default
pub const DEFAULT_TERM: u32 = 26;

/// Configuration for loading, aggregation and coloring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub person_file: String,
    pub fact_file: String,
    pub vote_detail_file: String,
    /// Static member-summary asset consulted before the live query
    pub summary_asset: Option<PathBuf>,
    /// GraphQL endpoint of the live fallback; `None` disables it
    pub graphql_endpoint: Option<String>,
    pub term: u32,
    pub excluded_options: Vec<String>,
    pub color_policy: ColorPolicy,
    pub opacity: OpacityBand,
    pub palette: Palette,
}

impl Config {
    /// Create a new default configuration
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            person_file: "person.json".to_string(),
            fact_file: "fact.json".to_string(),
            vote_detail_file: "vote_detail.json".to_string(),
            summary_asset: None,
            graphql_endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            term: DEFAULT_TERM,
            excluded_options: DEFAULT_EXCLUDED_OPTIONS.iter().map(|s| s.to_string()).collect(),
            color_policy: ColorPolicy::default(),
            opacity: OpacityBand::default(),
            palette: Palette::default(),
        }
    }

    /// Parse a YAML configuration. Missing keys keep their defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Load a YAML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::DataFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn person_path(&self) -> PathBuf {
        self.data_dir.join(&self.person_file)
    }

    pub fn fact_path(&self) -> PathBuf {
        self.data_dir.join(&self.fact_file)
    }

    pub fn vote_detail_path(&self) -> PathBuf {
        self.data_dir.join(&self.vote_detail_file)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_data_dir()?;
        self.validate_settings()
    }

    fn validate_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            return Err(Error::Config(format!(
                "Data directory does not exist: {}",
                self.data_dir.display()
            )));
        }

        if !self.data_dir.is_dir() {
            return Err(Error::Config(format!(
                "Data directory is not a directory: {}",
                self.data_dir.display()
            )));
        }
        Ok(())
    }

    /// Validate everything except the data directory
    pub fn validate_settings(&self) -> Result<()> {
        self.opacity.validate()?;

        if let Some(endpoint) = &self.graphql_endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "GraphQL endpoint must be an http(s) URL: {}",
                    endpoint
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("data")
    }
}

/// Builder for creating configurations
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default settings
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: Config::new(data_dir),
        }
    }

    /// Start from a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self {
            config: Config::load(path)?,
        })
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Set the static member-summary asset
    pub fn summary_asset(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.summary_asset = Some(path.into());
        self
    }

    /// Set the GraphQL endpoint of the live fallback
    pub fn graphql_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.graphql_endpoint = Some(endpoint.into());
        self
    }

    /// Disable the live fallback
    pub fn no_live_fallback(mut self) -> Self {
        self.config.graphql_endpoint = None;
        self
    }

    /// Set the parliamentary term to ingest
    pub fn term(mut self, term: u32) -> Self {
        self.config.term = term;
        self
    }

    /// Add an option value to drop during ingestion
    pub fn add_excluded_option(mut self, option: impl Into<String>) -> Self {
        let option = option.into();
        if !self.config.excluded_options.contains(&option) {
            self.config.excluded_options.push(option);
        }
        self
    }

    /// Set the color policy
    pub fn color_policy(mut self, policy: ColorPolicy) -> Self {
        self.config.color_policy = policy;
        self
    }

    /// Set the color policy from string
    pub fn color_policy_str(mut self, policy: &str) -> Result<Self> {
        self.config.color_policy = policy.parse()?;
        Ok(self)
    }

    /// Set the opacity band of the flat policy
    pub fn opacity(mut self, min: f64, max: f64) -> Self {
        self.config.opacity = OpacityBand { min, max };
        self
    }

    /// Replace the color tables
    pub fn palette(mut self, palette: Palette) -> Self {
        self.config.palette = palette;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build a configuration for commands that read no data files
    pub fn build_settings(self) -> Result<Config> {
        self.config.validate_settings()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::types::VoteOption;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.person_path(), PathBuf::from("data/person.json"));
        assert_eq!(config.term, 26);
        assert_eq!(config.opacity, OpacityBand { min: 0.2, max: 0.9 });
        assert_eq!(config.color_policy, ColorPolicy::Flat);
        assert_eq!(config.excluded_options.len(), 2);
    }

    #[test]
    fn test_builder_validates_data_dir() {
        assert!(ConfigBuilder::new("/definitely/not/here").build().is_err());

        let dir = tempfile::tempdir().unwrap();
        let config = ConfigBuilder::new(dir.path())
            .color_policy_str("gradient")
            .unwrap()
            .no_live_fallback()
            .build()
            .unwrap();
        assert_eq!(config.color_policy, ColorPolicy::Gradient);
        assert!(config.graphql_endpoint.is_none());
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigBuilder::new(dir.path()).color_policy_str("sepia").is_err());
        assert!(ConfigBuilder::new(dir.path()).opacity(0.9, 0.2).build().is_err());
        assert!(ConfigBuilder::new(dir.path())
            .graphql_endpoint("ftp://example.org")
            .build()
            .is_err());
    }

    #[test]
    fn test_settings_build_skips_data_dir() {
        let config = ConfigBuilder::new("/definitely/not/here")
            .color_policy_str("gradient")
            .unwrap()
            .build_settings()
            .unwrap();
        assert_eq!(config.color_policy, ColorPolicy::Gradient);

        assert!(ConfigBuilder::new("/definitely/not/here")
            .opacity(0.9, 0.2)
            .build_settings()
            .is_err());
    }

    #[test]
    fn test_yaml_overrides_keep_other_defaults() {
        let yaml = r##"
data_dir: fixtures
color_policy: gradient
opacity:
  min: 0.1
  max: 1.0
palette:
  no_data: "#000000"
  option_colors:
    เห็นด้วย: "0, 0, 255"
"##;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("fixtures"));
        assert_eq!(config.color_policy, ColorPolicy::Gradient);
        assert_eq!(config.opacity.min, 0.1);
        assert_eq!(config.palette.no_data, Rgb::new(0, 0, 0));
        assert_eq!(config.palette.option_colors.len(), 1);
        assert_eq!(config.palette.option_colors[&VoteOption::Agree], Rgb::new(0, 0, 255));
        assert_eq!(config.fact_file, "fact.json");
        assert_eq!(config.palette.gradients.len(), 5);
    }

    #[test]
    fn test_excluded_options_are_deduplicated() {
        let builder = ConfigBuilder::new("data").add_excluded_option("นายอนุทิน ชาญวีรกูล");
        assert_eq!(builder.config.excluded_options.len(), 2);
    }
}
