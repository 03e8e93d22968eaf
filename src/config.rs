use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tickets::{
    TicketExtractor, DEFAULT_RENOVATE_LABEL, DEFAULT_RENOVATE_MARKER, DEFAULT_TICKET_PREFIXES,
};

/// Configuration file structure for relreport.
///
/// Holds the project list and the defaults that the command line can
/// override. Loaded from the current directory, the user config directory or
/// an explicit path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub tickets: TicketsConfig,

    #[serde(default)]
    pub output: OutputConfig,

    /// Projects to report on, in output order
    #[serde(default = "default_projects")]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab instance base URL
    #[serde(default = "default_gitlab_base_url")]
    pub base_url: String,

    /// Largest page requested from the releases endpoint
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Releases per project when no count is given on the command line
    #[serde(default = "default_count")]
    pub default_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TicketsConfig {
    /// Description substring that marks dependency-bot releases
    #[serde(default = "default_renovate_marker")]
    pub renovate_marker: String,

    /// Label shown for dependency-bot releases
    #[serde(default = "default_renovate_label")]
    pub renovate_label: String,

    /// Ticket code prefixes
    #[serde(default = "default_ticket_prefixes")]
    pub prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// A GitLab project and the name its table is printed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Numeric project id or `group/project` path
    pub id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gitlab: GitLabConfig::default(),
            report: ReportConfig::default(),
            tickets: TicketsConfig::default(),
            output: OutputConfig::default(),
            projects: default_projects(),
        }
    }
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            base_url: default_gitlab_base_url(),
            per_page: default_per_page(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_count: default_count(),
        }
    }
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            renovate_marker: default_renovate_marker(),
            renovate_label: default_renovate_label(),
            prefixes: default_ticket_prefixes(),
        }
    }
}

impl TicketsConfig {
    pub fn extractor(&self) -> Result<TicketExtractor> {
        TicketExtractor::new(
            self.renovate_marker.clone(),
            self.renovate_label.clone(),
            self.prefixes.as_slice(),
        )
        .context("Invalid [tickets] configuration")
    }
}

impl std::str::FromStr for Project {
    type Err = String;

    /// Parses `NAME=ID`, as accepted by `--project`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (name, id) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=ID, got '{s}'"))?;
        let (name, id) = (name.trim(), id.trim());
        if name.is_empty() || id.is_empty() {
            return Err(format!("expected NAME=ID, got '{s}'"));
        }
        Ok(Self {
            name: name.to_string(),
            id: id.to_string(),
        })
    }
}

fn default_gitlab_base_url() -> String {
    "https://gitlab.com".to_string()
}

fn default_per_page() -> usize {
    10
}

fn default_count() -> usize {
    3
}

fn default_renovate_marker() -> String {
    DEFAULT_RENOVATE_MARKER.to_string()
}

fn default_renovate_label() -> String {
    DEFAULT_RENOVATE_LABEL.to_string()
}

fn default_ticket_prefixes() -> Vec<String> {
    DEFAULT_TICKET_PREFIXES.iter().map(ToString::to_string).collect()
}

fn default_projects() -> Vec<Project> {
    vec![Project {
        name: "Test".to_string(),
        id: "123456".to_string(),
    }]
}

const CANDIDATES: [&str; 4] = [
    "relreport.toml",
    "relreport.json",
    "relreport.yaml",
    "relreport.yml",
];

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./relreport.toml
    /// 3. ./relreport.json
    /// 4. ./relreport.yaml
    /// 5. ./relreport.yml
    /// 6. `<user config dir>/relreport/relreport.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                warn!(
                    "Config file {} not found, using defaults",
                    path.display()
                );
                return Ok(Self::default());
            }
            return Self::load_from_path(path);
        }

        let user_config = dirs::config_dir().map(|dir| dir.join("relreport").join("relreport.toml"));

        let found = CANDIDATES
            .iter()
            .map(PathBuf::from)
            .chain(user_config)
            .find(|candidate| candidate.exists());

        match found {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }
}
