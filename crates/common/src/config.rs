use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub linear: LinearConfig,
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub team: TeamConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "GithubConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "GithubConfig::default_api_base")]
    pub api_base: String,
}

impl GithubConfig {
    fn default_user_agent() -> String {
        "team-pulse".to_string()
    }

    fn default_api_base() -> String {
        "https://api.github.com".to_string()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            user_agent: Self::default_user_agent(),
            api_base: Self::default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AzureConfig {
    #[serde(default)]
    pub pat: Option<String>,
    #[serde(default = "AzureConfig::default_api_base")]
    pub api_base: String,
}

impl AzureConfig {
    fn default_api_base() -> String {
        "https://dev.azure.com".to_string()
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            pat: None,
            api_base: Self::default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinearConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub initiative_id: String,
    #[serde(default = "LinearConfig::default_api_base")]
    pub api_base: String,
}

impl LinearConfig {
    fn default_api_base() -> String {
        "https://api.linear.app/graphql".to_string()
    }
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            initiative_id: String::new(),
            api_base: Self::default_api_base(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "NotionConfig::default_api_base")]
    pub api_base: String,
    #[serde(default = "NotionConfig::default_version")]
    pub version: String,
}

impl NotionConfig {
    fn default_api_base() -> String {
        "https://api.notion.com".to_string()
    }

    fn default_version() -> String {
        "2022-06-28".to_string()
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: Self::default_api_base(),
            version: Self::default_version(),
        }
    }
}

/// Alias table entry. `key` is one spelling of a teammate's account name;
/// several entries may share a `display_name`.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    pub key: String,
    pub display_name: String,
    #[serde(default)]
    pub tz_offset_hours: i32,
    #[serde(default = "TeamConfig::default_tz_label")]
    pub tz_label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    #[serde(default)]
    pub aliases: Vec<AliasConfig>,
    /// Fallback offset for authors missing from the alias table.
    #[serde(default)]
    pub default_tz_offset_hours: i32,
    #[serde(default = "TeamConfig::default_tz_label")]
    pub default_tz_label: String,
    /// Spellings that identify the operator's own accounts across platforms.
    #[serde(default)]
    pub self_names: Vec<String>,
}

impl TeamConfig {
    fn default_tz_label() -> String {
        "UTC".to_string()
    }
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            aliases: Vec::new(),
            default_tz_offset_hours: 0,
            default_tz_label: Self::default_tz_label(),
            self_names: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    /// Either "github" or "azure".
    pub provider: String,
    pub org: String,
    /// Azure DevOps project; unused for GitHub repositories.
    #[serde(default)]
    pub project: Option<String>,
    pub repo: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
    #[serde(default = "SourcesConfig::default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "SourcesConfig::default_commit_page_size")]
    pub commit_page_size: u32,
}

impl SourcesConfig {
    const fn default_fetch_timeout_secs() -> u64 {
        10
    }

    const fn default_commit_page_size() -> u32 {
        100
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            repositories: Vec::new(),
            fetch_timeout_secs: Self::default_fetch_timeout_secs(),
            commit_page_size: Self::default_commit_page_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "PipelineConfig::default_lookback_days")]
    pub lookback_days: u32,
    /// How long a finished report stays fresh for the API before a rebuild.
    #[serde(default = "PipelineConfig::default_snapshot_ttl_secs")]
    pub snapshot_ttl_secs: u64,
}

impl PipelineConfig {
    const fn default_lookback_days() -> u32 {
        7
    }

    const fn default_snapshot_ttl_secs() -> u64 {
        300
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookback_days: Self::default_lookback_days(),
            snapshot_ttl_secs: Self::default_snapshot_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_bind")]
    pub bind: String,
}

impl ApiConfig {
    fn default_bind() -> String {
        "0.0.0.0:8080".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "ObservabilityConfig::default_metrics_path")]
    pub metrics_path: String,
}

impl ObservabilityConfig {
    fn default_metrics_path() -> String {
        "/metrics".to_string()
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_path: Self::default_metrics_path(),
        }
    }
}
