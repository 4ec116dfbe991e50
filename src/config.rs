use crate::error::CatalogError;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PROJECT_ID: &str = "lnk8ymnf";
const DEFAULT_DATASET: &str = "production";
const DEFAULT_API_VERSION: &str = "2024-01-01";
const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sanity: SanityConfig,
    pub timeout: Duration,
}

/// Connection settings for the content store.
#[derive(Debug, Clone, PartialEq)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    pub token: Option<String>,
}

impl SanityConfig {
    pub fn query_url(&self) -> String {
        let host = if self.use_cdn { "apicdn" } else { "api" };
        format!(
            "https://{}.{}.sanity.io/v{}/data/query/{}",
            self.project_id, host, self.api_version, self.dataset
        )
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Default)]
pub struct Overrides {
    pub project_id: Option<String>,
    pub dataset: Option<String>,
    pub api_version: Option<String>,
    pub no_cdn: bool,
    pub timeout_ms: Option<u64>,
}

/// Environment values, read once so loading can be tested without
/// touching the process environment.
#[derive(Debug, Default)]
struct EnvValues {
    project_id: Option<String>,
    dataset: Option<String>,
    api_version: Option<String>,
    timeout_ms: Option<u64>,
    token: Option<String>,
}

impl EnvValues {
    fn from_process() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        EnvValues {
            project_id: var("CYCLE_CATALOG_PROJECT_ID"),
            dataset: var("CYCLE_CATALOG_DATASET"),
            api_version: var("CYCLE_CATALOG_API_VERSION"),
            timeout_ms: var("CYCLE_CATALOG_TIMEOUT_MS").and_then(|v| v.parse().ok()),
            token: var("SANITY_API_TOKEN"),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    sanity: SanityDefaults,
}

#[derive(Debug, Deserialize, Default)]
struct SanityDefaults {
    project_id: Option<String>,
    dataset: Option<String>,
    api_version: Option<String>,
    use_cdn: Option<bool>,
    timeout_ms: Option<u64>,
}

impl AppConfig {
    pub fn load(overrides: Overrides) -> Result<Self, CatalogError> {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cycle-catalog");
        let file_config = load_config_file(&config_dir);
        Self::resolve(overrides, EnvValues::from_process(), file_config)
    }

    // Priority: CLI flags → env vars → config file → defaults
    fn resolve(
        overrides: Overrides,
        env: EnvValues,
        file: ConfigFile,
    ) -> Result<Self, CatalogError> {
        let file = file.sanity;

        let project_id = overrides
            .project_id
            .or(env.project_id)
            .or(file.project_id)
            .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string());

        let dataset = overrides
            .dataset
            .or(env.dataset)
            .or(file.dataset)
            .unwrap_or_else(|| DEFAULT_DATASET.to_string());

        let api_version = overrides
            .api_version
            .or(env.api_version)
            .or(file.api_version)
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let use_cdn = !overrides.no_cdn && file.use_cdn.unwrap_or(true);

        let timeout_ms = overrides
            .timeout_ms
            .or(env.timeout_ms)
            .or(file.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let sanity = SanityConfig {
            project_id,
            dataset,
            api_version,
            use_cdn,
            token: env.token,
        };
        Self::validate(&sanity, timeout_ms)?;

        Ok(AppConfig {
            sanity,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    fn validate(sanity: &SanityConfig, timeout_ms: u64) -> Result<(), CatalogError> {
        let check = |pattern: &str, value: &str, what: &str| -> Result<(), CatalogError> {
            let re = Regex::new(pattern)
                .map_err(|e| CatalogError::InvalidConfig(format!("bad pattern: {}", e)))?;
            if re.is_match(value) {
                Ok(())
            } else {
                Err(CatalogError::InvalidConfig(format!(
                    "{} '{}' is not valid",
                    what, value
                )))
            }
        };

        check(r"^[a-z0-9-]+$", &sanity.project_id, "Project id")?;
        check(r"^[a-z0-9_-]{1,64}$", &sanity.dataset, "Dataset")?;
        check(
            r"^(\d{4}-\d{2}-\d{2}|1)$",
            &sanity.api_version,
            "API version (expected YYYY-MM-DD or 1)",
        )?;
        if timeout_ms == 0 {
            return Err(CatalogError::InvalidConfig(
                "Timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn load_config_file(config_dir: &Path) -> ConfigFile {
    let config_path = config_dir.join("config.toml");
    if !config_path.exists() {
        return ConfigFile::default();
    }
    match std::fs::read_to_string(&config_path) {
        Ok(content) => parse_config_file(&content, &config_path),
        Err(e) => {
            tracing::warn!("Could not read {}: {}", config_path.display(), e);
            ConfigFile::default()
        }
    }
}

fn parse_config_file(content: &str, path: &Path) -> ConfigFile {
    toml::from_str(content).unwrap_or_else(|e| {
        tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
        ConfigFile::default()
    })
}
