use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com/scholar";
const DEFAULT_NUM_RESULTS: usize = 5;
const DEFAULT_MAX_RETRIES: u64 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Same model the sentence-transformers pipeline used
const DEFAULT_SEMANTIC_MODEL: &str = "all-MiniLM-L6-v2";
const DEFAULT_DUPLICATE_THRESHOLD: f32 = 1.0;
const DEFAULT_SIMILAR_THRESHOLD: f32 = 0.75;

const DEFAULT_BOOKS_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";
const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("invalid config: {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Academic search source settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScholarConfig {
    #[serde(default = "default_scholar_url")]
    pub base_url: String,

    /// How many candidate publications to compare against
    #[serde(default = "default_num_results")]
    pub num_results: usize,

    #[serde(default = "default_max_retries")]
    pub max_retries: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SCHOLAR_URL.to_string(),
            num_results: DEFAULT_NUM_RESULTS,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Embedding model and decision thresholds
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_semantic_model")]
    pub model: String,

    /// Score at which a candidate counts as an exact duplicate
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f32,

    /// Score at which the best candidate counts as highly similar
    #[serde(default = "default_similar_threshold")]
    pub similar_threshold: f32,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_SEMANTIC_MODEL.to_string(),
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            similar_threshold: DEFAULT_SIMILAR_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BooksConfig {
    /// Enrich feedback with book metadata
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_books_endpoint")]
    pub endpoint: String,
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_BOOKS_ENDPOINT.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

fn default_scholar_url() -> String {
    DEFAULT_SCHOLAR_URL.to_string()
}

fn default_num_results() -> usize {
    DEFAULT_NUM_RESULTS
}

fn default_max_retries() -> u64 {
    DEFAULT_MAX_RETRIES
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_semantic_model() -> String {
    DEFAULT_SEMANTIC_MODEL.to_string()
}

fn default_duplicate_threshold() -> f32 {
    DEFAULT_DUPLICATE_THRESHOLD
}

fn default_similar_threshold() -> f32 {
    DEFAULT_SIMILAR_THRESHOLD
}

fn default_true() -> bool {
    true
}

fn default_books_endpoint() -> String {
    DEFAULT_BOOKS_ENDPOINT.to_string()
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scholar: ScholarConfig,
    #[serde(default)]
    pub semantic: SemanticConfig,
    #[serde(default)]
    pub books: BooksConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.scholar.base_url).is_err() {
            return Err(ConfigError::invalid(
                "scholar.base_url",
                format!("not a valid url: {}", self.scholar.base_url),
            ));
        }

        if self.scholar.num_results == 0 {
            return Err(ConfigError::invalid(
                "scholar.num_results",
                "must be greater than 0",
            ));
        }

        if self.scholar.max_retries == 0 {
            return Err(ConfigError::invalid(
                "scholar.max_retries",
                "must be greater than 0",
            ));
        }

        let sem = &self.semantic;
        for (field, value) in [
            ("semantic.duplicate_threshold", sem.duplicate_threshold),
            ("semantic.similar_threshold", sem.similar_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be between 0.0 and 1.0, got {value}"),
                ));
            }
        }

        if sem.similar_threshold > sem.duplicate_threshold {
            return Err(ConfigError::invalid(
                "semantic.similar_threshold",
                format!(
                    "must not exceed duplicate_threshold ({} > {})",
                    sem.similar_threshold, sem.duplicate_threshold
                ),
            ));
        }

        if let Err(e) = crate::semantic::embeddings::parse_model_name(&sem.model) {
            return Err(ConfigError::invalid("semantic.model", e.to_string()));
        }

        if self.daemon.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::invalid(
                "daemon.listen",
                format!("not a socket address: {}", self.daemon.listen),
            ));
        }

        Ok(())
    }

    pub fn load_with(base_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base_path = base_path.as_ref();
        std::fs::create_dir_all(base_path)?;
        let config_path = base_path.join(CONFIG_FILE);

        // create new if does not exist
        if !config_path.exists() {
            std::fs::write(&config_path, serde_yml::to_string(&Self::default())?)?;
        }

        let config_str = std::fs::read_to_string(&config_path)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_path_buf();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(self.base_path.join(CONFIG_FILE), config_str)?;
        Ok(())
    }

    /// Where downloaded embedding models are cached.
    pub fn models_dir(&self) -> PathBuf {
        self.base_path.join("models")
    }
}

/// Base directory for config and model cache.
///
/// `TITLECHECK_BASE_PATH` wins, otherwise `~/.local/share/titlecheck`.
pub fn base_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("TITLECHECK_BASE_PATH") {
        return Ok(PathBuf::from(path));
    }

    let home = homedir::my_home()
        .map_err(|e| anyhow::anyhow!("could not determine home directory: {e:?}"))?
        .ok_or_else(|| anyhow::anyhow!("could not determine home directory"))?;
    Ok(home.join(".local/share/titlecheck"))
}
