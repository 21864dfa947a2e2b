//! @ai:module:intent Configuration structs for the RFT harness
//! @ai:module:layer infrastructure
//! @ai:module:public_api HarnessConfig, ServerConfig, TraceConfig, DatasetConfig, BatchConfig, ProbeConfig
//! @ai:module:stateless true

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// @ai:intent Main configuration for the harness
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// @ai:intent Listen address of the endpoint grader
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// @ai:intent Lifetime of tool-call trace records
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

/// @ai:intent Dataset conversion settings
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Puzzles with a different count of numbers are dropped
    #[serde(default = "default_arity")]
    pub arity: usize,
    #[serde(default)]
    pub max_records: Option<usize>,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

/// @ai:intent Batch grading settings
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// @ai:intent Remote grader endpoint checked by `probe`
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_url")]
    pub url: String,
    #[serde(default = "default_rate_limit")]
    pub requests_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            arity: default_arity(),
            max_records: None,
            system_prompt: default_system_prompt(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: default_probe_url(),
            requests_per_minute: default_rate_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7071
}

fn default_ttl_secs() -> u64 {
    30 * 60
}

fn default_arity() -> usize {
    4
}

fn default_system_prompt() -> String {
    "You are playing the Countdown numbers game. Combine every given number exactly once \
     using +, -, *, / and parentheses to reach the target. Respond only with a JSON object \
     of the form {\"expression\": \"<arithmetic expression>\", \"result\": <value>}.\n\n"
        .to_string()
}

fn default_concurrency() -> usize {
    8
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_probe_url() -> String {
    format!("http://{}:{}/grader", default_host(), default_port())
}

fn default_rate_limit() -> u32 {
    60
}

fn default_timeout_secs() -> u64 {
    30
}

impl ServerConfig {
    /// @ai:intent Socket address string for binding
    /// @ai:effects pure
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TraceConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl HarnessConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Load the given file, else `rft-harness.toml` if present, else defaults
    /// @ai:effects fs:read
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

pub const DEFAULT_CONFIG_FILE: &str = "rft-harness.toml";
