use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE: &str = "label-flow.toml";
pub const RC_FILE: &str = ".label-flow-rc";
pub const ENV_PREFIX: &str = "LABEL_FLOW";

/// Main configuration structure for label-flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelFlowConfig {
    pub validation: ValidationConfig,
    pub steps: StepsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Upper bound on a single address validation call
    pub timeout_seconds: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
        }
    }
}

impl ValidationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StepsConfig {
    /// Enable packaging, customs, carrier and payment after the address steps
    pub include_unfinished_steps: bool,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            include_unfinished_steps: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level, used when RUST_LOG is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

impl LabelFlowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (label-flow.toml, .label-flow-rc)
    /// 3. Environment variables (LABEL_FLOW_VALIDATION__TIMEOUT_SECONDS etc.)
    pub fn load() -> Result<Self> {
        Self::load_from_dir(Path::new("."))
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::build(
            dir,
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn build(dir: &Path, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        for name in [CONFIG_FILE, RC_FILE] {
            let path = dir.join(name);
            if path.exists() {
                builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml));
            }
        }

        let config = builder.add_source(environment).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<LabelFlowConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = LabelFlowConfig::load_env_file();
        LabelFlowConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static LabelFlowConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let config = config()?;
    tracing::debug!(
        timeout_seconds = config.validation.timeout_seconds,
        include_unfinished_steps = config.steps.include_unfinished_steps,
        "Configuration loaded successfully"
    );
    Ok(())
}
