use crate::adapters::{InMemoryPeriodStore, RestPeriodStore};
use crate::core::context::ReadRepairPolicy;
use crate::core::filter::FilterColumns;
use crate::domain::ports::{ConfigProvider, PeriodStore};
use crate::utils::error::{PeriodError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_TABLE: &str = "academic_periods";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub columns: FilterColumns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Rest,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    pub timeout_seconds: Option<u64>,
    pub seed_file: Option<String>, // memory 後端的初始資料 (JSON)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub read_repair: ReadRepairPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PeriodError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有設定檔時，直接從環境變數組出 REST 後端
    pub fn from_env() -> Result<Self> {
        let endpoint = env::var("PERIOD_STORE_URL").map_err(|_| PeriodError::ConfigError {
            message: "PERIOD_STORE_URL environment variable is required".to_string(),
        })?;

        Ok(Self {
            store: StoreConfig {
                backend: StoreBackend::Rest,
                endpoint: Some(endpoint),
                api_key: env::var("PERIOD_STORE_KEY").ok(),
                table: env::var("PERIOD_STORE_TABLE").unwrap_or_else(|_| default_table()),
                timeout_seconds: env::var("PERIOD_STORE_TIMEOUT")
                    .ok()
                    .and_then(|value| value.parse().ok()),
                seed_file: None,
            },
            policy: PolicyConfig::default(),
            logging: LoggingConfig::default(),
            columns: FilterColumns::default(),
        })
    }

    /// 替換環境變數 (例如 ${PERIOD_STORE_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PeriodError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_identifier("store.table", &self.store.table)?;
        validation::validate_range("store.timeout_seconds", self.timeout_seconds(), 1, 120)?;

        match self.store.backend {
            StoreBackend::Rest => {
                let endpoint = validation::validate_required_field("store.endpoint", &self.store.endpoint)?;
                validation::validate_url("store.endpoint", endpoint)?;

                if let Some(key) = &self.store.api_key {
                    if key.contains("${") {
                        return Err(PeriodError::ConfigValidationError {
                            field: "store.api_key".to_string(),
                            message: format!("Unresolved environment variable in '{}'", key),
                        });
                    }
                    validation::validate_non_empty_string("store.api_key", key)?;
                }
            }
            StoreBackend::Memory => {
                if let Some(seed) = &self.store.seed_file {
                    validation::validate_non_empty_string("store.seed_file", seed)?;
                    if !Path::new(seed).is_file() {
                        return Err(PeriodError::ConfigValidationError {
                            field: "store.seed_file".to_string(),
                            message: format!("Seed file '{}' does not exist", seed),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.store.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn read_repair(&self) -> ReadRepairPolicy {
        self.policy.read_repair
    }

    /// 依設定建立儲存區；memory 後端沒有 seed_file 時為空集合
    pub async fn open_store(&self) -> Result<Arc<dyn PeriodStore>> {
        match self.store.backend {
            StoreBackend::Rest => {
                tracing::debug!("Using REST period store at {}", self.store_endpoint());
                Ok(Arc::new(RestPeriodStore::from_config(self)?))
            }
            StoreBackend::Memory => {
                let store = match &self.store.seed_file {
                    Some(seed) => {
                        tracing::debug!("Seeding in-memory period store from {}", seed);
                        InMemoryPeriodStore::from_seed_file(seed).await?
                    }
                    None => InMemoryPeriodStore::default(),
                };
                Ok(Arc::new(store))
            }
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn store_endpoint(&self) -> &str {
        self.store.endpoint.as_deref().unwrap_or_default()
    }

    fn api_key(&self) -> Option<&str> {
        self.store.api_key.as_deref()
    }

    fn table_name(&self) -> &str {
        &self.store.table
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_rest_config_with_defaults() {
        let toml_content = r#"
[store]
endpoint = "https://school.example.com"
api_key = "anon-key"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert_eq!(config.table_name(), "academic_periods");
        assert_eq!(config.timeout_seconds(), 10);
        assert_eq!(config.read_repair(), ReadRepairPolicy::Persist);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.columns.period_id, "period_id");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_logging_and_columns_sections() {
        let toml_content = r#"
[store]
backend = "memory"

[policy]
read_repair = "warn_only"

[logging]
level = "debug"
format = "json"

[columns]
period_id = "semester_id"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.read_repair(), ReadRepairPolicy::WarnOnly);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.columns.period_id, "semester_id");
        assert_eq!(config.columns.year, "year");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ACADEMIC_PERIOD_TEST_KEY", "service-role-key");

        let toml_content = r#"
[store]
endpoint = "https://school.example.com"
api_key = "${ACADEMIC_PERIOD_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_key(), Some("service-role-key"));
    }

    #[test]
    fn test_unresolved_env_var_fails_validation() {
        let toml_content = r#"
[store]
endpoint = "https://school.example.com"
api_key = "${ACADEMIC_PERIOD_SURELY_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PeriodError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_rest_backend_requires_endpoint() {
        let config = TomlConfig::from_toml_str("[store]\ntable = \"periods\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(PeriodError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_memory_backend_rejects_missing_seed_file() {
        let config = TomlConfig::from_toml_str(
            "[store]\nbackend = \"memory\"\nseed_file = \"/nonexistent/periods.json\"\n",
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(PeriodError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let result = TomlConfig::from_toml_str("[store\nendpoint = 1");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_memory_backend_from_file_with_seed() {
        let mut seed = NamedTempFile::new().unwrap();
        write!(
            seed,
            r#"[{{"id":"p1","year":"2025/2026","semesterNumber":1,"isActive":true,
                 "startDate":"2025-07-01","endDate":"2025-12-31"}}]"#
        )
        .unwrap();

        let mut config_file = NamedTempFile::new().unwrap();
        write!(
            config_file,
            "[store]\nbackend = \"memory\"\nseed_file = \"{}\"\n",
            seed.path().display().to_string().replace('\\', "/")
        )
        .unwrap();

        let config = TomlConfig::from_file(config_file.path()).unwrap();
        assert!(config.validate().is_ok());

        let store = config.open_store().await.unwrap();
        assert_eq!(store.find_active().await.unwrap().len(), 1);
    }
}
