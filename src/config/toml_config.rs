use crate::adapters::webdriver::FormLocators;
use crate::core::engine::{EngineSettings, DAY_PLACEHOLDER};
use crate::core::placement::{PlacementSettings, MINIMAL_SUM, PRICE_CELL, QUANTITY_CELL};
use crate::core::retry::RetryPolicy;
use crate::core::RunMode;
use crate::utils::error::{OrderError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    pub source: SourceConfig,
    pub form: FormConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub spreadsheet_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    pub menu_url_template: Option<String>,
    pub webdriver_url: Option<String>,
    pub browser: Option<String>,
    pub headless: Option<bool>,
    pub page_load_timeout_seconds: Option<u64>,
    pub minimal_sum: Option<i64>,
    /// 依表單上的順序填入：姓名、地址、電話
    pub credentials: Vec<String>,
    pub unreachable_markers: Option<Vec<String>>,
    pub compute_delay_seconds: Option<u64>,
    pub settle_delay_seconds: Option<u64>,
    pub unreachable_delay_seconds: Option<u64>,
    pub price_cell: Option<usize>,
    pub quantity_cell: Option<usize>,
    #[serde(default)]
    pub locators: FormLocators,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryConfig {
    pub fetch_attempts: Option<usize>,
    pub fetch_delay_seconds: Option<u64>,
    pub placement_attempts: Option<usize>,
    pub placement_delay_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub file: Option<String>,
}

const DEFAULT_MENU_URL: &str = "http://obed.in.ua/menu/{day}/index.php";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const DEFAULT_ATTEMPTS: usize = 5;
const DEFAULT_RETRY_DELAY_SECONDS: u64 = 60;

impl OrderConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OrderError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| OrderError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${LUNCH_PHONE})，帳號資料不必寫進檔案
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| OrderError::config(format!("Invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn menu_url_template(&self) -> &str {
        self.form
            .menu_url_template
            .as_deref()
            .unwrap_or(DEFAULT_MENU_URL)
    }

    pub fn webdriver_url(&self) -> &str {
        self.form
            .webdriver_url
            .as_deref()
            .unwrap_or(DEFAULT_WEBDRIVER_URL)
    }

    pub fn browser(&self) -> &str {
        self.form.browser.as_deref().unwrap_or("chrome")
    }

    pub fn headless(&self) -> bool {
        self.form.headless.unwrap_or(false)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(30))
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.form.page_load_timeout_seconds.unwrap_or(3))
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.logging.file.as_ref().map(PathBuf::from)
    }

    pub fn fetch_retry(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.fetch_attempts.unwrap_or(DEFAULT_ATTEMPTS),
            Duration::from_secs(
                self.retry
                    .fetch_delay_seconds
                    .unwrap_or(DEFAULT_RETRY_DELAY_SECONDS),
            ),
        )
    }

    pub fn placement_retry(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.placement_attempts.unwrap_or(DEFAULT_ATTEMPTS),
            Duration::from_secs(
                self.retry
                    .placement_delay_seconds
                    .unwrap_or(DEFAULT_RETRY_DELAY_SECONDS),
            ),
        )
    }

    pub fn placement_settings(&self, mode: RunMode) -> PlacementSettings {
        PlacementSettings {
            mode,
            credentials: self.form.credentials.clone(),
            minimal_sum: self.form.minimal_sum.unwrap_or(MINIMAL_SUM),
            price_cell: self.form.price_cell.unwrap_or(PRICE_CELL),
            quantity_cell: self.form.quantity_cell.unwrap_or(QUANTITY_CELL),
            compute_delay: Duration::from_secs(self.form.compute_delay_seconds.unwrap_or(1)),
            settle_delay: Duration::from_secs(self.form.settle_delay_seconds.unwrap_or(10)),
        }
    }

    pub fn engine_settings(&self, mode: RunMode) -> EngineSettings {
        EngineSettings {
            spreadsheet_url: self.source.spreadsheet_url.clone(),
            menu_url_template: self.menu_url_template().to_string(),
            fetch_retry: self.fetch_retry(),
            placement_retry: self.placement_retry(),
            unreachable_markers: self.form.unreachable_markers.clone().unwrap_or_else(|| {
                vec![
                    "This site can’t be reached".to_string(),
                    "This site can't be reached".to_string(),
                ]
            }),
            unreachable_delay: Duration::from_secs(
                self.form.unreachable_delay_seconds.unwrap_or(60),
            ),
            placement: self.placement_settings(mode),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        // 先擋下沒替換的 ${VAR}，免得把佔位符當成帳號資料送出
        validation::validate_env_resolved("source.spreadsheet_url", &self.source.spreadsheet_url)?;
        validation::validate_env_resolved("form.menu_url_template", self.menu_url_template())?;
        validation::validate_env_resolved("form.webdriver_url", self.webdriver_url())?;
        for credential in &self.form.credentials {
            validation::validate_env_resolved("form.credentials", credential)?;
        }
        if let Some(file) = &self.logging.file {
            validation::validate_env_resolved("logging.file", file)?;
        }

        validation::validate_url("source.spreadsheet_url", &self.source.spreadsheet_url)?;
        validation::validate_url_template(
            "form.menu_url_template",
            self.menu_url_template(),
            DAY_PLACEHOLDER,
        )?;
        validation::validate_url("form.webdriver_url", self.webdriver_url())?;
        validation::validate_non_empty_list("form.credentials", &self.form.credentials)?;

        validation::validate_positive_number(
            "retry.fetch_attempts",
            self.fetch_retry().max_tries,
            1,
        )?;
        validation::validate_positive_number(
            "retry.placement_attempts",
            self.placement_retry().max_tries,
            1,
        )?;

        Ok(())
    }
}

impl Validate for OrderConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
