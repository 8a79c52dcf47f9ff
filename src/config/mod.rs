#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use toml_config::OrderConfig;

use crate::core::RunMode;
use crate::utils::error::{OrderError, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// 環境變數 `ENV` 選擇的設定檔
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Test,
    Live,
}

impl Profile {
    pub const ENV_VAR: &'static str = "ENV";

    pub fn from_env() -> Result<Self> {
        match std::env::var(Self::ENV_VAR) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Profile::Test),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Profile::Test => "test",
            Profile::Live => "live",
        }
    }

    pub fn default_config_path(self) -> PathBuf {
        PathBuf::from(format!("config/{}.toml", self.name()))
    }

    pub fn run_mode(self) -> RunMode {
        match self {
            Profile::Test => RunMode::Test,
            Profile::Live => RunMode::Live,
        }
    }
}

impl FromStr for Profile {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "test" => Ok(Profile::Test),
            "live" | "prod" => Ok(Profile::Live),
            other => Err(OrderError::InvalidConfigValueError {
                field: Self::ENV_VAR.to_string(),
                value: other.to_string(),
                reason: "Expected 'test' or 'live'".to_string(),
            }),
        }
    }
}
