use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} returned by {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TSV processing error: {0}")]
    Tsv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Spreadsheet has {rows} rows, row {index} is missing")]
    MissingRow { index: usize, rows: usize },

    #[error("Order row is malformed: column {column} is missing (row has {len} fields)")]
    MalformedRow { column: usize, len: usize },

    #[error("Expected order row for {expected}, found '{found}'")]
    DayMismatch { expected: String, found: String },

    #[error("WebDriver command '{command}' failed: {message}")]
    WebDriver { command: String, message: String },

    #[error("Order form error: {message}")]
    Form { message: String },
}

pub type Result<T> = std::result::Result<T, OrderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Form,
    System,
}

impl OrderError {
    pub fn form(message: impl Into<String>) -> Self {
        OrderError::Form {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        OrderError::ConfigError {
            message: message.into(),
        }
    }

    /// 網路層的暫時性失敗，拉取試算表時可以重試
    pub fn is_network(&self) -> bool {
        matches!(self, OrderError::Http(_) | OrderError::HttpStatus { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            OrderError::Http(_) | OrderError::HttpStatus { .. } => ErrorCategory::Network,
            OrderError::Tsv(_)
            | OrderError::MissingRow { .. }
            | OrderError::MalformedRow { .. }
            | OrderError::DayMismatch { .. } => ErrorCategory::Data,
            OrderError::ConfigError { .. }
            | OrderError::MissingConfigError { .. }
            | OrderError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            OrderError::WebDriver { .. } | OrderError::Form { .. } => ErrorCategory::Form,
            OrderError::Io(_) | OrderError::Serialization(_) => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the spreadsheet URL and network connectivity",
            ErrorCategory::Data => {
                "Check that the spreadsheet layout still matches: names in row 1, Monday..Friday in rows 3..7"
            }
            ErrorCategory::Configuration => "Check the profile TOML file and the ENV variable",
            ErrorCategory::Form => {
                "Check that the WebDriver server is running and the menu page layout has not changed"
            }
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}
