pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::{OrderConfig, Profile};

pub use adapters::{http::HttpOrderSource, webdriver::WebDriverLauncher};
pub use crate::core::engine::{EngineSettings, OrderEngine};
pub use domain::model::{OrderDay, PlacementOutcome, RunMode, RunOutcome};
pub use utils::error::{OrderError, Result};
