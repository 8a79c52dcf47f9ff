use crate::config::Profile;
use crate::core::{OrderDay, RunMode};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "lunch-order")]
#[command(about = "Places tomorrow's group lunch order from the shared spreadsheet")]
pub struct CliConfig {
    /// Path to the TOML profile (defaults to config/<profile>.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Profile to run with: test or live (defaults to the ENV variable)
    #[arg(long)]
    pub profile: Option<Profile>,

    /// Order for this weekday instead of tomorrow
    #[arg(long)]
    pub day: Option<OrderDay>,

    /// Fill the form but never confirm, whatever the profile says
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn config_path(&self, profile: Profile) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| profile.default_config_path())
    }

    pub fn run_mode(&self, profile: Profile) -> RunMode {
        if self.dry_run {
            RunMode::Test
        } else {
            profile.run_mode()
        }
    }

    /// 指定的那天，否則是明天（週末沒有送餐時為 None）
    pub fn order_day(&self, today: chrono::Weekday) -> Option<OrderDay> {
        self.day.or_else(|| OrderDay::tomorrow(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_parse_flags() {
        let cli = CliConfig::parse_from([
            "lunch-order",
            "--profile",
            "live",
            "--day",
            "wednesday",
            "--dry-run",
        ]);

        assert_eq!(cli.profile, Some(Profile::Live));
        assert_eq!(cli.day, Some(OrderDay::Wednesday));
        assert_eq!(cli.run_mode(Profile::Live), RunMode::Test);
        assert_eq!(cli.config_path(Profile::Live), PathBuf::from("config/live.toml"));
        assert_eq!(cli.order_day(Weekday::Sat), Some(OrderDay::Wednesday));
    }

    #[test]
    fn test_defaults_to_tomorrow() {
        let cli = CliConfig::parse_from(["lunch-order", "--config", "my.toml"]);

        assert_eq!(cli.config_path(Profile::Test), PathBuf::from("my.toml"));
        assert_eq!(cli.run_mode(Profile::Live), RunMode::Live);
        assert_eq!(cli.order_day(Weekday::Mon), Some(OrderDay::Tuesday));
        assert_eq!(cli.order_day(Weekday::Fri), None);
    }
}
