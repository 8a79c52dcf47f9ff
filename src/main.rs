use anyhow::Context;
use chrono::Datelike;
use clap::Parser;
use lunch_order::utils::{logger, validation::Validate};
use lunch_order::{
    CliConfig, HttpOrderSource, OrderConfig, OrderEngine, OrderError, PlacementOutcome, Profile,
    RunOutcome, WebDriverLauncher,
};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();

    let (profile, config_path, config) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            // 還沒讀到 log 檔設定，只能先輸出到終端機
            fail(&e, logger::init_cli_logger(cli.verbose, None).is_ok())
        }
    };

    if let Err(e) = logger::init_cli_logger(cli.verbose, config.log_file().as_deref()) {
        let e = anyhow::Error::new(e).context("Failed to open the log file");
        fail(&e, logger::init_cli_logger(cli.verbose, None).is_ok());
    }

    if let Err(e) = run(cli, profile, config_path, config).await {
        fail(&e, true);
    }
}

/// 只在最外層記錄一次，不再往外拋
fn fail(e: &anyhow::Error, logging: bool) -> ! {
    if logging {
        match e.downcast_ref::<OrderError>() {
            Some(order_error) => {
                tracing::error!(
                    "❌ Error in main ({:?}): {:#}",
                    order_error.category(),
                    e
                );
                tracing::error!("💡 Suggestion: {}", order_error.recovery_suggestion());
            }
            None => tracing::error!("❌ Error in main: {:#}", e),
        }
    } else {
        eprintln!("❌ {:#}", e);
    }
    std::process::exit(1);
}

fn load_config(cli: &CliConfig) -> anyhow::Result<(Profile, PathBuf, OrderConfig)> {
    let profile = match cli.profile {
        Some(profile) => profile,
        None => Profile::from_env()?,
    };
    let config_path = cli.config_path(profile);
    let config = OrderConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load config file '{}'", config_path.display()))?;
    Ok((profile, config_path, config))
}

async fn run(
    cli: CliConfig,
    profile: Profile,
    config_path: PathBuf,
    config: OrderConfig,
) -> anyhow::Result<()> {
    tracing::info!("🚀 START");
    tracing::info!(
        "📁 Using profile '{}' from {}",
        profile.name(),
        config_path.display()
    );
    config.validate()?;

    let mode = cli.run_mode(profile);
    tracing::info!(
        "Using credentials {:?}, mode {:?}",
        config.form.credentials,
        mode
    );

    let source = HttpOrderSource::new(config.source_timeout())?;
    let launcher = WebDriverLauncher::new(
        config.webdriver_url(),
        config.browser(),
        config.headless(),
        config.page_load_timeout(),
        config.form.locators.clone(),
    );
    let engine = OrderEngine::new(source, launcher, config.engine_settings(mode));

    let today = chrono::Local::now().weekday();
    let outcome = engine.run(cli.order_day(today)).await?;

    match outcome {
        RunOutcome::Placed(PlacementOutcome::Submitted { total }) => {
            tracing::info!("✅ Order submitted, total {}", total)
        }
        RunOutcome::Placed(PlacementOutcome::DryRun { total }) => {
            tracing::info!("✅ Dry run finished, total {}", total)
        }
        RunOutcome::Placed(PlacementOutcome::BelowMinimum { total, minimum }) => {
            tracing::warn!("Order not sent: total {} is below {}", total, minimum)
        }
        other => tracing::info!("Nothing was ordered: {:?}", other),
    }

    Ok(())
}
