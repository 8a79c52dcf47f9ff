use crate::core::placement::{place_order, PlacementSettings};
use crate::core::retry::{retry_all, with_retry, RetryPolicy};
use crate::core::source::fetch_orders;
use crate::core::{ExtractedOrder, FormDriver, FormLauncher, OrderDay, OrderSource, RunOutcome};
use crate::utils::error::{OrderError, Result};
use std::time::Duration;

pub const DAY_PLACEHOLDER: &str = "{day}";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub spreadsheet_url: String,
    pub menu_url_template: String,
    pub fetch_retry: RetryPolicy,
    pub placement_retry: RetryPolicy,
    /// 頁面載入失敗時瀏覽器顯示的文字
    pub unreachable_markers: Vec<String>,
    pub unreachable_delay: Duration,
    pub placement: PlacementSettings,
}

impl EngineSettings {
    pub fn menu_url(&self, day: OrderDay) -> String {
        self.menu_url_template.replace(DAY_PLACEHOLDER, day.menu_slug())
    }
}

/// 一次執行：拉試算表、開表單、下單
pub struct OrderEngine<S: OrderSource, L: FormLauncher> {
    source: S,
    launcher: L,
    settings: EngineSettings,
}

impl<S: OrderSource, L: FormLauncher> OrderEngine<S, L> {
    pub fn new(source: S, launcher: L, settings: EngineSettings) -> Self {
        Self {
            source,
            launcher,
            settings,
        }
    }

    pub async fn run(&self, day: Option<OrderDay>) -> Result<RunOutcome> {
        let Some(day) = day else {
            tracing::info!("📅 No delivery tomorrow, nothing to order");
            return Ok(RunOutcome::NotADeliveryDay);
        };

        let fetched = with_retry(
            "fetch_orders",
            &self.settings.fetch_retry,
            OrderError::is_network,
            || fetch_orders(&self.source, &self.settings.spreadsheet_url, day),
        )
        .await?;

        let Some(extracted) = fetched else {
            tracing::warn!("⚠️ Could not fetch the spreadsheet, nothing ordered");
            return Ok(RunOutcome::NothingFetched);
        };

        if extracted.is_empty() {
            tracing::warn!("⚠️ No orders for {}", day);
            return Ok(RunOutcome::NoOrders);
        }

        tracing::info!(
            items = extracted.order.len(),
            portions = extracted.order.total_items(),
            participants = extracted.reported_sums.len(),
            total_sum = extracted.total_sum,
            "📋 Orders collected for {}",
            day
        );

        let driver = self.launcher.launch().await?;
        let result = self.place_with(&driver, day, &extracted).await;

        // session 一定要關，不論下單成功與否
        if let Err(e) = driver.close().await {
            tracing::warn!(error = %e, "Failed to close the form session");
        }

        result
    }

    async fn place_with(
        &self,
        driver: &L::Driver,
        day: OrderDay,
        extracted: &ExtractedOrder,
    ) -> Result<RunOutcome> {
        let url = self.settings.menu_url(day);
        tracing::info!("🌐 Opening menu page: {}", url);
        driver.open(&url).await?;

        let source = driver.page_source().await?;
        if self
            .settings
            .unreachable_markers
            .iter()
            .any(|marker| source.contains(marker.as_str()))
        {
            tracing::error!(
                "❌ Menu page didn't load, waiting {:?} before filling the form",
                self.settings.unreachable_delay
            );
            tokio::time::sleep(self.settings.unreachable_delay).await;
        }

        let placed = with_retry(
            "place_order",
            &self.settings.placement_retry,
            retry_all,
            || place_order(driver, extracted, &self.settings.placement),
        )
        .await?;

        Ok(match placed {
            Some(outcome) => RunOutcome::Placed(outcome),
            None => {
                tracing::error!("❌ Giving up on placing the order for {}", day);
                RunOutcome::PlacementAbandoned
            }
        })
    }
}
