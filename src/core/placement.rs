use crate::core::{
    ExtractedOrder, FormAction, FormDriver, InverseOrder, PlacementOutcome, PriceTable,
    ReportedSums, RunMode,
};
use crate::utils::error::{OrderError, Result};
use std::collections::BTreeMap;
use std::time::Duration;

/// 表單上單價所在的欄
pub const PRICE_CELL: usize = 4;
/// 表單上數量輸入框所在的欄
pub const QUANTITY_CELL: usize = 5;
pub const MINIMAL_SUM: i64 = 200;

/// 下單時需要的設定，由設定檔建立後傳入
#[derive(Debug, Clone)]
pub struct PlacementSettings {
    pub mode: RunMode,
    pub credentials: Vec<String>,
    pub minimal_sum: i64,
    pub price_cell: usize,
    pub quantity_cell: usize,
    pub compute_delay: Duration,
    pub settle_delay: Duration,
}

impl PlacementSettings {
    pub fn new(mode: RunMode, credentials: Vec<String>) -> Self {
        Self {
            mode,
            credentials,
            minimal_sum: MINIMAL_SUM,
            price_cell: PRICE_CELL,
            quantity_cell: QUANTITY_CELL,
            compute_delay: Duration::from_secs(1),
            settle_delay: Duration::from_secs(10),
        }
    }
}

/// 在已開啟的菜單頁面上填單、核對金額，必要時送出
///
/// 核對不符只記 warning；低於最低金額時不送出並回傳 [`PlacementOutcome::BelowMinimum`]。
/// 表單操作失敗會回傳錯誤，由外層的重試處理。
pub async fn place_order<D: FormDriver + ?Sized>(
    driver: &D,
    extracted: &ExtractedOrder,
    settings: &PlacementSettings,
) -> Result<PlacementOutcome> {
    let rows = driver.item_row_count().await?;
    tracing::debug!("Order form has {} item rows", rows);

    let mut prices = PriceTable::new();
    for (item_id, count) in extracted.order.iter() {
        let index = item_id as usize;
        if !(1..=rows).contains(&index) {
            tracing::warn!(
                item_id,
                participants = ?extracted.inverse_order.participants(item_id),
                "⚠️ Bad item id, the form has only {} rows",
                rows
            );
            continue;
        }

        let row = index - 1;
        driver
            .write_cell_input(row, settings.quantity_cell, &count.to_string())
            .await?;
        let price_text = driver.read_cell_input(row, settings.price_cell).await?;
        let price = parse_amount(&price_text, &format!("price of item {}", item_id))?;
        prices.insert(item_id, price);
        tracing::debug!(item_id, count, price, "Filled item");
    }

    let mismatches = check_sums(&extracted.inverse_order, &extracted.reported_sums, &prices);
    if !mismatches.is_empty() {
        tracing::info!("{} participant(s) reported a different sum", mismatches.len());
    }

    for (index, value) in settings.credentials.iter().enumerate() {
        driver.fill_credential_field(index, value).await?;
    }

    driver.trigger(FormAction::ComputeTotal).await?;
    tokio::time::sleep(settings.compute_delay).await;

    let total = parse_amount(&driver.read_total().await?, "form total")?;
    if total != extracted.total_sum {
        tracing::warn!(
            final_sum = total,
            total_sum = extracted.total_sum,
            "⚠️ Form total differs from the reported total"
        );
    }

    if total < settings.minimal_sum {
        tracing::error!(
            final_sum = total,
            minimal_sum = settings.minimal_sum,
            "❌ Order total is below the minimal sum, not submitting"
        );
        return Ok(PlacementOutcome::BelowMinimum {
            total,
            minimum: settings.minimal_sum,
        });
    }

    let outcome = if settings.mode.submits() {
        driver.trigger(FormAction::Confirm).await?;
        tracing::info!(total, "✅ Order confirmed");
        PlacementOutcome::Submitted { total }
    } else {
        tracing::info!(total, "🔍 Dry run, order was not confirmed");
        PlacementOutcome::DryRun { total }
    };

    tokio::time::sleep(settings.settle_delay).await;
    Ok(outcome)
}

/// 用表單上的單價重算每個人應付的金額，與自填金額比對
///
/// 只回報不符的人，從不失敗。表單上找不到的品項以 0 計。
pub fn check_sums(
    inverse_order: &InverseOrder,
    reported_sums: &ReportedSums,
    prices: &PriceTable,
) -> Vec<SumMismatch> {
    let mut true_sums: BTreeMap<&str, i64> = BTreeMap::new();
    for (item_id, names) in inverse_order.iter() {
        let price = prices.get(&item_id).copied().unwrap_or(0);
        for name in names {
            *true_sums.entry(name.as_str()).or_default() += price;
        }
    }

    let mut mismatches = Vec::new();
    for (name, true_sum) in true_sums {
        let reported_sum = reported_sums.get(name).copied().unwrap_or(0);
        if true_sum != reported_sum {
            tracing::warn!(
                participant = name,
                true_sum,
                reported_sum,
                "⚠️ Reported sum differs from the menu prices"
            );
            mismatches.push(SumMismatch {
                participant: name.to_string(),
                true_sum,
                reported_sum,
            });
        }
    }
    mismatches
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumMismatch {
    pub participant: String,
    pub true_sum: i64,
    pub reported_sum: i64,
}

fn parse_amount(text: &str, what: &str) -> Result<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| OrderError::form(format!("{} is not a number: '{}'", what, text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extract::extract_order;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 記錄所有操作的假表單
    struct FakeForm {
        prices: Vec<String>,
        credential_fields: usize,
        total: String,
        state: Mutex<FakeState>,
    }

    #[derive(Default)]
    struct FakeState {
        quantities: BTreeMap<usize, String>,
        credentials: Vec<(usize, String)>,
        actions: Vec<FormAction>,
    }

    impl FakeForm {
        fn new(prices: &[i64], total: i64) -> Self {
            Self {
                prices: prices.iter().map(|p| p.to_string()).collect(),
                credential_fields: 3,
                total: total.to_string(),
                state: Mutex::new(FakeState::default()),
            }
        }

        fn quantities(&self) -> BTreeMap<usize, String> {
            self.state.lock().unwrap().quantities.clone()
        }

        fn actions(&self) -> Vec<FormAction> {
            self.state.lock().unwrap().actions.clone()
        }
    }

    #[async_trait]
    impl FormDriver for FakeForm {
        async fn open(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn page_source(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn item_row_count(&self) -> Result<usize> {
            Ok(self.prices.len())
        }

        async fn read_cell_input(&self, row: usize, cell: usize) -> Result<String> {
            assert_eq!(cell, PRICE_CELL);
            Ok(self.prices[row].clone())
        }

        async fn write_cell_input(&self, row: usize, cell: usize, value: &str) -> Result<()> {
            assert_eq!(cell, QUANTITY_CELL);
            self.state
                .lock()
                .unwrap()
                .quantities
                .insert(row, value.to_string());
            Ok(())
        }

        async fn fill_credential_field(&self, index: usize, value: &str) -> Result<()> {
            if index >= self.credential_fields {
                return Err(OrderError::form(format!("no credential field {}", index)));
            }
            self.state
                .lock()
                .unwrap()
                .credentials
                .push((index, value.to_string()));
            Ok(())
        }

        async fn trigger(&self, action: FormAction) -> Result<()> {
            self.state.lock().unwrap().actions.push(action);
            Ok(())
        }

        async fn read_total(&self) -> Result<String> {
            Ok(self.total.clone())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn settings(mode: RunMode) -> PlacementSettings {
        PlacementSettings {
            compute_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
            ..PlacementSettings::new(
                mode,
                vec!["Ann".to_string(), "Office 5".to_string(), "555-01".to_string()],
            )
        }
    }

    fn sample_order() -> ExtractedOrder {
        let names = ["Day", "", "Ann", "", "Bob", ""];
        let orders = ["Monday", "", "1,2", "150", "1", "100"];
        extract_order(&names, &orders).unwrap()
    }

    #[tokio::test]
    async fn test_live_order_is_confirmed() {
        let form = FakeForm::new(&[100, 50, 80], 250);

        let outcome = place_order(&form, &sample_order(), &settings(RunMode::Live))
            .await
            .unwrap();

        assert_eq!(outcome, PlacementOutcome::Submitted { total: 250 });
        let quantities = form.quantities();
        assert_eq!(quantities.get(&0).map(String::as_str), Some("2"));
        assert_eq!(quantities.get(&1).map(String::as_str), Some("1"));
        assert_eq!(quantities.len(), 2);
        assert_eq!(
            form.actions(),
            vec![FormAction::ComputeTotal, FormAction::Confirm]
        );
    }

    #[tokio::test]
    async fn test_test_mode_never_confirms() {
        let form = FakeForm::new(&[100, 50, 80], 250);

        let outcome = place_order(&form, &sample_order(), &settings(RunMode::Test))
            .await
            .unwrap();

        assert_eq!(outcome, PlacementOutcome::DryRun { total: 250 });
        assert_eq!(form.actions(), vec![FormAction::ComputeTotal]);
    }

    #[tokio::test]
    async fn test_below_minimum_is_not_submitted() {
        let form = FakeForm::new(&[100, 50, 80], 150);

        let outcome = place_order(&form, &sample_order(), &settings(RunMode::Live))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PlacementOutcome::BelowMinimum {
                total: 150,
                minimum: 200
            }
        );
        assert!(!form.actions().contains(&FormAction::Confirm));
    }

    #[tokio::test]
    async fn test_out_of_range_item_is_skipped() {
        let names = ["Day", "", "Ann", "", "Bob", ""];
        let orders = ["Monday", "", "1,999", "100", "2", "150"];
        let extracted = extract_order(&names, &orders).unwrap();
        let prices = [100, 150, 90, 60, 75, 40, 35, 20, 30, 45];
        let form = FakeForm::new(&prices, 250);

        let outcome = place_order(&form, &extracted, &settings(RunMode::Live))
            .await
            .unwrap();

        assert_eq!(outcome, PlacementOutcome::Submitted { total: 250 });
        let quantities = form.quantities();
        assert_eq!(quantities.len(), 2);
        assert!(quantities.contains_key(&0));
        assert!(quantities.contains_key(&1));
    }

    #[tokio::test]
    async fn test_sum_mismatch_still_submits() {
        // Ann 填了 150，但 1 號加 2 號實際是 100 + 50
        let names = ["Day", "", "Ann", "", "Bob", ""];
        let orders = ["Monday", "", "1,2", "999", "1", "100"];
        let form = FakeForm::new(&[100, 50, 80], 250);

        let outcome = place_order(
            &form,
            &extract_order(&names, &orders).unwrap(),
            &settings(RunMode::Live),
        )
        .await
        .unwrap();

        assert_eq!(outcome, PlacementOutcome::Submitted { total: 250 });
    }

    #[tokio::test]
    async fn test_credentials_fill_in_order() {
        let form = FakeForm::new(&[100, 50, 80], 250);

        place_order(&form, &sample_order(), &settings(RunMode::Test))
            .await
            .unwrap();

        let credentials = form.state.lock().unwrap().credentials.clone();
        assert_eq!(
            credentials,
            vec![
                (0, "Ann".to_string()),
                (1, "Office 5".to_string()),
                (2, "555-01".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_credential_field_is_an_error() {
        let mut form = FakeForm::new(&[100, 50, 80], 250);
        form.credential_fields = 2;

        let err = place_order(&form, &sample_order(), &settings(RunMode::Live))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Form { .. }));
        assert!(form.actions().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_total_is_an_error() {
        let mut form = FakeForm::new(&[100, 50, 80], 0);
        form.total = "n/a".to_string();

        let err = place_order(&form, &sample_order(), &settings(RunMode::Live))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::Form { .. }));
    }

    #[test]
    fn test_check_sums_reports_mismatches_only() {
        let names = ["Day", "", "Ann", "", "Bob", ""];
        let orders = ["Monday", "", "1,1", "200", "2", "70"];
        let extracted = extract_order(&names, &orders).unwrap();
        let prices = PriceTable::from([(1, 100), (2, 50)]);

        let mismatches = check_sums(&extracted.inverse_order, &extracted.reported_sums, &prices);

        assert_eq!(
            mismatches,
            vec![SumMismatch {
                participant: "Bob".to_string(),
                true_sum: 50,
                reported_sum: 70,
            }]
        );
    }

    #[test]
    fn test_check_sums_prices_missing_items_as_zero() {
        let names = ["Day", "", "Ann", ""];
        let orders = ["Monday", "", "1,999", "100"];
        let extracted = extract_order(&names, &orders).unwrap();
        let prices = PriceTable::from([(1, 100)]);

        let mismatches = check_sums(&extracted.inverse_order, &extracted.reported_sums, &prices);

        assert!(mismatches.is_empty());
    }
}
