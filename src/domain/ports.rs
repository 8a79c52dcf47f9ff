use crate::domain::model::FormAction;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 取得訂餐試算表的原始 TSV 內容
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_daily_table(&self, url: &str) -> Result<String>;
}

/// 訂餐表單的最小操作介面，真實實作是瀏覽器，測試中用假的表單替代
#[async_trait]
pub trait FormDriver: Send + Sync {
    async fn open(&self, url: &str) -> Result<()>;
    async fn page_source(&self) -> Result<String>;

    /// 菜單表格中品項列的數量
    async fn item_row_count(&self) -> Result<usize>;
    async fn read_cell_input(&self, row: usize, cell: usize) -> Result<String>;
    /// 清空欄位後寫入新值
    async fn write_cell_input(&self, row: usize, cell: usize, value: &str) -> Result<()>;

    async fn fill_credential_field(&self, index: usize, value: &str) -> Result<()>;
    async fn trigger(&self, action: FormAction) -> Result<()>;
    async fn read_total(&self) -> Result<String>;

    async fn close(&self) -> Result<()>;
}

/// 每次執行開啟一個表單 session
#[async_trait]
pub trait FormLauncher: Send + Sync {
    type Driver: FormDriver;

    async fn launch(&self) -> Result<Self::Driver>;
}
