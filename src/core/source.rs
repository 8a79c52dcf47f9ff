use crate::core::extract::extract_order;
use crate::core::{ExtractedOrder, OrderDay, OrderSource};
use crate::utils::error::{OrderError, Result};

/// 拉取試算表並解析指定那天的訂單
pub async fn fetch_orders<S: OrderSource + ?Sized>(
    source: &S,
    url: &str,
    day: OrderDay,
) -> Result<ExtractedOrder> {
    tracing::info!("📡 Making order for {}", day);
    tracing::debug!("Fetching spreadsheet from: {}", url);

    let text = match source.fetch_daily_table(url).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Request to the spreadsheet failed");
            return Err(e);
        }
    };

    let table = parse_table(&text)?;
    select_day(&table, day)
}

/// TSV 轉成逐列、逐欄並去除空白的表格
///
/// 列號就是原始文字的行號：空行保留為只有一個空欄位的列，
/// 不然後面每一天都會往上錯一列。
pub fn parse_table(text: &str) -> Result<Vec<Vec<String>>> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All);

    let mut rows = Vec::new();
    for line in text.lines() {
        let mut reader = builder.from_reader(line.as_bytes());
        let row = match reader.records().next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => vec![String::new()],
        };
        rows.push(row);
    }

    tracing::debug!("Parsed spreadsheet with {} rows", rows.len());
    Ok(rows)
}

/// 取出名字列與該天的訂單列，確認列首的星期名稱後交給解析
pub fn select_day(table: &[Vec<String>], day: OrderDay) -> Result<ExtractedOrder> {
    let names_line = row(table, 0)?;
    let order_line = row(table, day.row_index())?;

    let label = order_line.first().map(String::as_str).unwrap_or_default();
    if label != day.english_name() {
        return Err(OrderError::DayMismatch {
            expected: day.english_name().to_string(),
            found: label.to_string(),
        });
    }

    extract_order(names_line, order_line)
}

fn row(table: &[Vec<String>], index: usize) -> Result<&[String]> {
    table
        .get(index)
        .map(Vec::as_slice)
        .ok_or(OrderError::MissingRow {
            index,
            rows: table.len(),
        })
}
