use crate::core::ExtractedOrder;
use crate::utils::error::{OrderError, Result};

/// 從名字列與某天的訂單列解析出訂單
///
/// ```text
/// names_line:  | Day    |   |     Ann     |     Bob     | ... |     |
/// order_line:  | Monday |   | order | sum | order | sum | ... | SUM |
/// ```
///
/// 從第 2 欄開始每兩欄為一位參與者：品項編號（逗號分隔）與自填金額。
/// 單筆資料有問題只記 log 並略過；只有欄位不足會回傳錯誤。
pub fn extract_order<S: AsRef<str>>(names_line: &[S], order_line: &[S]) -> Result<ExtractedOrder> {
    let mut extracted = ExtractedOrder::default();

    for i in (2..order_line.len()).step_by(2) {
        if i + 1 == order_line.len() {
            // 沒有配對金額欄的最後一欄是總計
            let grand_total = field(order_line, i)?;
            tracing::debug!(grand_total, "Ignoring grand total column");
            break;
        }

        let name = field(names_line, i)?.trim();
        let items_field = field(order_line, i)?;

        if items_field.is_empty() {
            tracing::info!("Empty order for {}. Skipping", name);
            continue;
        }

        for token in items_field.split(',') {
            match parse_item_id(token) {
                Some(item_id) => {
                    extracted.order.add(item_id);
                    extracted.inverse_order.push(item_id, name);
                }
                None => {
                    tracing::warn!(
                        participant = name,
                        order_field = items_field,
                        bad_entry = token,
                        "⚠️ Bad item id, entry dropped"
                    );
                }
            }
        }

        let sum_field = field(order_line, i + 1)?;
        let reported_sum = match sum_field.trim().parse::<i64>() {
            Ok(sum) => sum,
            Err(_) => {
                tracing::warn!(
                    participant = name,
                    sum_field,
                    "⚠️ Bad reported sum, counting it as 0"
                );
                0
            }
        };

        extracted.reported_sums.insert(name.to_string(), reported_sum);
        extracted.total_sum += reported_sum;
    }

    Ok(extracted)
}

fn field<S: AsRef<str>>(line: &[S], column: usize) -> Result<&str> {
    line.get(column)
        .map(AsRef::as_ref)
        .ok_or(OrderError::MalformedRow {
            column,
            len: line.len(),
        })
}

// 品項編號從 1 開始，0 和負數都不是合法的表單列
fn parse_item_id(token: &str) -> Option<u32> {
    token.trim().parse::<u32>().ok().filter(|id| *id >= 1)
}
