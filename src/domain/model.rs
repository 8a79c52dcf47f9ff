use crate::utils::error::OrderError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// item id → 份數
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    items: BTreeMap<u32, u32>,
}

impl Order {
    pub fn add(&mut self, item_id: u32) {
        *self.items.entry(item_id).or_default() += 1;
    }

    pub fn count(&self, item_id: u32) -> u32 {
        self.items.get(&item_id).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.items.iter().map(|(id, count)| (*id, *count))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_items(&self) -> u32 {
        self.items.values().sum()
    }
}

/// item id → 點了該品項的人，每點一次記一次
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InverseOrder {
    participants: BTreeMap<u32, Vec<String>>,
}

impl InverseOrder {
    pub fn push(&mut self, item_id: u32, name: &str) {
        self.participants
            .entry(item_id)
            .or_default()
            .push(name.to_string());
    }

    pub fn participants(&self, item_id: u32) -> &[String] {
        self.participants
            .get(&item_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[String])> + '_ {
        self.participants
            .iter()
            .map(|(id, names)| (*id, names.as_slice()))
    }

    pub fn total_entries(&self) -> usize {
        self.participants.values().map(Vec::len).sum()
    }
}

/// 參與者 → 自行填報的金額
pub type ReportedSums = BTreeMap<String, i64>;

/// item id → 表單上的單價
pub type PriceTable = BTreeMap<u32, i64>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedOrder {
    pub order: Order,
    pub inverse_order: InverseOrder,
    pub reported_sums: ReportedSums,
    pub total_sum: i64,
}

impl ExtractedOrder {
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// 有送餐的工作日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl OrderDay {
    pub const ALL: [OrderDay; 5] = [
        OrderDay::Monday,
        OrderDay::Tuesday,
        OrderDay::Wednesday,
        OrderDay::Thursday,
        OrderDay::Friday,
    ];

    pub fn from_weekday(weekday: chrono::Weekday) -> Option<Self> {
        Self::ALL
            .get(weekday.num_days_from_monday() as usize)
            .copied()
    }

    /// 明天要訂的那一天；週五、週六晚上執行時沒有隔天的送餐
    pub fn tomorrow(today: chrono::Weekday) -> Option<Self> {
        Self::from_weekday(today.succ())
    }

    pub fn offset(self) -> usize {
        self as usize
    }

    /// 試算表中該天所在的列
    pub fn row_index(self) -> usize {
        2 + self.offset()
    }

    pub fn english_name(self) -> &'static str {
        match self {
            OrderDay::Monday => "Monday",
            OrderDay::Tuesday => "Tuesday",
            OrderDay::Wednesday => "Wednesday",
            OrderDay::Thursday => "Thursday",
            OrderDay::Friday => "Friday",
        }
    }

    /// 菜單網址中使用的音譯名稱
    pub fn menu_slug(self) -> &'static str {
        match self {
            OrderDay::Monday => "ponedelnik",
            OrderDay::Tuesday => "vtornik",
            OrderDay::Wednesday => "sreda",
            OrderDay::Thursday => "chetverg",
            OrderDay::Friday => "pyatnica",
        }
    }
}

impl fmt::Display for OrderDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english_name())
    }
}

impl FromStr for OrderDay {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.english_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| OrderError::InvalidConfigValueError {
                field: "day".to_string(),
                value: s.to_string(),
                reason: "Expected a weekday name from Monday to Friday".to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// 走完整個流程，但不按下確認
    Test,
    Live,
}

impl RunMode {
    pub fn submits(self) -> bool {
        matches!(self, RunMode::Live)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    ComputeTotal,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementOutcome {
    Submitted { total: i64 },
    DryRun { total: i64 },
    BelowMinimum { total: i64, minimum: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    NotADeliveryDay,
    NothingFetched,
    NoOrders,
    PlacementAbandoned,
    Placed(PlacementOutcome),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_order_count_defaults_to_zero() {
        let mut order = Order::default();
        order.add(3);
        order.add(3);
        assert_eq!(order.count(3), 2);
        assert_eq!(order.count(7), 0);
        assert_eq!(order.total_items(), 2);
    }

    #[test]
    fn test_inverse_order_keeps_repeats() {
        let mut inverse = InverseOrder::default();
        inverse.push(1, "Ann");
        inverse.push(1, "Ann");
        assert_eq!(inverse.participants(1), ["Ann", "Ann"]);
        assert!(inverse.participants(2).is_empty());
        assert_eq!(inverse.total_entries(), 2);
    }

    #[test]
    fn test_tomorrow_skips_weekend() {
        assert_eq!(OrderDay::tomorrow(Weekday::Sun), Some(OrderDay::Monday));
        assert_eq!(OrderDay::tomorrow(Weekday::Thu), Some(OrderDay::Friday));
        assert_eq!(OrderDay::tomorrow(Weekday::Fri), None);
        assert_eq!(OrderDay::tomorrow(Weekday::Sat), None);
    }

    #[test]
    fn test_day_rows_and_names() {
        assert_eq!(OrderDay::Monday.row_index(), 2);
        assert_eq!(OrderDay::Friday.row_index(), 6);
        assert_eq!(OrderDay::Wednesday.english_name(), "Wednesday");
        assert_eq!(OrderDay::Friday.menu_slug(), "pyatnica");
    }

    #[test]
    fn test_day_from_str() {
        assert_eq!("thursday".parse::<OrderDay>().unwrap(), OrderDay::Thursday);
        assert_eq!(" Monday ".parse::<OrderDay>().unwrap(), OrderDay::Monday);
        assert!("Saturday".parse::<OrderDay>().is_err());
    }

    #[test]
    fn test_run_mode_submits_only_live() {
        assert!(RunMode::Live.submits());
        assert!(!RunMode::Test.submits());
    }
}
