//! Spending aggregation over a transaction list.
//!
//! Every bucket is a half-open UTC interval `[start, end)`.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{CategoryBudgets, PaymentProvider, SpendCategory, Transaction};
use crate::time::{first_of_month, month_bounds, start_of_day};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown time period {raw:?} (expected day, week or month)")]
pub struct UnknownPeriod {
    raw: String,
}

/// Granularity of the spending bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    Day,
    Week,
    #[default]
    Month,
}

impl TimePeriod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimePeriod::Day => "day",
            TimePeriod::Week => "week",
            TimePeriod::Month => "month",
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimePeriod {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimePeriod::Day),
            "week" => Ok(TimePeriod::Week),
            "month" => Ok(TimePeriod::Month),
            _ => Err(UnknownPeriod { raw: s.to_owned() }),
        }
    }
}

//
// ─── CATEGORY TOTALS ───────────────────────────────────────────────────────────
//

/// Spend per category. All five categories are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    totals: BTreeMap<SpendCategory, u64>,
}

impl CategoryTotals {
    fn empty() -> Self {
        Self {
            totals: SpendCategory::ALL.into_iter().map(|c| (c, 0)).collect(),
        }
    }

    fn add(&mut self, category: SpendCategory, amount: u64) {
        *self.totals.entry(category).or_insert(0) += amount;
    }

    #[must_use]
    pub fn get(&self, category: SpendCategory) -> u64 {
        self.totals.get(&category).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.totals.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpendCategory, u64)> + '_ {
        self.totals.iter().map(|(c, a)| (*c, *a))
    }
}

fn in_range(t: &Transaction, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    (start..end).contains(&t.timestamp())
}

fn sum_between(transactions: &[Transaction], start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    transactions
        .iter()
        .filter(|t| in_range(t, start, end))
        .map(Transaction::amount)
        .sum()
}

/// Per-category totals for the calendar month containing `month`,
/// optionally limited to one payment provider.
#[must_use]
pub fn monthly_report(
    transactions: &[Transaction],
    month: NaiveDate,
    provider: Option<PaymentProvider>,
) -> CategoryTotals {
    let (start, end) = month_bounds(month);
    let mut report = CategoryTotals::empty();
    for t in transactions
        .iter()
        .filter(|t| in_range(t, start, end))
        .filter(|t| provider.is_none_or(|p| t.provider() == p))
    {
        report.add(t.category(), t.amount());
    }
    report
}

/// Spend from the first of `now`'s month up to and including `now`.
#[must_use]
pub fn current_month_spending(transactions: &[Transaction], now: DateTime<Utc>) -> u64 {
    let start = start_of_day(first_of_month(now.date_naive()));
    transactions
        .iter()
        .filter(|t| (start..=now).contains(&t.timestamp()))
        .map(Transaction::amount)
        .sum()
}

/// Spend over the whole calendar month before `now`'s.
#[must_use]
pub fn last_month_spending(transactions: &[Transaction], now: DateTime<Utc>) -> u64 {
    let this_month = first_of_month(now.date_naive());
    let previous = this_month
        .checked_sub_months(Months::new(1))
        .unwrap_or(this_month);
    let (start, end) = month_bounds(previous);
    sum_between(transactions, start, end)
}

//
// ─── BAR GRAPH ─────────────────────────────────────────────────────────────────
//

const BAR_COUNT: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarPoint {
    pub label: String,
    pub value: u64,
}

/// First and last day (inclusive) plus label of the bucket `back` periods before `today`.
fn bucket(period: TimePeriod, today: NaiveDate, back: u32) -> (NaiveDate, NaiveDate, String) {
    match period {
        TimePeriod::Day => {
            let day = today - Duration::days(i64::from(back));
            (day, day, day.format("%b %-d").to_string())
        }
        TimePeriod::Week => {
            let anchor = today - Duration::weeks(i64::from(back));
            let sunday =
                anchor - Duration::days(i64::from(anchor.weekday().num_days_from_sunday()));
            let label = format!("Week {}", BAR_COUNT - back);
            (sunday, sunday + Duration::days(6), label)
        }
        TimePeriod::Month => {
            let first = first_of_month(today)
                .checked_sub_months(Months::new(back))
                .unwrap_or(NaiveDate::MIN);
            let last = first
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(first);
            (first, last, first.format("%b").to_string())
        }
    }
}

/// Five spending totals ending with the period containing `now`, oldest first.
#[must_use]
pub fn bar_graphs(transactions: &[Transaction], period: TimePeriod, now: DateTime<Utc>) -> Vec<BarPoint> {
    let today = now.date_naive();
    (0..BAR_COUNT)
        .rev()
        .map(|back| {
            let (first, last, label) = bucket(period, today, back);
            let end = last
                .succ_opt()
                .map_or(DateTime::<Utc>::MAX_UTC, start_of_day);
            BarPoint {
                label,
                value: sum_between(transactions, start_of_day(first), end),
            }
        })
        .collect()
}

//
// ─── BUDGETS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetUsage {
    pub category: SpendCategory,
    pub spent: u64,
    pub budget: u64,
    /// Never negative; see `over_budget`.
    pub remaining: u64,
    pub over_budget: bool,
}

impl BudgetUsage {
    /// Fill of the progress bar, capped at 100.
    #[must_use]
    pub fn percent_used(&self) -> u8 {
        if self.budget == 0 {
            return if self.spent == 0 { 0 } else { 100 };
        }
        let percent = self.spent.saturating_mul(100) / self.budget;
        u8::try_from(percent.min(100)).unwrap_or(100)
    }
}

/// Spend against budget for every category in `month`.
#[must_use]
pub fn budget_usage(
    transactions: &[Transaction],
    budgets: &CategoryBudgets,
    month: NaiveDate,
) -> Vec<BudgetUsage> {
    let report = monthly_report(transactions, month, None);
    budgets
        .iter()
        .map(|(category, budget)| {
            let spent = report.get(category);
            BudgetUsage {
                category,
                spent,
                budget,
                remaining: budget.saturating_sub(spent),
                over_budget: spent > budget,
            }
        })
        .collect()
}

//
// ─── DAY GROUPS ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    /// `Today`, `Yesterday`, or `Mon D`.
    pub label: String,
    /// Newest first.
    pub transactions: Vec<&'a Transaction>,
}

fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_owned()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_owned()
    } else {
        date.format("%b %-d").to_string()
    }
}

/// Transactions newest first, bucketed by calendar day.
#[must_use]
pub fn group_by_day(transactions: &[Transaction], now: DateTime<Utc>) -> Vec<DayGroup<'_>> {
    let today = now.date_naive();
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

    let mut groups: Vec<DayGroup<'_>> = Vec::new();
    for t in sorted {
        let date = t.timestamp().date_naive();
        match groups.last_mut() {
            Some(group) if group.date == date => group.transactions.push(t),
            _ => groups.push(DayGroup {
                date,
                label: day_label(date, today),
                transactions: vec![t],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionId;
    use crate::time::fixed_now;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn tx(
        seq: u8,
        amount: u64,
        at: DateTime<Utc>,
        provider: PaymentProvider,
        category: SpendCategory,
    ) -> Transaction {
        Transaction::new(
            TransactionId::from_random_bytes([seq; 16]),
            amount,
            at,
            "ANC 1",
            provider,
            category,
        )
        .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sample() -> Vec<Transaction> {
        use PaymentProvider::{Cash, SwdPay};
        use SpendCategory::*;
        vec![
            tx(1, 50, at(2023, 11, 1, 9), SwdPay, Food),
            tx(2, 120, at(2023, 11, 10, 18), Cash, Entertainment),
            tx(3, 70, at(2023, 11, 14, 8), Cash, Food),
            tx(4, 300, at(2023, 10, 31, 23), Cash, Shopping),
            tx(5, 40, at(2023, 10, 2, 12), Cash, Transport),
            // after fixed_now, same day
            tx(6, 999, at(2023, 11, 14, 23), Cash, Others),
        ]
    }

    #[test]
    fn monthly_report_sums_by_category() {
        let transactions = sample();
        let month = NaiveDate::from_ymd_opt(2023, 11, 20).unwrap();

        let report = monthly_report(&transactions, month, None);
        assert_eq!(report.get(SpendCategory::Food), 120);
        assert_eq!(report.get(SpendCategory::Entertainment), 120);
        assert_eq!(report.get(SpendCategory::Shopping), 0);
        assert_eq!(report.total(), 50 + 120 + 70 + 999);
        assert_eq!(report.iter().count(), 5);

        let swd = monthly_report(&transactions, month, Some(PaymentProvider::SwdPay));
        assert_eq!(swd.total(), 50);
    }

    #[test]
    fn report_total_matches_month_sum() {
        let transactions = sample();
        let october = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
        let (start, end) = month_bounds(october);
        let expected: u64 = transactions
            .iter()
            .filter(|t| t.timestamp() >= start && t.timestamp() < end)
            .map(Transaction::amount)
            .sum();
        assert_eq!(monthly_report(&transactions, october, None).total(), expected);
        assert_eq!(expected, 340);
    }

    #[test]
    fn current_and_last_month() {
        let transactions = sample();
        let now = fixed_now();
        assert_eq!(current_month_spending(&transactions, now), 50 + 120 + 70);
        assert_eq!(last_month_spending(&transactions, now), 340);
    }

    #[test]
    fn daily_bars_are_labelled_and_ordered() {
        let transactions = sample();
        let bars = bar_graphs(&transactions, TimePeriod::Day, fixed_now());
        let labels: Vec<_> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["Nov 10", "Nov 11", "Nov 12", "Nov 13", "Nov 14"]);
        assert_eq!(bars[0].value, 120);
        // whole day, including the late transaction
        assert_eq!(bars[4].value, 70 + 999);
    }

    #[test]
    fn weekly_bars_run_sunday_to_saturday() {
        let transactions = sample();
        let bars = bar_graphs(&transactions, TimePeriod::Week, fixed_now());
        assert_eq!(bars[0].label, "Week 1");
        assert_eq!(bars[4].label, "Week 5");
        // Sun Nov 12 .. Sat Nov 18
        assert_eq!(bars[4].value, 70 + 999);
        // Sun Nov 5 .. Sat Nov 11
        assert_eq!(bars[3].value, 120);
        // Sun Oct 29 .. Sat Nov 4
        assert_eq!(bars[2].value, 300 + 50);
    }

    #[test]
    fn monthly_bars_cover_five_months() {
        let transactions = sample();
        let bars = bar_graphs(&transactions, TimePeriod::Month, fixed_now());
        let labels: Vec<_> = bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["Jul", "Aug", "Sep", "Oct", "Nov"]);
        assert_eq!(bars[3].value, 340);
    }

    #[test]
    fn budget_usage_flags_overspend() {
        let transactions = sample();
        let budgets = CategoryBudgets::from_amounts([
            (SpendCategory::Food, 100),
            (SpendCategory::Entertainment, 1000),
        ]);
        let month = fixed_now().date_naive();
        let usage = budget_usage(&transactions, &budgets, month);

        let food = usage
            .iter()
            .find(|u| u.category == SpendCategory::Food)
            .unwrap();
        assert_eq!(food.spent, 120);
        assert_eq!(food.remaining, 0);
        assert!(food.over_budget);
        assert_eq!(food.percent_used(), 100);

        let fun = usage
            .iter()
            .find(|u| u.category == SpendCategory::Entertainment)
            .unwrap();
        assert_eq!(fun.remaining, 880);
        assert!(!fun.over_budget);
        assert_eq!(fun.percent_used(), 12);
    }

    #[test]
    fn day_groups_are_newest_first_with_relative_labels() {
        let transactions = sample();
        let now = fixed_now();
        let groups = group_by_day(&transactions, now);

        assert_eq!(groups[0].label, "Today");
        assert_eq!(groups[0].transactions.len(), 2);
        assert_eq!(groups[0].transactions[0].amount(), 999);
        assert_eq!(groups[1].label, "Nov 10");
        assert_eq!(groups.last().unwrap().label, "Oct 2");

        let yesterday = vec![tx(9, 10, at(2023, 11, 13, 10), PaymentProvider::Cash, SpendCategory::Food)];
        assert_eq!(group_by_day(&yesterday, now)[0].label, "Yesterday");
    }

    #[test]
    fn period_parses_case_insensitively() {
        assert_eq!("Week".parse::<TimePeriod>().unwrap(), TimePeriod::Week);
        assert!("year".parse::<TimePeriod>().is_err());
        assert_eq!(TimePeriod::default(), TimePeriod::Month);
    }
}
