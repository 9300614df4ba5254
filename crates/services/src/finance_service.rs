use std::sync::Arc;

use chrono::NaiveDate;
use lex_core::finance::{self, BarPoint, BudgetUsage, CategoryTotals, TimePeriod};
use lex_core::model::{CategoryBudgets, PaymentProvider, SpendCategory, Transaction};
use serde::Serialize;
use storage::{BudgetRepository, TransactionRepository};

use crate::error::FinanceError;
use crate::Clock;

/// Number of rows in the "recent transactions" list.
pub const RECENT_LIMIT: usize = 5;

/// Headline numbers for the finance page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinanceOverview {
    pub current_month: u64,
    pub last_month: u64,
    pub total_budget: u64,
    /// Newest first.
    pub recent: Vec<Transaction>,
}

/// Spending queries and budget edits over the transaction history.
#[derive(Clone)]
pub struct FinanceService {
    clock: Clock,
    transactions: Arc<dyn TransactionRepository>,
    budgets: Arc<dyn BudgetRepository>,
}

impl FinanceService {
    #[must_use]
    pub fn new(
        clock: Clock,
        transactions: Arc<dyn TransactionRepository>,
        budgets: Arc<dyn BudgetRepository>,
    ) -> Self {
        Self {
            clock,
            transactions,
            budgets,
        }
    }

    /// Full history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if repository access fails.
    pub fn transactions(&self) -> Result<Vec<Transaction>, FinanceError> {
        let mut all = self.transactions.list_transactions()?;
        all.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        Ok(all)
    }

    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if persistence fails.
    pub fn record(&self, transaction: &Transaction) -> Result<(), FinanceError> {
        self.transactions.insert_transaction(transaction)?;
        tracing::info!(
            id = %transaction.id(),
            amount = transaction.amount(),
            category = %transaction.category(),
            "transaction recorded"
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if repository access fails.
    pub fn overview(&self) -> Result<FinanceOverview, FinanceError> {
        let now = self.clock.now();
        let all = self.transactions()?;
        Ok(FinanceOverview {
            current_month: finance::current_month_spending(&all, now),
            last_month: finance::last_month_spending(&all, now),
            total_budget: self.budgets.get_budgets()?.total(),
            recent: all.into_iter().take(RECENT_LIMIT).collect(),
        })
    }

    /// Category totals for the month containing `month` (default: the current month).
    ///
    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if repository access fails.
    pub fn monthly_report(
        &self,
        month: Option<NaiveDate>,
        provider: Option<PaymentProvider>,
    ) -> Result<CategoryTotals, FinanceError> {
        let month = month.unwrap_or_else(|| self.clock.now().date_naive());
        let all = self.transactions.list_transactions()?;
        let report = finance::monthly_report(&all, month, provider);
        tracing::debug!(%month, total = report.total(), "monthly report computed");
        Ok(report)
    }

    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if repository access fails.
    pub fn bar_graphs(&self, period: TimePeriod) -> Result<Vec<BarPoint>, FinanceError> {
        let all = self.transactions.list_transactions()?;
        Ok(finance::bar_graphs(&all, period, self.clock.now()))
    }

    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if repository access fails.
    pub fn current_month_spending(&self) -> Result<u64, FinanceError> {
        let all = self.transactions.list_transactions()?;
        Ok(finance::current_month_spending(&all, self.clock.now()))
    }

    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if repository access fails.
    pub fn last_month_spending(&self) -> Result<u64, FinanceError> {
        let all = self.transactions.list_transactions()?;
        Ok(finance::last_month_spending(&all, self.clock.now()))
    }

    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if repository access fails.
    pub fn budgets(&self) -> Result<CategoryBudgets, FinanceError> {
        Ok(self.budgets.get_budgets()?)
    }

    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if repository access fails.
    pub fn total_budget(&self) -> Result<u64, FinanceError> {
        Ok(self.budgets.get_budgets()?.total())
    }

    /// Sets a category's monthly budget and returns the previous amount.
    ///
    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if persistence fails.
    pub fn set_budget(&self, category: SpendCategory, amount: u64) -> Result<u64, FinanceError> {
        let previous = self.budgets.set_budget(category, amount)?;
        tracing::info!(%category, previous, amount, "budget updated");
        Ok(previous)
    }

    /// Spend against budget per category for `month` (default: the current month).
    ///
    /// # Errors
    ///
    /// Returns `FinanceError::Storage` if repository access fails.
    pub fn budget_usage(&self, month: Option<NaiveDate>) -> Result<Vec<BudgetUsage>, FinanceError> {
        let month = month.unwrap_or_else(|| self.clock.now().date_naive());
        let all = self.transactions.list_transactions()?;
        let budgets = self.budgets.get_budgets()?;
        Ok(finance::budget_usage(&all, &budgets, month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use lex_core::model::TransactionId;
    use lex_core::time::fixed_now;
    use storage::InMemoryRepository;

    fn service() -> FinanceService {
        let repo = Arc::new(InMemoryRepository::new());
        FinanceService::new(Clock::fixed(fixed_now()), repo.clone(), repo)
    }

    fn tx(seq: u8, amount: u64, at: DateTime<Utc>, category: SpendCategory) -> Transaction {
        Transaction::new(
            TransactionId::from_random_bytes([seq; 16]),
            amount,
            at,
            "Uber",
            PaymentProvider::Cash,
            category,
        )
        .unwrap()
    }

    #[test]
    fn overview_lists_recent_first() {
        let service = service();
        let now = fixed_now();
        for i in 0..7u8 {
            let at = now - Duration::hours(i64::from(i) * 3);
            service
                .record(&tx(i, 10 + u64::from(i), at, SpendCategory::Transport))
                .unwrap();
        }
        let overview = service.overview().unwrap();
        assert_eq!(overview.recent.len(), RECENT_LIMIT);
        assert_eq!(overview.recent[0].amount(), 10);
        assert_eq!(overview.total_budget, 5000);
        assert_eq!(overview.current_month, (10..17).sum::<u64>());
        assert_eq!(overview.last_month, 0);
    }

    #[test]
    fn duplicate_transaction_is_a_conflict() {
        let service = service();
        let t = tx(1, 50, fixed_now(), SpendCategory::Food);
        service.record(&t).unwrap();
        let err = service.record(&t).unwrap_err();
        assert!(matches!(
            err,
            FinanceError::Storage(storage::StorageError::Conflict)
        ));
    }

    #[test]
    fn budgets_track_spending() {
        let service = service();
        service
            .record(&tx(1, 600, fixed_now(), SpendCategory::Transport))
            .unwrap();
        let usage = service.budget_usage(None).unwrap();
        let transport = usage
            .iter()
            .find(|u| u.category == SpendCategory::Transport)
            .unwrap();
        assert!(transport.over_budget);

        assert_eq!(service.set_budget(SpendCategory::Transport, 800).unwrap(), 500);
        assert_eq!(service.total_budget().unwrap(), 5300);
        let usage = service.budget_usage(None).unwrap();
        let transport = usage
            .iter()
            .find(|u| u.category == SpendCategory::Transport)
            .unwrap();
        assert_eq!(transport.remaining, 200);
        assert!(!transport.over_budget);
    }

    #[test]
    fn report_and_bars_use_the_clock() {
        let service = service();
        service
            .record(&tx(1, 70, fixed_now() - Duration::hours(1), SpendCategory::Food))
            .unwrap();
        let report = service.monthly_report(None, None).unwrap();
        assert_eq!(report.get(SpendCategory::Food), 70);
        assert_eq!(
            service
                .monthly_report(None, Some(PaymentProvider::SwdPay))
                .unwrap()
                .total(),
            0
        );
        let bars = service.bar_graphs(TimePeriod::Day).unwrap();
        assert_eq!(bars.len(), 5);
        assert_eq!(bars[4].value, 70);
    }
}
