//! Spend analytics over an already filtered set of expenses.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use common::{CategorySpend, DaySpend, ExpenseInsights};
use model::entities::expense;
use rust_decimal::Decimal;

use crate::budgets::percentage;

const TOP_CATEGORIES: usize = 5;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// The window of equal length that ends the day before `start`.
///
/// `[2026-01-01, 2026-01-31]` maps to `[2025-12-01, 2025-12-31]`.
pub fn previous_window(start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let prev_end = start.pred_opt()?;
    let prev_start = prev_end.checked_sub_signed(end - start)?;
    Some((prev_start, prev_end))
}

/// Percentage change from `previous` to `current`.
/// Growth from nothing counts as 100%.
pub fn spending_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current.is_zero() {
            Decimal::ZERO
        } else {
            Decimal::ONE_HUNDRED
        };
    }
    percentage(current - previous, previous)
}

/// Builds the insights for `rows` (expense plus category name).
pub fn summarize(rows: &[(expense::Model, String)], previous_total: Decimal) -> ExpenseInsights {
    let total: Decimal = rows.iter().map(|(e, _)| e.amount).sum();
    let count = rows.len() as i64;
    let average = if count == 0 {
        Decimal::ZERO
    } else {
        (total / Decimal::from(count)).round_dp(2)
    };

    ExpenseInsights {
        total_spent: total,
        transaction_count: count,
        average_expense: average,
        previous_period_total: previous_total,
        spending_change: spending_change(total, previous_total),
        top_categories: top_categories(rows),
        spending_by_day: by_weekday(rows),
    }
}

fn top_categories(rows: &[(expense::Model, String)]) -> Vec<CategorySpend> {
    let mut totals: HashMap<i32, CategorySpend> = HashMap::new();
    for (expense, name) in rows {
        let entry = totals
            .entry(expense.category_id)
            .or_insert_with(|| CategorySpend {
                category_id: expense.category_id,
                category_name: name.clone(),
                total: Decimal::ZERO,
                count: 0,
            });
        entry.total += expense.amount;
        entry.count += 1;
    }

    let mut ranked: Vec<_> = totals.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    ranked.truncate(TOP_CATEGORIES);
    ranked
}

fn by_weekday(rows: &[(expense::Model, String)]) -> Vec<DaySpend> {
    let mut days: HashMap<u32, (Decimal, i64)> = HashMap::new();
    for (expense, _) in rows {
        let day = expense.expense_date.weekday().num_days_from_sunday();
        let entry = days.entry(day).or_insert((Decimal::ZERO, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let mut spread: Vec<_> = days
        .into_iter()
        .map(|(day, (total, count))| DaySpend {
            day,
            day_name: DAY_NAMES[day as usize].to_string(),
            total,
            count,
        })
        .collect();
    spread.sort_by(|a, b| b.count.cmp(&a.count).then(a.day.cmp(&b.day)));
    spread
}
