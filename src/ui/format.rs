//! Display formatting for project values (en-US conventions).

use chrono::NaiveDate;

pub const BUDGET_NOT_SET: &str = "Budget not set";

/// `1234.5` -> `$1,234.50`
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

pub fn format_budget(budget: Option<f64>) -> String {
    match budget {
        Some(amount) => format_currency(amount),
        None => BUDGET_NOT_SET.to_string(),
    }
}

/// `2024-03-07` -> `Mar 7, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
