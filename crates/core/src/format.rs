//! `en-GB` number formatting used in prompts and greetings.

use crate::types::Date;

/// Insert `,` thousands separators into a string of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format an integer count with thousands separators (`12,345`).
pub fn format_number(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format an amount in pounds sterling (`£12,345.60`, `-£80.00`).
pub fn format_gbp(amount: f64) -> String {
    if !amount.is_finite() {
        return "£0.00".to_string();
    }
    let pence = (amount.abs() * 100.0).round() as u64;
    let pounds = group_thousands(&(pence / 100).to_string());
    let sign = if amount < 0.0 && pence > 0 { "-" } else { "" };
    format!("{sign}£{pounds}.{:02}", pence % 100)
}

/// Format a percentage with one decimal place (`12.5%`).
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Format a calendar date as `dd/mm/yyyy`.
pub fn format_date(date: Date) -> String {
    date.format("%d/%m/%Y").to_string()
}
