//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use cost_analyzer::{Effort, Priority};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table, or a placeholder when there are none
pub fn print_rows<T: Tabled>(rows: Vec<T>, empty: &str) {
    if rows.is_empty() {
        println!("{}", empty.yellow());
        return;
    }
    println!("{}", Table::new(rows).with(Style::rounded()));
}

pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a money amount with thousands separators
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if negative { "-" } else { "" };
    match currency {
        "USD" => format!("{}${}.{}", sign, grouped, cents),
        "AUD" => format!("{}A${}.{}", sign, grouped, cents),
        _ => format!("{}{}.{} {}", sign, grouped, cents, currency),
    }
}

pub fn format_usd(amount: Decimal) -> String {
    format_currency(amount, "USD")
}

/// Format a percentage with its sign
pub fn format_percent(value: Decimal) -> String {
    format!("{:+.2}%", value)
}

pub fn color_priority(priority: Priority) -> String {
    let label = priority.to_string();
    match priority {
        Priority::High => label.red().bold().to_string(),
        Priority::Medium => label.yellow().to_string(),
        Priority::Low => label.normal().to_string(),
    }
}

pub fn color_effort(effort: Effort) -> String {
    let label = effort.to_string();
    match effort {
        Effort::Low => label.green().to_string(),
        Effort::Medium => label.yellow().to_string(),
        Effort::High => label.red().to_string(),
    }
}

/// Green when AWS is cheaper, red when it costs more
pub fn color_difference(difference: Decimal) -> String {
    let text = format_usd(difference);
    if difference < Decimal::ZERO {
        text.green().to_string()
    } else if difference > Decimal::ZERO {
        text.red().to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_usd(d("364.42")), "$364.42");
        assert_eq!(format_usd(d("5000")), "$5,000.00");
        assert_eq!(format_usd(d("1234567.8")), "$1,234,567.80");
        assert_eq!(format_usd(d("-2580")), "-$2,580.00");
        assert_eq!(format_usd(d("0")), "$0.00");
        assert_eq!(format_currency(d("12.5"), "AUD"), "A$12.50");
        assert_eq!(format_currency(d("12.5"), "EUR"), "12.50 EUR");
    }

    #[test]
    fn test_format_percent_is_signed() {
        assert_eq!(format_percent(d("-32.25")), "-32.25%");
        assert_eq!(format_percent(d("33.33")), "+33.33%");
    }
}
