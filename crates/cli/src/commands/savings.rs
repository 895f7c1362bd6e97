//! Discount, on-premises comparison and optimization commands

use anyhow::{bail, Result};
use colored::Colorize;
use cost_analyzer::{Comparison, DiscountResult, Optimization, OptimizationReport};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::Path;
use tabled::Tabled;

use super::read_json_input;
use crate::backend::Backend;
use crate::output::{
    color_difference, color_effort, color_priority, format_percent, format_usd, print_heading,
    print_json, print_rows, OutputFormat,
};

#[derive(Tabled)]
struct OptimizationRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Recommendation")]
    recommendation: String,
    #[tabled(rename = "Current")]
    current_cost: String,
    #[tabled(rename = "Optimized")]
    optimized_cost: String,
    #[tabled(rename = "Savings")]
    potential_savings: String,
    #[tabled(rename = "Effort")]
    effort: String,
    #[tabled(rename = "Priority")]
    priority: String,
}

pub fn print_optimizations(optimizations: &[Optimization]) {
    println!("{}", "Cost Optimizations".bold());
    print_rows(
        optimizations
            .iter()
            .map(|o| OptimizationRow {
                service: o.service_name.clone(),
                recommendation: o.recommendation.clone(),
                current_cost: format_usd(o.current_cost),
                optimized_cost: format_usd(o.optimized_cost),
                potential_savings: format_usd(o.potential_savings).green().to_string(),
                effort: color_effort(o.effort),
                priority: color_priority(o.priority),
            })
            .collect(),
        "No optimizations identified",
    );
}

pub fn print_comparison(comparison: &Comparison) {
    print_heading("On-Premises Comparison");
    println!(
        "On-premises:            {}",
        format_usd(comparison.onprem_monthly_cost)
    );
    println!(
        "AWS:                    {}",
        format_usd(comparison.aws_monthly_cost)
    );
    println!(
        "Difference:             {} ({})",
        color_difference(comparison.difference),
        format_percent(comparison.percentage_change)
    );
    if let Some(months) = comparison.breakeven_months {
        println!("Breakeven:              {} months", months);
    }
}

pub async fn discount(backend: &Backend, base_cost: Decimal, format: OutputFormat) -> Result<()> {
    let result: DiscountResult = backend.invoke(json!({ "base_cost": base_cost })).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            print_heading(&result.discount_type);
            println!("Base cost:              {}", format_usd(result.base_cost));
            println!(
                "Discount ({}%):         -{}",
                result.savings_percentage.normalize(),
                format_usd(result.discount_amount)
            );
            println!(
                "{}             {}",
                "Final cost:".bold(),
                format_usd(result.final_cost).green().bold()
            );
        }
    }

    Ok(())
}

pub async fn compare(
    backend: &Backend,
    onprem_cost: Decimal,
    aws_cost: Decimal,
    format: OutputFormat,
) -> Result<()> {
    let comparison: Comparison = backend
        .invoke(json!({ "onprem_cost": onprem_cost, "aws_cost": aws_cost }))
        .await?;

    match format {
        OutputFormat::Json => print_json(&comparison)?,
        OutputFormat::Table => print_comparison(&comparison),
    }

    Ok(())
}

/// Accept a breakdown list or a saved estimate holding one
fn breakdown_document(input: Value) -> Result<Value> {
    match input {
        Value::Array(lines) => Ok(Value::Array(lines)),
        Value::Object(mut map) => match map.remove("breakdown") {
            Some(lines @ Value::Array(_)) => Ok(lines),
            _ => bail!("Expected a 'breakdown' list in the input object"),
        },
        _ => bail!("Breakdown must be a list of service costs or an estimate object"),
    }
}

pub async fn optimize(backend: &Backend, breakdown_file: &Path, format: OutputFormat) -> Result<()> {
    let breakdown = breakdown_document(read_json_input(breakdown_file)?)?;
    let report: OptimizationReport = backend.invoke(json!({ "breakdown": breakdown })).await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_optimizations(&report.optimizations);
            println!(
                "{} {} across {} suggestions",
                "Potential savings:".bold(),
                format_usd(report.total_potential_savings).green().bold(),
                report.count
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_document_shapes() {
        let lines = json!([{"service_name": "Amazon S3"}]);
        assert_eq!(breakdown_document(lines.clone()).unwrap(), lines);
        assert_eq!(
            breakdown_document(json!({"total_monthly_cost": 1.0, "breakdown": lines.clone()}))
                .unwrap(),
            lines
        );
        assert!(breakdown_document(json!({"total_monthly_cost": 1.0})).is_err());
        assert!(breakdown_document(json!(42)).is_err());
    }
}
