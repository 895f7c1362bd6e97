//! Service and architecture estimates

use anyhow::{bail, Result};
use colored::Colorize;
use cost_analyzer::{Comparison, CostEstimate, DiscountResult, ServiceCost};
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use std::path::Path;
use tabled::Tabled;

use super::{read_json_input, savings};
use crate::backend::Backend;
use crate::output::{
    format_usd, print_heading, print_info, print_json, print_rows, OutputFormat,
};

#[derive(Tabled)]
struct ServiceCostRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Model")]
    pricing_model: String,
    #[tabled(rename = "Unit Cost")]
    unit_cost: String,
    #[tabled(rename = "Units")]
    units: String,
    #[tabled(rename = "Monthly")]
    monthly_cost: String,
    #[tabled(rename = "Region")]
    region: String,
}

impl From<&ServiceCost> for ServiceCostRow {
    fn from(cost: &ServiceCost) -> Self {
        Self {
            service: cost.service_name.clone(),
            pricing_model: cost.pricing_model.to_string(),
            unit_cost: format_usd(cost.unit_cost),
            units: cost.units.normalize().to_string(),
            monthly_cost: format_usd(cost.monthly_cost),
            region: cost.region.clone(),
        }
    }
}

pub async fn estimate_service(
    backend: &Backend,
    service: &str,
    configuration: Map<String, Value>,
    region: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let mut request = json!({
        "service": service,
        "configuration": configuration,
    });
    if let Some(region) = region {
        request["region"] = json!(region);
    }

    let cost: ServiceCost = backend.invoke(request).await?;

    match format {
        OutputFormat::Json => print_json(&cost)?,
        OutputFormat::Table => {
            print_rows(vec![ServiceCostRow::from(&cost)], "No estimate");
            println!(
                "{} {}",
                "Monthly cost:".bold(),
                format_usd(cost.monthly_cost).green().bold()
            );
        }
    }

    Ok(())
}

/// Accept `{"services": [...]}` or a bare service list
fn architecture_document(input: Value) -> Result<Value> {
    match input {
        Value::Array(services) => Ok(json!({ "services": services })),
        Value::Object(map) if map.contains_key("services") => Ok(Value::Object(map)),
        _ => bail!("Architecture must be a list of services or an object with a 'services' list"),
    }
}

pub async fn estimate_total(
    backend: &Backend,
    architecture_file: &Path,
    region: Option<&str>,
    onprem: Option<Decimal>,
    discount: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut request = json!({ "architecture": architecture_document(read_json_input(architecture_file)?)? });
    if let Some(region) = region {
        request["region"] = json!(region);
    }

    let mut estimate: CostEstimate = backend.invoke(request).await?;

    let discount_result: Option<DiscountResult> = if discount {
        let result: DiscountResult = backend
            .invoke(json!({ "base_cost": estimate.total_monthly_cost }))
            .await?;
        estimate = estimate.with_discount(&result);
        Some(result)
    } else {
        None
    };

    if let Some(onprem_cost) = onprem {
        let comparison: Comparison = backend
            .invoke(json!({
                "onprem_cost": onprem_cost,
                "aws_cost": estimate.total_monthly_cost,
            }))
            .await?;
        estimate = estimate.with_comparison(comparison);
    }

    match format {
        OutputFormat::Json => print_json(&estimate)?,
        OutputFormat::Table => print_estimate(&estimate, discount_result.as_ref()),
    }

    Ok(())
}

fn print_estimate(estimate: &CostEstimate, discount: Option<&DiscountResult>) {
    print_heading("Architecture Cost Estimate");
    print_rows(
        estimate.breakdown.iter().map(ServiceCostRow::from).collect(),
        "No services",
    );
    println!(
        "{} {}",
        "Total monthly cost:".bold(),
        format_usd(estimate.total_monthly_cost).green().bold()
    );

    if let Some(discount) = discount {
        println!(
            "{} -{} ({})",
            "Discount:".bold(),
            format_usd(discount.discount_amount),
            discount.discount_type
        );
        println!(
            "{} {}",
            "After discount:".bold(),
            format_usd(discount.final_cost).green().bold()
        );
    }

    if let Some(comparison) = &estimate.comparison_with_onprem {
        println!();
        savings::print_comparison(comparison);
    }

    println!();
    if estimate.optimizations.is_empty() {
        print_info("No optimizations identified");
    } else {
        savings::print_optimizations(&estimate.optimizations);
    }
}
