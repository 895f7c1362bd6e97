//! Pricing catalog listing

use anyhow::{bail, Result};
use cost_analyzer::PricingEntry;
use tabled::Tabled;

use crate::backend::Backend;
use crate::output::{format_usd, print_heading, print_json, print_rows, OutputFormat};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Model")]
    pricing_model: String,
    #[tabled(rename = "Unit Cost")]
    unit_cost: String,
    #[tabled(rename = "Unit")]
    unit_label: String,
    #[tabled(rename = "Default")]
    default_variant: String,
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Variant")]
    variant: String,
    #[tabled(rename = "Rate")]
    rate: String,
}

fn rate_text(rate: rust_decimal::Decimal) -> String {
    format!("${}", rate.normalize())
}

pub async fn show_catalog(
    backend: &Backend,
    service: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let entries = backend.catalog().await?;

    let Some(service) = service else {
        return match format {
            OutputFormat::Json => print_json(&entries),
            OutputFormat::Table => {
                print_rows(entries.iter().map(entry_row).collect(), "Catalog is empty");
                Ok(())
            }
        };
    };

    let Some(entry) = entries.iter().find(|e| e.service_name == service) else {
        bail!("Pricing data not available for service: {}", service);
    };

    match format {
        OutputFormat::Json => print_json(entry)?,
        OutputFormat::Table => {
            print_heading(&entry.service_name);
            println!("Unit cost:              {} {}", format_usd(entry.unit_cost), entry.unit_label);
            println!("Pricing model:          {}", entry.pricing_model);
            if let Some(default) = &entry.default_variant {
                println!("Default variant:        {}", default);
            }
            if !entry.rates.is_empty() {
                println!();
                print_rows(
                    entry
                        .rates
                        .iter()
                        .map(|(variant, rate)| RateRow {
                            variant: variant.clone(),
                            rate: rate_text(*rate),
                        })
                        .collect(),
                    "No variants",
                );
            }
            if !entry.components.is_empty() {
                println!();
                print_rows(
                    entry
                        .components
                        .iter()
                        .map(|(name, rate)| RateRow {
                            variant: name.clone(),
                            rate: rate_text(*rate),
                        })
                        .collect(),
                    "No components",
                );
            }
        }
    }

    Ok(())
}

fn entry_row(entry: &PricingEntry) -> EntryRow {
    EntryRow {
        service: entry.service_name.clone(),
        pricing_model: entry.pricing_model.to_string(),
        unit_cost: rate_text(entry.unit_cost),
        unit_label: entry.unit_label.clone(),
        default_variant: entry.default_variant.clone().unwrap_or_else(|| "-".to_string()),
    }
}
