//! Rule-based cost optimization heuristics
//!
//! Each breakdown line is matched against a fixed table keyed by the
//! service's catalog category and its configuration. A line may yield zero,
//! one or several alternative suggestions; they are never combined.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::catalog::{PricingEntry, PricingSource, ServiceCategory};
use crate::configuration::ConfigReader;
use crate::models::{Effort, Optimization, PricingModel, Priority, ServiceCost};
use crate::money::round_money;

/// Reserved Instance savings for EC2-class compute
pub const RESERVED_COMPUTE_RATE: Decimal = dec!(0.40);

/// Reserved Instance savings for RDS-class databases
pub const RESERVED_DATABASE_RATE: Decimal = dec!(0.35);

pub const RIGHT_SIZING_RATE: Decimal = dec!(0.25);
pub const MULTI_AZ_RATE: Decimal = dec!(0.50);
pub const LIFECYCLE_RATE: Decimal = dec!(0.30);
pub const FUNCTION_MEMORY_RATE: Decimal = dec!(0.20);
pub const VOLUME_MIGRATION_RATE: Decimal = dec!(0.20);

/// Lambda memory size above which the memory heuristic fires
const FUNCTION_MEMORY_THRESHOLD_MB: Decimal = dec!(512);

/// A matched heuristic before it is priced against the line item
struct Heuristic {
    recommendation: String,
    rate: Decimal,
    effort: Effort,
    priority: Priority,
}

impl Heuristic {
    fn new(recommendation: String, rate: Decimal, effort: Effort, priority: Priority) -> Self {
        Self {
            recommendation,
            rate,
            effort,
            priority,
        }
    }

    fn reserved(service: &str, rate: Decimal) -> Self {
        Self::new(
            format!("Use Reserved Instances for {}", service),
            rate,
            Effort::Low,
            Priority::High,
        )
    }

    fn right_sizing(service: &str) -> Self {
        Self::new(
            format!("Right-size {} instances based on utilization", service),
            RIGHT_SIZING_RATE,
            Effort::Medium,
            Priority::Medium,
        )
    }

    /// Price the suggestion; `None` when it would not save at least a cent
    fn apply(self, line: &ServiceCost) -> Option<Optimization> {
        let current_cost = line.monthly_cost;
        let optimized_cost = round_money(current_cost * (Decimal::ONE - self.rate));
        let potential_savings = current_cost - optimized_cost;

        if potential_savings <= Decimal::ZERO {
            return None;
        }

        Some(Optimization {
            service_name: line.service_name.clone(),
            recommendation: self.recommendation,
            current_cost,
            optimized_cost,
            potential_savings,
            effort: self.effort,
            priority: self.priority,
        })
    }
}

fn is_large_instance(size: Option<&str>) -> bool {
    size.map(|s| s.contains("large")).unwrap_or(false)
}

fn heuristics(entry: &PricingEntry, line: &ServiceCost) -> Vec<Heuristic> {
    let service = line.service_name.as_str();
    let reader = ConfigReader::new(service, &line.configuration);
    let on_demand = line.pricing_model == PricingModel::OnDemand;
    let mut matched = Vec::new();

    match entry.category {
        ServiceCategory::Compute => {
            if on_demand {
                matched.push(Heuristic::reserved(service, RESERVED_COMPUTE_RATE));
            }
            if is_large_instance(reader.text("instance_type").ok().flatten()) {
                matched.push(Heuristic::right_sizing(service));
            }
        }
        ServiceCategory::Database | ServiceCategory::ClusteredDatabase => {
            if on_demand {
                matched.push(Heuristic::reserved(service, RESERVED_DATABASE_RATE));
            }
            if is_large_instance(reader.text("instance_class").ok().flatten()) {
                matched.push(Heuristic::right_sizing(service));
            }
            // No environment tag is checked; the flag alone triggers it
            if reader.flag("multi_az", false).unwrap_or(false) {
                matched.push(Heuristic::new(
                    format!("Disable Multi-AZ for non-production {} instances", service),
                    MULTI_AZ_RATE,
                    Effort::Low,
                    Priority::Medium,
                ));
            }
        }
        ServiceCategory::ObjectStorage | ServiceCategory::FileStorage => {
            let class = reader
                .text("storage_class")
                .ok()
                .flatten()
                .or(entry.default_variant.as_deref());
            if class.is_some() && class == entry.default_variant.as_deref() {
                matched.push(Heuristic::new(
                    format!(
                        "Implement {} lifecycle policies to transition to cheaper storage classes",
                        service
                    ),
                    LIFECYCLE_RATE,
                    Effort::Low,
                    Priority::Medium,
                ));
            }
        }
        ServiceCategory::Function => {
            let memory = reader
                .number("memory", dec!(1024))
                .unwrap_or(Decimal::ZERO);
            if memory > FUNCTION_MEMORY_THRESHOLD_MB {
                matched.push(Heuristic::new(
                    format!("Optimize {} memory allocation based on actual usage", service),
                    FUNCTION_MEMORY_RATE,
                    Effort::Low,
                    Priority::Medium,
                ));
            }
        }
        ServiceCategory::BlockStorage => {
            if reader.text("volume_type").ok().flatten() == Some("gp2") {
                matched.push(Heuristic::new(
                    format!("Migrate {} volumes from gp2 to gp3", service),
                    VOLUME_MIGRATION_RATE,
                    Effort::Low,
                    Priority::Medium,
                ));
            }
        }
        ServiceCategory::Cache
        | ServiceCategory::KeyValueStore
        | ServiceCategory::Streaming
        | ServiceCategory::LoadBalancer
        | ServiceCategory::Requests
        | ServiceCategory::Flat => {}
    }

    matched
}

/// Suggestions for every line of a breakdown, grouped by line in input order
///
/// Lines whose service is absent from the catalog produce nothing.
pub fn identify_cost_optimizations(
    catalog: &dyn PricingSource,
    breakdown: &[ServiceCost],
) -> Vec<Optimization> {
    breakdown
        .iter()
        .filter_map(|line| catalog.resolve(&line.service_name).map(|entry| (entry, line)))
        .flat_map(|(entry, line)| {
            heuristics(entry, line)
                .into_iter()
                .filter_map(move |h| h.apply(line))
        })
        .collect()
}

/// Order by potential savings, highest first; ties keep input order
pub fn rank(mut optimizations: Vec<Optimization>) -> Vec<Optimization> {
    optimizations.sort_by(|a, b| b.potential_savings.cmp(&a.potential_savings));
    optimizations
}
