//! Core data models for cost analysis
//!
//! Every value here is request-scoped. Money fields are `Decimal` rounded to
//! cents and serialize as plain JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{CostError, CostResult};
use crate::money::{checked_sum, round_money};

/// Free-form per-service configuration as supplied by the caller
pub type Configuration = Map<String, Value>;

/// Billing model of a catalog entry or an estimated line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingModel {
    #[serde(rename = "On-Demand")]
    OnDemand,
    #[serde(rename = "Reserved")]
    Reserved,
    #[serde(rename = "Per-Request")]
    PerRequest,
    #[serde(rename = "Per-GB")]
    PerGB,
}

impl PricingModel {
    pub fn label(&self) -> &'static str {
        match self {
            PricingModel::OnDemand => "On-Demand",
            PricingModel::Reserved => "Reserved",
            PricingModel::PerRequest => "Per-Request",
            PricingModel::PerGB => "Per-GB",
        }
    }

    /// Parse a caller-supplied label, accepting the common spellings
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "on-demand" | "ondemand" | "on_demand" => Some(PricingModel::OnDemand),
            "reserved" => Some(PricingModel::Reserved),
            "per-request" | "perrequest" | "per_request" => Some(PricingModel::PerRequest),
            "per-gb" | "pergb" | "per_gb" => Some(PricingModel::PerGB),
            _ => None,
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One service of an architecture as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfiguration {
    pub service_name: String,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl ServiceConfiguration {
    pub fn new(service_name: impl Into<String>, configuration: Configuration) -> Self {
        Self {
            service_name: service_name.into(),
            configuration,
            region: None,
        }
    }
}

/// Ordered list of services to price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    #[serde(default)]
    pub services: Vec<ServiceConfiguration>,
}

/// Estimated monthly cost of a single service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCost {
    pub service_name: String,
    #[serde(default)]
    pub configuration: Configuration,
    pub monthly_cost: Decimal,
    /// Monthly rate for one unit
    pub unit_cost: Decimal,
    pub units: Decimal,
    pub pricing_model: PricingModel,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    crate::analyzer::DEFAULT_REGION.to_string()
}

/// Implementation effort of an optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Effort {
    Low,
    Medium,
    High,
}

/// Priority of an optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Effort::Low => "LOW",
            Effort::Medium => "MEDIUM",
            Effort::High => "HIGH",
        })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        })
    }
}

/// A single cost reduction suggestion for one line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optimization {
    pub service_name: String,
    pub recommendation: String,
    pub current_cost: Decimal,
    pub optimized_cost: Decimal,
    pub potential_savings: Decimal,
    pub effort: Effort,
    pub priority: Priority,
}

/// Ranked optimizations with summary figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub optimizations: Vec<Optimization>,
    pub count: usize,
    pub total_potential_savings: Decimal,
}

impl OptimizationReport {
    pub fn new(optimizations: Vec<Optimization>) -> CostResult<Self> {
        let total = checked_sum(optimizations.iter().map(|o| o.potential_savings))
            .ok_or_else(|| CostError::invalid_input("total potential savings overflows"))?;
        Ok(Self {
            count: optimizations.len(),
            total_potential_savings: round_money(total),
            optimizations,
        })
    }
}

/// Result of applying the enterprise discount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountResult {
    pub base_cost: Decimal,
    pub discount_rate: Decimal,
    pub discount_amount: Decimal,
    pub final_cost: Decimal,
    pub discount_type: String,
    pub savings_percentage: Decimal,
}

/// On-premises versus AWS monthly cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub onprem_monthly_cost: Decimal,
    pub aws_monthly_cost: Decimal,
    /// Negative when AWS is cheaper
    pub difference: Decimal,
    pub percentage_change: Decimal,
    pub breakeven_months: Option<u32>,
}

/// Aggregate estimate for an architecture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Sum of the breakdown, before any discount
    pub total_monthly_cost: Decimal,
    pub breakdown: Vec<ServiceCost>,
    pub optimizations: Vec<Optimization>,
    pub anz_discount_applied: Decimal,
    pub comparison_with_onprem: Option<Comparison>,
}

impl CostEstimate {
    /// Record a separately computed discount. The total is left untouched.
    pub fn with_discount(mut self, discount: &DiscountResult) -> Self {
        self.anz_discount_applied = discount.discount_amount;
        self
    }

    /// Attach a separately computed on-premises comparison
    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison_with_onprem = Some(comparison);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_pricing_model_labels() {
        assert_eq!(
            serde_json::to_value(PricingModel::OnDemand).unwrap(),
            json!("On-Demand")
        );
        assert_eq!(
            serde_json::to_value(PricingModel::Reserved).unwrap(),
            json!("Reserved")
        );
        assert_eq!(PricingModel::parse("on-demand"), Some(PricingModel::OnDemand));
        assert_eq!(PricingModel::parse("Reserved"), Some(PricingModel::Reserved));
        assert_eq!(PricingModel::parse("spot"), None);
    }

    #[test]
    fn test_effort_and_priority_labels() {
        assert_eq!(serde_json::to_value(Effort::Low).unwrap(), json!("LOW"));
        assert_eq!(serde_json::to_value(Priority::High).unwrap(), json!("HIGH"));
        assert_eq!(Priority::Medium.to_string(), "MEDIUM");
    }

    #[test]
    fn test_service_cost_region_defaults_when_absent() {
        let cost: ServiceCost = serde_json::from_value(json!({
            "service_name": "Amazon S3",
            "monthly_cost": 2.3,
            "unit_cost": 0.023,
            "units": 100,
            "pricing_model": "Per-GB"
        }))
        .unwrap();

        assert_eq!(cost.region, "us-east-1");
        assert_eq!(cost.monthly_cost, dec!(2.3));
        assert!(cost.configuration.is_empty());
    }

    #[test]
    fn test_money_serializes_as_number() {
        let comparison = Comparison {
            onprem_monthly_cost: dec!(8000.00),
            aws_monthly_cost: dec!(5420.00),
            difference: dec!(-2580.00),
            percentage_change: dec!(-32.25),
            breakeven_months: None,
        };
        let value = serde_json::to_value(&comparison).unwrap();
        assert_eq!(value["difference"], json!(-2580.0));
        assert_eq!(value["percentage_change"], json!(-32.25));
        assert!(value["breakeven_months"].is_null());
    }

    #[test]
    fn test_estimate_merges_keep_total() {
        let estimate = CostEstimate {
            total_monthly_cost: dec!(1000.00),
            breakdown: Vec::new(),
            optimizations: Vec::new(),
            anz_discount_applied: Decimal::ZERO,
            comparison_with_onprem: None,
        };
        let discount = DiscountResult {
            base_cost: dec!(1000.00),
            discount_rate: dec!(0.10),
            discount_amount: dec!(100.00),
            final_cost: dec!(900.00),
            discount_type: "ANZ Enterprise Agreement".to_string(),
            savings_percentage: dec!(10.0),
        };

        let merged = estimate.with_discount(&discount);
        assert_eq!(merged.total_monthly_cost, dec!(1000.00));
        assert_eq!(merged.anz_discount_applied, dec!(100.00));
    }

    fn reserved_suggestion(savings: Decimal) -> Optimization {
        Optimization {
            service_name: "Amazon EC2".to_string(),
            recommendation: "Use Reserved Instances for Amazon EC2".to_string(),
            current_cost: savings * dec!(2.5),
            optimized_cost: savings * dec!(1.5),
            potential_savings: savings,
            effort: Effort::Low,
            priority: Priority::High,
        }
    }

    #[test]
    fn test_report_totals() {
        let report = OptimizationReport::new(vec![reserved_suggestion(dec!(40.00))]).unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.total_potential_savings, dec!(40.00));
    }

    #[test]
    fn test_report_total_overflow_is_invalid_input() {
        let huge = dec!(30000000000000000000000000000);
        let err = OptimizationReport::new(vec![
            reserved_suggestion(huge),
            reserved_suggestion(huge),
            reserved_suggestion(huge),
        ])
        .unwrap_err();
        assert!(matches!(err, CostError::InvalidInput { .. }));
        assert!(err.to_string().contains("overflows"));
    }
}
