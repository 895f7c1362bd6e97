//! Cost analyzer
//!
//! Prices a described architecture against a `PricingSource`. Every
//! operation is a pure function over the catalog and the caller's input.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{PricingCatalog, PricingEntry, PricingSource, ServiceCategory};
use crate::configuration::ConfigReader;
use crate::error::{CostError, CostResult};
use crate::models::{
    Architecture, Comparison, Configuration, CostEstimate, DiscountResult, Optimization,
    PricingModel, ServiceCost,
};
use crate::money::{checked_product, checked_sum, round_money, round_rate, HOURS_PER_MONTH};
use crate::optimizer;

/// Region reported when the caller does not name one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Flat ANZ enterprise agreement discount
pub const ANZ_DISCOUNT_RATE: Decimal = dec!(0.10);

pub const ANZ_DISCOUNT_TYPE: &str = "ANZ Enterprise Agreement";

const DEFAULT_STORAGE_GB: Decimal = dec!(100);
const DEFAULT_LAMBDA_MEMORY_MB: Decimal = dec!(1024);
const DEFAULT_LAMBDA_DURATION_MS: Decimal = dec!(200);
const DEFAULT_MONTHLY_REQUESTS: Decimal = dec!(1000000);
const DEFAULT_OBJECT_REQUESTS: Decimal = dec!(10000);
const DEFAULT_TABLE_STORAGE_GB: Decimal = dec!(10);
const DEFAULT_TABLE_READS: Decimal = dec!(1000000);
const DEFAULT_TABLE_WRITES: Decimal = dec!(500000);
const DEFAULT_CAPACITY_UNITS: u64 = 5;
/// One broker in each of two availability zones
const DEFAULT_BROKERS: u64 = 2;
const ONE_THOUSAND: Decimal = dec!(1000);
const ONE_MILLION: Decimal = dec!(1000000);

/// Per-unit monthly rate, unit count and billing model for one line item
struct Pricing {
    unit_cost: Decimal,
    units: Decimal,
    pricing_model: PricingModel,
}

/// Rule-based AWS cost analyzer
#[derive(Clone)]
pub struct CostAnalyzer {
    catalog: Arc<dyn PricingSource>,
    region: String,
}

impl CostAnalyzer {
    pub fn new(catalog: Arc<dyn PricingSource>) -> Self {
        Self {
            catalog,
            region: DEFAULT_REGION.to_string(),
        }
    }

    /// Analyzer over the built-in AWS catalog
    pub fn aws_default() -> Self {
        Self::new(Arc::new(PricingCatalog::aws_default()))
    }

    /// Override the region reported when a call does not name one
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn catalog(&self) -> &dyn PricingSource {
        self.catalog.as_ref()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Estimate the monthly cost of one service
    pub fn estimate_service_cost(
        &self,
        service_name: &str,
        configuration: &Configuration,
        region: Option<&str>,
    ) -> CostResult<ServiceCost> {
        let entry = self
            .catalog
            .resolve(service_name)
            .ok_or_else(|| CostError::unknown_service(service_name))?;

        let reader = ConfigReader::new(service_name, configuration);
        let pricing = price(entry, &reader)?;

        let unit_cost = round_rate(pricing.unit_cost);
        let units = pricing.units.normalize();
        let monthly_cost = round_money(multiply(entry, &[unit_cost, units])?);

        debug!(
            service = %service_name,
            unit_cost = %unit_cost,
            units = %units,
            monthly_cost = %monthly_cost,
            "Estimated service cost"
        );

        Ok(ServiceCost {
            service_name: service_name.to_string(),
            configuration: configuration.clone(),
            monthly_cost,
            unit_cost,
            units,
            pricing_model: pricing.pricing_model,
            region: region.unwrap_or(&self.region).to_string(),
        })
    }

    /// Price every service of an architecture and rank optimizations
    ///
    /// Fails on the first unknown service; a partial total is never returned.
    /// The discount and on-premises comparison are separate caller steps.
    pub fn calculate_total_cost(
        &self,
        architecture: &Architecture,
        region: Option<&str>,
    ) -> CostResult<CostEstimate> {
        if architecture.services.is_empty() {
            return Err(CostError::invalid_input(
                "architecture must contain at least one service",
            ));
        }

        let breakdown = architecture
            .services
            .iter()
            .map(|service| {
                let region = service.region.as_deref().or(region);
                self.estimate_service_cost(&service.service_name, &service.configuration, region)
            })
            .collect::<CostResult<Vec<_>>>()?;

        let total = checked_sum(breakdown.iter().map(|s| s.monthly_cost))
            .ok_or_else(|| CostError::invalid_input("architecture total cost overflows"))?;
        let optimizations = optimizer::rank(self.identify_cost_optimizations(&breakdown));

        Ok(CostEstimate {
            total_monthly_cost: round_money(total),
            breakdown,
            optimizations,
            anz_discount_applied: Decimal::ZERO,
            comparison_with_onprem: None,
        })
    }

    /// Apply the flat enterprise discount to a base monthly cost
    pub fn apply_anz_discounts(&self, base_cost: Decimal) -> CostResult<DiscountResult> {
        if base_cost < Decimal::ZERO {
            return Err(CostError::invalid_input("base_cost must be non-negative"));
        }

        let base = round_money(base_cost);
        let final_cost = round_money(base_cost * (Decimal::ONE - ANZ_DISCOUNT_RATE));

        Ok(DiscountResult {
            base_cost: base,
            discount_rate: ANZ_DISCOUNT_RATE,
            discount_amount: base - final_cost,
            final_cost,
            discount_type: ANZ_DISCOUNT_TYPE.to_string(),
            savings_percentage: (ANZ_DISCOUNT_RATE * dec!(100)).round_dp(1),
        })
    }

    /// Heuristic optimizations for a breakdown, in no particular order
    pub fn identify_cost_optimizations(&self, breakdown: &[ServiceCost]) -> Vec<Optimization> {
        optimizer::identify_cost_optimizations(self.catalog.as_ref(), breakdown)
    }

    /// Compare an on-premises monthly figure with the AWS estimate
    pub fn compare_costs(&self, onprem_cost: Decimal, aws_cost: Decimal) -> CostResult<Comparison> {
        if onprem_cost < Decimal::ZERO || aws_cost < Decimal::ZERO {
            return Err(CostError::invalid_input("costs must be non-negative"));
        }
        if onprem_cost.is_zero() {
            return Err(CostError::invalid_input(
                "onprem_cost must be greater than zero to compute a percentage change",
            ));
        }

        let difference = aws_cost - onprem_cost;
        let percentage_change = difference
            .checked_div(onprem_cost)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .map(round_money)
            .ok_or_else(|| CostError::invalid_input("percentage change overflows"))?;

        Ok(Comparison {
            onprem_monthly_cost: round_money(onprem_cost),
            aws_monthly_cost: round_money(aws_cost),
            difference: round_money(difference),
            percentage_change,
            breakeven_months: None,
        })
    }
}

/// Resolve a variant rate such as an instance type's hourly price
fn variant_rate(entry: &PricingEntry, reader: &ConfigReader<'_>, key: &str) -> CostResult<Decimal> {
    let Some(variant) = reader.text(key)?.or(entry.default_variant.as_deref()) else {
        // Entries without variants price everything at the flat unit cost
        if entry.rates.is_empty() {
            return Ok(entry.unit_cost);
        }
        return Err(CostError::invalid_input(format!(
            "{}: configuration field '{}' is required",
            entry.service_name, key
        )));
    };

    entry.rate(variant).ok_or_else(|| {
        CostError::invalid_input(format!(
            "{}: unsupported {} '{}'",
            entry.service_name, key, variant
        ))
    })
}

/// Billing model for instance-based services, which may be reserved
fn instance_pricing_model(entry: &PricingEntry, reader: &ConfigReader<'_>) -> CostResult<PricingModel> {
    match reader.text("pricing_model")? {
        None => Ok(entry.pricing_model),
        Some(label) => match PricingModel::parse(label) {
            Some(model @ (PricingModel::OnDemand | PricingModel::Reserved)) => Ok(model),
            _ => Err(CostError::invalid_input(format!(
                "{}: unsupported pricing_model '{}'",
                entry.service_name, label
            ))),
        },
    }
}

fn overflow(entry: &PricingEntry) -> CostError {
    CostError::invalid_input(format!("{}: cost overflows", entry.service_name))
}

fn multiply(entry: &PricingEntry, factors: &[Decimal]) -> CostResult<Decimal> {
    checked_product(factors).ok_or_else(|| overflow(entry))
}

fn add(entry: &PricingEntry, terms: &[Decimal]) -> CostResult<Decimal> {
    checked_sum(terms.iter().copied()).ok_or_else(|| overflow(entry))
}

fn divide(entry: &PricingEntry, dividend: Decimal, divisor: Decimal) -> CostResult<Decimal> {
    dividend.checked_div(divisor).ok_or_else(|| overflow(entry))
}

/// DynamoDB-style capacity billing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CapacityMode {
    OnDemand,
    Provisioned,
}

fn capacity_mode(entry: &PricingEntry, reader: &ConfigReader<'_>) -> CostResult<CapacityMode> {
    let Some(label) = reader.text("capacity_mode")? else {
        return Ok(CapacityMode::OnDemand);
    };
    match label.trim().to_ascii_lowercase().as_str() {
        "on-demand" | "ondemand" | "on_demand" => Ok(CapacityMode::OnDemand),
        "provisioned" => Ok(CapacityMode::Provisioned),
        _ => Err(CostError::invalid_input(format!(
            "{}: unsupported capacity_mode '{}'",
            entry.service_name, label
        ))),
    }
}

fn price(entry: &PricingEntry, reader: &ConfigReader<'_>) -> CostResult<Pricing> {
    let hours = Decimal::from(HOURS_PER_MONTH);

    let pricing = match entry.category {
        ServiceCategory::Compute => Pricing {
            unit_cost: multiply(entry, &[variant_rate(entry, reader, "instance_type")?, hours])?,
            units: reader.count("instances", 1)?.into(),
            pricing_model: instance_pricing_model(entry, reader)?,
        },
        ServiceCategory::Cache => Pricing {
            unit_cost: multiply(entry, &[variant_rate(entry, reader, "node_type")?, hours])?,
            units: reader.count("num_nodes", 1)?.into(),
            pricing_model: instance_pricing_model(entry, reader)?,
        },
        ServiceCategory::Database => {
            let instance = multiply(entry, &[variant_rate(entry, reader, "instance_class")?, hours])?;
            let storage_gb = reader.quantity_gb("storage", DEFAULT_STORAGE_GB)?;
            let storage = multiply(entry, &[storage_gb, entry.component("storage_per_gb")])?;
            // Multi-AZ runs a standby replica of the same size
            let units = if reader.flag("multi_az", false)? { 2 } else { 1 };
            Pricing {
                unit_cost: add(entry, &[instance, storage])?,
                units: Decimal::from(units),
                pricing_model: instance_pricing_model(entry, reader)?,
            }
        }
        ServiceCategory::ClusteredDatabase => {
            let instances = Decimal::from(reader.count("replicas", 0)?) + Decimal::ONE;
            let compute = multiply(
                entry,
                &[variant_rate(entry, reader, "instance_class")?, hours, instances],
            )?;
            let storage_gb = reader.quantity_gb("storage", DEFAULT_STORAGE_GB)?;
            let storage_gb = reader.quantity_gb("storage_gb", storage_gb)?;
            let storage = multiply(entry, &[storage_gb, entry.component("storage_per_gb")])?;
            let io_requests = reader.number("io_requests_per_month", DEFAULT_MONTHLY_REQUESTS)?;
            let io = multiply(entry, &[io_requests / ONE_MILLION, entry.component("io_per_million")])?;
            Pricing {
                unit_cost: add(entry, &[compute, storage, io])?,
                units: reader.count("clusters", 1)?.into(),
                pricing_model: instance_pricing_model(entry, reader)?,
            }
        }
        ServiceCategory::KeyValueStore => {
            let mode = capacity_mode(entry, reader)?;
            let (reads, writes) = match mode {
                CapacityMode::OnDemand => {
                    let reads = reader.number("estimated_read_units", DEFAULT_TABLE_READS)?;
                    let writes = reader.number("estimated_write_units", DEFAULT_TABLE_WRITES)?;
                    (
                        multiply(entry, &[reads / ONE_MILLION, entry.component("on_demand_read_per_million")])?,
                        multiply(entry, &[writes / ONE_MILLION, entry.component("on_demand_write_per_million")])?,
                    )
                }
                CapacityMode::Provisioned => {
                    let rcu = reader.count("read_capacity_units", DEFAULT_CAPACITY_UNITS)?;
                    let wcu = reader.count("write_capacity_units", DEFAULT_CAPACITY_UNITS)?;
                    (
                        multiply(entry, &[Decimal::from(rcu), entry.component("provisioned_read_per_hour"), hours])?,
                        multiply(entry, &[Decimal::from(wcu), entry.component("provisioned_write_per_hour"), hours])?,
                    )
                }
            };
            let storage_gb = reader.quantity_gb("storage_gb", DEFAULT_TABLE_STORAGE_GB)?;
            let storage = multiply(entry, &[storage_gb, entry.component("storage_per_gb")])?;
            Pricing {
                unit_cost: add(entry, &[reads, writes, storage])?,
                units: reader.count("tables", 1)?.into(),
                // Provisioned throughput is billed by the hour
                pricing_model: match mode {
                    CapacityMode::OnDemand => PricingModel::PerRequest,
                    CapacityMode::Provisioned => PricingModel::OnDemand,
                },
            }
        }
        ServiceCategory::Streaming => {
            let broker = multiply(entry, &[variant_rate(entry, reader, "broker_type")?, hours])?;
            let storage_gb = reader.quantity_gb("storage_per_broker", DEFAULT_STORAGE_GB)?;
            let storage = multiply(entry, &[storage_gb, entry.component("storage_per_gb")])?;
            Pricing {
                unit_cost: add(entry, &[broker, storage])?,
                units: reader.count("brokers", DEFAULT_BROKERS)?.into(),
                pricing_model: entry.pricing_model,
            }
        }
        ServiceCategory::ObjectStorage | ServiceCategory::FileStorage => {
            let rate = variant_rate(entry, reader, "storage_class")?;
            let storage = reader.quantity_gb("storage", DEFAULT_STORAGE_GB)?;
            let storage_gb = reader.quantity_gb("storage_gb", storage)?;
            let request_rate = entry.component("requests_per_thousand");

            if request_rate.is_zero() {
                Pricing {
                    unit_cost: rate,
                    units: storage_gb,
                    pricing_model: entry.pricing_model,
                }
            } else {
                let thousands = reader.number("requests_per_month", DEFAULT_OBJECT_REQUESTS)? / ONE_THOUSAND;
                if storage_gb.is_zero() {
                    // Nothing stored: only the requests are billed
                    Pricing {
                        unit_cost: request_rate,
                        units: thousands,
                        pricing_model: PricingModel::PerRequest,
                    }
                } else {
                    // Request charges are spread over the stored GB
                    let requests = multiply(entry, &[thousands, request_rate])?;
                    Pricing {
                        unit_cost: add(entry, &[rate, divide(entry, requests, storage_gb)?])?,
                        units: storage_gb,
                        pricing_model: entry.pricing_model,
                    }
                }
            }
        }
        ServiceCategory::BlockStorage => {
            let size_gb = reader.quantity_gb("size", DEFAULT_STORAGE_GB)?;
            Pricing {
                unit_cost: multiply(entry, &[variant_rate(entry, reader, "volume_type")?, size_gb])?,
                units: reader.count("volumes", 1)?.into(),
                pricing_model: entry.pricing_model,
            }
        }
        ServiceCategory::Function => {
            let memory_gb = reader.number("memory", DEFAULT_LAMBDA_MEMORY_MB)? / dec!(1024);
            let duration_secs =
                reader.number("avg_duration_ms", DEFAULT_LAMBDA_DURATION_MS)? / ONE_THOUSAND;
            let invocations = reader.number("invocations_per_month", DEFAULT_MONTHLY_REQUESTS)?;
            // One million invocations consume one million times this many GB-seconds
            let compute = multiply(
                entry,
                &[memory_gb, duration_secs, entry.component("compute_per_million_gb_seconds")],
            )?;
            Pricing {
                unit_cost: add(entry, &[entry.component("requests_per_million"), compute])?,
                units: invocations / ONE_MILLION,
                pricing_model: entry.pricing_model,
            }
        }
        ServiceCategory::LoadBalancer => {
            let lcus = reader.number("lcus", Decimal::ONE)?;
            let lcu_cost = multiply(entry, &[lcus, entry.component("lcu_hour")])?;
            Pricing {
                unit_cost: multiply(entry, &[add(entry, &[entry.unit_cost, lcu_cost])?, hours])?,
                units: reader.count("load_balancers", 1)?.into(),
                pricing_model: entry.pricing_model,
            }
        }
        ServiceCategory::Requests => {
            let requests = reader.number("requests_per_month", DEFAULT_MONTHLY_REQUESTS)?;
            let billable = (requests - entry.component("free_requests")).max(Decimal::ZERO);
            let units = billable / ONE_MILLION;
            let first_tier = entry.component("first_tier_requests");

            let unit_cost = if first_tier > Decimal::ZERO && billable > first_tier {
                // Blend both tiers into one per-million rate
                let first = multiply(entry, &[first_tier / ONE_MILLION, entry.unit_cost])?;
                let rest = multiply(
                    entry,
                    &[(billable - first_tier) / ONE_MILLION, entry.component("next_tier_per_million")],
                )?;
                divide(entry, add(entry, &[first, rest])?, units)?
            } else {
                entry.unit_cost
            };
            Pricing {
                unit_cost,
                units,
                pricing_model: entry.pricing_model,
            }
        }
        ServiceCategory::Flat => Pricing {
            unit_cost: entry.unit_cost,
            units: reader.number("units", Decimal::ONE)?,
            pricing_model: entry.pricing_model,
        },
    };

    Ok(pricing)
}
