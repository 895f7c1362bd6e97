//! Pricing catalog
//!
//! This module provides the read-only price table behind the analyzer:
//! - `PricingEntry` rows keyed by exact service name
//! - The `PricingSource` lookup seam, so a live pricing adapter can replace
//!   the static table
//! - Built-in AWS defaults and JSON catalog files

mod builtin;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::models::PricingModel;

/// Coarse service category selecting the unit and optimization rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// Hourly instances (EC2-class)
    Compute,
    /// Hourly instances plus provisioned storage (RDS-class)
    Database,
    /// Primary plus read replicas over shared storage and I/O (Aurora-class)
    ClusteredDatabase,
    /// Read/write capacity plus storage per table (DynamoDB-class)
    KeyValueStore,
    /// Hourly brokers with per-broker storage (MSK-class)
    Streaming,
    /// Hourly cache nodes
    Cache,
    /// Per-GB object storage with storage classes
    ObjectStorage,
    /// Per-GB shared file storage
    FileStorage,
    /// Per-GB block volumes
    BlockStorage,
    /// Per-invocation functions (Lambda-class)
    Function,
    /// Hourly load balancers plus capacity units
    LoadBalancer,
    /// Per-million-request services, optionally with a free allowance and a
    /// cheaper second tier
    Requests,
    /// Fixed unit price times a caller-supplied unit count
    Flat,
}

/// One row of the pricing catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub service_name: String,
    pub category: ServiceCategory,
    /// Default per-unit price, used when the category has no variants
    pub unit_cost: Decimal,
    pub unit_label: String,
    pub pricing_model: PricingModel,
    /// Variant used when the configuration does not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_variant: Option<String>,
    /// Variant prices, e.g. instance type to hourly price
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rates: BTreeMap<String, Decimal>,
    /// Auxiliary named prices, e.g. `storage_per_gb`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, Decimal>,
}

impl PricingEntry {
    /// Price of a named variant
    pub fn rate(&self, variant: &str) -> Option<Decimal> {
        self.rates.get(variant).copied()
    }

    /// Named auxiliary price, zero when absent
    pub fn component(&self, name: &str) -> Decimal {
        self.components.get(name).copied().unwrap_or(Decimal::ZERO)
    }

    fn validate(&self) -> Result<()> {
        if self.service_name.trim().is_empty() {
            bail!("catalog entry has an empty service_name");
        }
        if self.unit_cost.is_sign_negative() {
            bail!("{}: unit_cost must be non-negative", self.service_name);
        }
        if let Some((name, _)) = self
            .rates
            .iter()
            .chain(self.components.iter())
            .find(|(_, rate)| rate.is_sign_negative())
        {
            bail!("{}: rate '{}' must be non-negative", self.service_name, name);
        }
        if let Some(variant) = &self.default_variant {
            if !self.rates.contains_key(variant) {
                bail!(
                    "{}: default_variant '{}' has no rate",
                    self.service_name,
                    variant
                );
            }
        }
        Ok(())
    }
}

/// Resolves service names to pricing entries
///
/// Implementations must be read-only after construction; the analyzer shares
/// one instance across concurrent callers without locking.
pub trait PricingSource: Send + Sync {
    /// Exact, case-sensitive lookup
    fn resolve(&self, service_name: &str) -> Option<&PricingEntry>;

    /// All entries, ordered by service name
    fn entries(&self) -> Vec<&PricingEntry>;
}

/// Static in-memory pricing catalog
#[derive(Debug, Clone, Default)]
pub struct PricingCatalog {
    entries: BTreeMap<String, PricingEntry>,
}

impl PricingCatalog {
    /// Build a catalog, rejecting duplicates and malformed rows
    pub fn from_entries(entries: Vec<PricingEntry>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for entry in entries {
            entry.validate()?;
            let name = entry.service_name.clone();
            if map.insert(name.clone(), entry).is_some() {
                bail!("duplicate catalog entry for service '{}'", name);
            }
        }
        Ok(Self { entries: map })
    }

    /// Built-in AWS price table (us-east-1 list prices)
    pub fn aws_default() -> Self {
        let entries = builtin::entries()
            .into_iter()
            .map(|entry| (entry.service_name.clone(), entry))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PricingSource for PricingCatalog {
    fn resolve(&self, service_name: &str) -> Option<&PricingEntry> {
        self.entries.get(service_name)
    }

    fn entries(&self) -> Vec<&PricingEntry> {
        self.entries.values().collect()
    }
}

/// Load a catalog from a JSON file holding an array of entries
pub fn load_catalog(path: impl AsRef<Path>) -> Result<PricingCatalog> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    let entries: Vec<PricingEntry> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog file {}", path.display()))?;

    let catalog = PricingCatalog::from_entries(entries)
        .with_context(|| format!("Invalid catalog file {}", path.display()))?;
    debug!(path = %path.display(), entries = catalog.len(), "Loaded pricing catalog");

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn flat_entry(name: &str, unit_cost: Decimal) -> PricingEntry {
        PricingEntry {
            service_name: name.to_string(),
            category: ServiceCategory::Flat,
            unit_cost,
            unit_label: "per unit".to_string(),
            pricing_model: PricingModel::OnDemand,
            default_variant: None,
            rates: BTreeMap::new(),
            components: BTreeMap::new(),
        }
    }

    #[test]
    fn test_default_catalog_lookup_is_exact() {
        let catalog = PricingCatalog::aws_default();

        let ec2 = catalog.resolve("Amazon EC2").unwrap();
        assert_eq!(ec2.category, ServiceCategory::Compute);
        assert_eq!(ec2.rate("t3.xlarge"), Some(dec!(0.1664)));

        assert!(catalog.resolve("amazon ec2").is_none());
        assert!(catalog.resolve("Amazon Foo").is_none());
    }

    #[test]
    fn test_default_catalog_covers_data_and_streaming_services() {
        let catalog = PricingCatalog::aws_default();

        let aurora = catalog.resolve("Amazon Aurora").unwrap();
        assert_eq!(aurora.category, ServiceCategory::ClusteredDatabase);
        assert_eq!(aurora.rate("db.r6g.large"), Some(dec!(0.26)));
        assert_eq!(aurora.component("io_per_million"), dec!(0.20));

        let dynamodb = catalog.resolve("Amazon DynamoDB").unwrap();
        assert_eq!(dynamodb.category, ServiceCategory::KeyValueStore);
        assert_eq!(dynamodb.component("provisioned_write_per_hour"), dec!(0.00065));

        let msk = catalog.resolve("Amazon MSK").unwrap();
        assert_eq!(msk.category, ServiceCategory::Streaming);
        assert_eq!(msk.rate("kafka.m5.large"), Some(dec!(0.21)));

        let s3 = catalog.resolve("Amazon S3").unwrap();
        assert_eq!(s3.component("requests_per_thousand"), dec!(0.0004));

        let api = catalog.resolve("Amazon API Gateway").unwrap();
        assert_eq!(api.component("first_tier_requests"), dec!(1000000));
        assert_eq!(api.component("next_tier_per_million"), dec!(3.00));
    }

    #[test]
    fn test_new_categories_round_trip_through_json() {
        let value = serde_json::to_value(ServiceCategory::ClusteredDatabase).unwrap();
        assert_eq!(value, serde_json::json!("clustered_database"));
        let parsed: ServiceCategory = serde_json::from_str(r#""key_value_store""#).unwrap();
        assert_eq!(parsed, ServiceCategory::KeyValueStore);
    }

    #[test]
    fn test_default_catalog_entries_are_valid() {
        let catalog = PricingCatalog::aws_default();
        assert!(!catalog.is_empty());
        for entry in catalog.entries() {
            entry.validate().unwrap();
        }
    }

    #[test]
    fn test_entries_sorted_by_name() {
        let catalog = PricingCatalog::aws_default();
        let names: Vec<_> = catalog.entries().iter().map(|e| e.service_name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let result = PricingCatalog::from_entries(vec![
            flat_entry("Internal Service", dec!(10)),
            flat_entry("Internal Service", dec!(12)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let result = PricingCatalog::from_entries(vec![flat_entry("Broken", dec!(-1))]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_variant_must_have_rate() {
        let mut entry = flat_entry("Custom Compute", dec!(0));
        entry.category = ServiceCategory::Compute;
        entry.default_variant = Some("x1.large".to_string());
        assert!(PricingCatalog::from_entries(vec![entry]).is_err());
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{
                    "service_name": "Amazon EC2",
                    "category": "compute",
                    "unit_cost": 0,
                    "unit_label": "per instance-month",
                    "pricing_model": "On-Demand",
                    "default_variant": "m5.large",
                    "rates": {{ "m5.large": 0.096 }}
                }},
                {{
                    "service_name": "Internal Tooling",
                    "category": "flat",
                    "unit_cost": 250,
                    "unit_label": "per seat",
                    "pricing_model": "On-Demand"
                }}
            ]"#
        )
        .unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.resolve("Amazon EC2").unwrap().rate("m5.large"),
            Some(dec!(0.096))
        );
        assert_eq!(
            catalog.resolve("Internal Tooling").unwrap().unit_cost,
            dec!(250)
        );
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let err = load_catalog("/nonexistent/catalog.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read catalog file"));
    }
}
