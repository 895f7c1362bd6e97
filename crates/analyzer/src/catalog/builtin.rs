//! Built-in AWS list prices (us-east-1, USD)

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::{PricingEntry, ServiceCategory};
use crate::models::PricingModel;

fn entry(
    service_name: &str,
    category: ServiceCategory,
    unit_cost: Decimal,
    unit_label: &str,
    pricing_model: PricingModel,
) -> PricingEntry {
    PricingEntry {
        service_name: service_name.to_string(),
        category,
        unit_cost,
        unit_label: unit_label.to_string(),
        pricing_model,
        default_variant: None,
        rates: BTreeMap::new(),
        components: BTreeMap::new(),
    }
}

fn with_variants(mut entry: PricingEntry, default: &str, rates: &[(&str, Decimal)]) -> PricingEntry {
    entry.default_variant = Some(default.to_string());
    entry.rates = rates
        .iter()
        .map(|(name, rate)| (name.to_string(), *rate))
        .collect();
    entry
}

fn with_components(mut entry: PricingEntry, components: &[(&str, Decimal)]) -> PricingEntry {
    entry.components = components
        .iter()
        .map(|(name, rate)| (name.to_string(), *rate))
        .collect();
    entry
}

pub(super) fn entries() -> Vec<PricingEntry> {
    vec![
        with_variants(
            entry(
                "Amazon EC2",
                ServiceCategory::Compute,
                Decimal::ZERO,
                "per instance-month",
                PricingModel::OnDemand,
            ),
            "t3.medium",
            &[
                ("t3.micro", dec!(0.0104)),
                ("t3.small", dec!(0.0208)),
                ("t3.medium", dec!(0.0416)),
                ("t3.large", dec!(0.0832)),
                ("t3.xlarge", dec!(0.1664)),
                ("t3.2xlarge", dec!(0.3328)),
                ("m5.large", dec!(0.096)),
                ("m5.xlarge", dec!(0.192)),
                ("m5.2xlarge", dec!(0.384)),
                ("c5.large", dec!(0.085)),
                ("c5.xlarge", dec!(0.17)),
                ("r5.large", dec!(0.126)),
                ("r5.xlarge", dec!(0.252)),
            ],
        ),
        with_components(
            with_variants(
                entry(
                    "Amazon RDS",
                    ServiceCategory::Database,
                    Decimal::ZERO,
                    "per instance-month",
                    PricingModel::OnDemand,
                ),
                "db.t3.medium",
                &[
                    ("db.t3.micro", dec!(0.017)),
                    ("db.t3.small", dec!(0.034)),
                    ("db.t3.medium", dec!(0.068)),
                    ("db.t3.large", dec!(0.136)),
                    ("db.r5.large", dec!(0.24)),
                    ("db.r5.xlarge", dec!(0.48)),
                    ("db.m5.large", dec!(0.192)),
                    ("db.m5.xlarge", dec!(0.384)),
                ],
            ),
            &[("storage_per_gb", dec!(0.115))],
        ),
        with_components(
            with_variants(
                entry(
                    "Amazon Aurora",
                    ServiceCategory::ClusteredDatabase,
                    Decimal::ZERO,
                    "per cluster-month",
                    PricingModel::OnDemand,
                ),
                "db.r5.large",
                &[
                    ("db.r5.large", dec!(0.29)),
                    ("db.r5.xlarge", dec!(0.58)),
                    ("db.r5.2xlarge", dec!(1.16)),
                    ("db.r6g.large", dec!(0.26)),
                    ("db.r6g.xlarge", dec!(0.52)),
                ],
            ),
            &[("storage_per_gb", dec!(0.10)), ("io_per_million", dec!(0.20))],
        ),
        with_components(
            entry(
                "Amazon DynamoDB",
                ServiceCategory::KeyValueStore,
                Decimal::ZERO,
                "per table-month",
                PricingModel::PerRequest,
            ),
            &[
                ("on_demand_read_per_million", dec!(0.25)),
                ("on_demand_write_per_million", dec!(1.25)),
                ("provisioned_read_per_hour", dec!(0.00013)),
                ("provisioned_write_per_hour", dec!(0.00065)),
                ("storage_per_gb", dec!(0.25)),
            ],
        ),
        with_variants(
            entry(
                "Amazon ElastiCache",
                ServiceCategory::Cache,
                Decimal::ZERO,
                "per node-month",
                PricingModel::OnDemand,
            ),
            "cache.t3.medium",
            &[
                ("cache.t3.micro", dec!(0.017)),
                ("cache.t3.small", dec!(0.034)),
                ("cache.t3.medium", dec!(0.068)),
                ("cache.r5.large", dec!(0.188)),
                ("cache.r5.xlarge", dec!(0.376)),
                ("cache.m5.large", dec!(0.161)),
                ("cache.m5.xlarge", dec!(0.322)),
            ],
        ),
        with_components(
            with_variants(
                entry(
                    "Amazon S3",
                    ServiceCategory::ObjectStorage,
                    dec!(0.023),
                    "per GB-month",
                    PricingModel::PerGB,
                ),
                "S3 Standard",
                &[
                    ("S3 Standard", dec!(0.023)),
                    ("S3 Intelligent-Tiering", dec!(0.023)),
                    ("S3 Standard-IA", dec!(0.0125)),
                    ("S3 One Zone-IA", dec!(0.01)),
                    ("S3 Glacier Instant Retrieval", dec!(0.004)),
                    ("S3 Glacier Flexible Retrieval", dec!(0.0036)),
                    ("S3 Glacier Deep Archive", dec!(0.00099)),
                ],
            ),
            &[("requests_per_thousand", dec!(0.0004))],
        ),
        with_variants(
            entry(
                "Amazon EFS",
                ServiceCategory::FileStorage,
                dec!(0.30),
                "per GB-month",
                PricingModel::PerGB,
            ),
            "Standard",
            &[("Standard", dec!(0.30)), ("Infrequent Access", dec!(0.025))],
        ),
        with_variants(
            entry(
                "Amazon EBS",
                ServiceCategory::BlockStorage,
                Decimal::ZERO,
                "per volume-month",
                PricingModel::PerGB,
            ),
            "gp3",
            &[
                ("gp2", dec!(0.10)),
                ("gp3", dec!(0.08)),
                ("io1", dec!(0.125)),
                ("io2", dec!(0.125)),
                ("st1", dec!(0.045)),
                ("sc1", dec!(0.015)),
            ],
        ),
        with_components(
            entry(
                "AWS Lambda",
                ServiceCategory::Function,
                dec!(0.20),
                "per million invocations",
                PricingModel::PerRequest,
            ),
            &[
                ("requests_per_million", dec!(0.20)),
                ("compute_per_million_gb_seconds", dec!(16.67)),
            ],
        ),
        with_components(
            entry(
                "Application Load Balancer",
                ServiceCategory::LoadBalancer,
                dec!(0.0225),
                "per load balancer-month",
                PricingModel::OnDemand,
            ),
            &[("lcu_hour", dec!(0.008))],
        ),
        with_components(
            entry(
                "Network Load Balancer",
                ServiceCategory::LoadBalancer,
                dec!(0.0225),
                "per load balancer-month",
                PricingModel::OnDemand,
            ),
            &[("lcu_hour", dec!(0.006))],
        ),
        with_components(
            entry(
                "Amazon SQS",
                ServiceCategory::Requests,
                dec!(0.40),
                "per million requests",
                PricingModel::PerRequest,
            ),
            &[("free_requests", dec!(1000000))],
        ),
        with_components(
            entry(
                "Amazon SNS",
                ServiceCategory::Requests,
                dec!(0.50),
                "per million requests",
                PricingModel::PerRequest,
            ),
            &[("free_requests", dec!(1000000))],
        ),
        // First tier billed at the unit cost, the rest at the next-tier rate
        with_components(
            entry(
                "Amazon API Gateway",
                ServiceCategory::Requests,
                dec!(3.50),
                "per million requests",
                PricingModel::PerRequest,
            ),
            &[
                ("first_tier_requests", dec!(1000000)),
                ("next_tier_per_million", dec!(3.00)),
            ],
        ),
        with_components(
            with_variants(
                entry(
                    "Amazon MSK",
                    ServiceCategory::Streaming,
                    Decimal::ZERO,
                    "per broker-month",
                    PricingModel::OnDemand,
                ),
                "kafka.m5.large",
                &[
                    ("kafka.t3.small", dec!(0.038)),
                    ("kafka.m5.large", dec!(0.21)),
                    ("kafka.m5.xlarge", dec!(0.42)),
                    ("kafka.m5.2xlarge", dec!(0.84)),
                ],
            ),
            &[("storage_per_gb", dec!(0.10))],
        ),
        // Billed through the resources it provisions
        entry(
            "AWS Elastic Beanstalk",
            ServiceCategory::Flat,
            Decimal::ZERO,
            "per environment",
            PricingModel::OnDemand,
        ),
    ]
}
