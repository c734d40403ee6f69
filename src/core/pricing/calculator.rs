use rust_decimal::Decimal;

use crate::core::models::cost::CostBreakdown;
use crate::core::models::workload::{ClusterWorkload, ServerlessWarehouse, WorkloadConfig};
use crate::core::pricing::catalog::{PricingCatalog, PricingError};

/// Price one workload against a catalog snapshot.
///
/// Pure: no I/O, no shared state. Lookup failures are returned unchanged;
/// a product past the `Decimal` range is [`PricingError::Overflow`].
pub fn compute(
    config: &WorkloadConfig,
    catalog: &PricingCatalog,
) -> Result<CostBreakdown, PricingError> {
    match config {
        WorkloadConfig::Cluster(cluster) => compute_cluster(config, cluster, catalog),
        WorkloadConfig::Serverless(warehouse) => compute_serverless(config, warehouse, catalog),
    }
}

// Consumption is charged per node-hour across driver and executors alike;
// instance cost splits into one driver plus `executor_nodes` executors.
fn compute_cluster(
    config: &WorkloadConfig,
    cluster: &ClusterWorkload,
    catalog: &PricingCatalog,
) -> Result<CostBreakdown, PricingError> {
    let product = Product::new(config);
    let monthly_hours = cluster.schedule().monthly_hours();
    let executors = Decimal::from(cluster.executor_nodes());
    let total_nodes = Decimal::from(cluster.total_nodes());

    let rate = catalog.consumption_rate(cluster.kind(), cluster.acceleration_mode())?;
    let node_hours = product.of(&[total_nodes, monthly_hours])?;
    let consumption_cost = product.of(&[rate, node_hours])?;

    let driver_price = catalog.instance_price(cluster.driver_instance())?;
    // looked up even for driver-only clusters so a gap in the catalog surfaces
    let executor_price = catalog.instance_price(cluster.executor_instance())?;

    let driver_instance_cost = product.of(&[driver_price, monthly_hours])?;
    let executor_instance_cost = product.of(&[executor_price, executors, monthly_hours])?;

    CostBreakdown::new(
        config,
        node_hours,
        consumption_cost,
        driver_instance_cost,
        executor_instance_cost,
    )
}

fn compute_serverless(
    config: &WorkloadConfig,
    warehouse: &ServerlessWarehouse,
    catalog: &PricingCatalog,
) -> Result<CostBreakdown, PricingError> {
    let product = Product::new(config);
    let monthly_hours = warehouse.schedule().monthly_hours();
    let rate = catalog.serverless_rate(warehouse.size())?;
    let node_hours = product.of(&[Decimal::from(warehouse.clusters()), monthly_hours])?;

    CostBreakdown::new(
        config,
        node_hours,
        product.of(&[rate, node_hours])?,
        Decimal::ZERO,
        Decimal::ZERO,
    )
}

/// Checked multiplication that reports overflow against one workload.
struct Product<'a> {
    workload: &'a str,
}

impl<'a> Product<'a> {
    fn new(config: &'a WorkloadConfig) -> Self {
        Self {
            workload: config.name(),
        }
    }

    fn of(&self, factors: &[Decimal]) -> Result<Decimal, PricingError> {
        factors
            .iter()
            .try_fold(Decimal::ONE, |acc, factor| acc.checked_mul(*factor))
            .ok_or_else(|| PricingError::overflow(self.workload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::workload::{ClusterInput, ServerlessInput, WorkloadInput};
    use crate::core::pricing::catalog::fixtures::{sample_catalog, sample_input};
    use crate::core::pricing::catalog::InstancePriceInput;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn jobs_cluster(executor_nodes: u32) -> WorkloadConfig {
        cluster(ClusterInput {
            name: Some("nightly-etl".to_string()),
            kind: "jobs".to_string(),
            accelerated: false,
            driver: "r5.large".to_string(),
            executor: Some("same_as_driver".to_string()),
            executor_nodes,
            hours_per_day: dec!(8),
            days_per_month: 20,
        })
    }

    fn cluster(input: ClusterInput) -> WorkloadConfig {
        WorkloadInput::Cluster(input)
            .into_config(0, &sample_catalog())
            .unwrap()
    }

    fn small_warehouse(clusters: u32) -> WorkloadConfig {
        WorkloadInput::Serverless(ServerlessInput {
            name: Some("bi".to_string()),
            size: "Small".to_string(),
            clusters,
            hours_per_day: dec!(10),
            days_per_month: 22,
        })
        .into_config(0, &sample_catalog())
        .unwrap()
    }

    #[test]
    fn cluster_worked_example() {
        let cost = compute(&jobs_cluster(2), &sample_catalog()).unwrap();
        assert_eq!(cost.monthly_hours(), dec!(160));
        assert_eq!(cost.node_hours(), dec!(480));
        assert_eq!(cost.consumption_cost(), dec!(86.40));
        assert_eq!(cost.driver_instance_cost(), dec!(23.68));
        assert_eq!(cost.executor_instance_cost(), dec!(47.36));
        assert_eq!(cost.instance_cost(), dec!(71.04));
        assert_eq!(cost.total_cost(), dec!(157.44));
        assert_eq!(cost.name(), "nightly-etl");
        assert_eq!(cost.kind(), "jobs");
    }

    #[test]
    fn serverless_worked_example() {
        let cost = compute(&small_warehouse(1), &sample_catalog()).unwrap();
        assert_eq!(cost.monthly_hours(), dec!(220));
        assert_eq!(cost.consumption_cost(), dec!(880.00));
        assert_eq!(cost.instance_cost(), Decimal::ZERO);
        assert_eq!(cost.total_cost(), dec!(880.00));
    }

    #[test]
    fn serverless_clusters_multiply_consumption() {
        let cost = compute(&small_warehouse(3), &sample_catalog()).unwrap();
        assert_eq!(cost.node_hours(), dec!(660));
        assert_eq!(cost.consumption_cost(), dec!(2640));
        assert_eq!(cost.instance_cost(), Decimal::ZERO);
    }

    #[test]
    fn driver_only_cluster() {
        let cost = compute(&jobs_cluster(0), &sample_catalog()).unwrap();
        assert_eq!(cost.consumption_cost(), dec!(28.80)); // 0.18 * 1 * 160
        assert_eq!(cost.driver_instance_cost(), dec!(23.68));
        assert_eq!(cost.executor_instance_cost(), Decimal::ZERO);
        assert_eq!(cost.total_cost(), dec!(52.48));
    }

    #[test]
    fn accelerated_uses_accelerated_rate() {
        let config = cluster(ClusterInput {
            name: None,
            kind: "jobs".to_string(),
            accelerated: true,
            driver: "r5.large".to_string(),
            executor: None,
            executor_nodes: 2,
            hours_per_day: dec!(8),
            days_per_month: 20,
        });
        let cost = compute(&config, &sample_catalog()).unwrap();
        assert_eq!(cost.consumption_cost(), dec!(172.80)); // 0.36 * 3 * 160
        assert_eq!(cost.instance_cost(), dec!(71.04));
        assert_eq!(cost.kind(), "jobs-accelerated");
    }

    #[test]
    fn mixed_driver_and_executor_types() {
        let config = cluster(ClusterInput {
            name: None,
            kind: "all-purpose".to_string(),
            accelerated: false,
            driver: "m5.large".to_string(),
            executor: Some("r5.xlarge".to_string()),
            executor_nodes: 4,
            hours_per_day: dec!(10),
            days_per_month: 10,
        });
        let cost = compute(&config, &sample_catalog()).unwrap();
        assert_eq!(cost.consumption_cost(), dec!(275.00)); // 0.55 * 5 * 100
        assert_eq!(cost.driver_instance_cost(), dec!(12.40)); // 0.124 * 100
        assert_eq!(cost.executor_instance_cost(), dec!(118.40)); // 0.296 * 4 * 100
        assert_eq!(cost.total_cost(), dec!(405.80));
    }

    #[test]
    fn missing_consumption_rate_propagates() {
        let config = cluster(ClusterInput {
            name: None,
            kind: "dlt-advanced".to_string(),
            accelerated: true,
            driver: "r5.large".to_string(),
            executor: None,
            executor_nodes: 1,
            hours_per_day: dec!(1),
            days_per_month: 1,
        });
        assert!(matches!(
            compute(&config, &sample_catalog()),
            Err(PricingError::MissingConsumptionRate { .. })
        ));
    }

    #[test]
    fn missing_executor_price_surfaces_even_without_executors() {
        let config = cluster(ClusterInput {
            name: None,
            kind: "jobs".to_string(),
            accelerated: false,
            driver: "r5.large".to_string(),
            executor: Some("x1e.xlarge".to_string()),
            executor_nodes: 0,
            hours_per_day: dec!(8),
            days_per_month: 20,
        });
        assert_eq!(
            compute(&config, &sample_catalog()),
            Err(PricingError::MissingInstancePrice("x1e.xlarge".to_string()))
        );
    }

    #[test]
    fn serverless_ignores_instance_prices() {
        let mut input = sample_input();
        input.instance_prices = vec![InstancePriceInput {
            instance_type: "r5.large".to_string(),
            hourly_rate: dec!(999.99),
        }];
        let catalog = PricingCatalog::from_input(input).unwrap();
        let cost = compute(&small_warehouse(1), &catalog).unwrap();
        assert_eq!(cost.instance_cost(), Decimal::ZERO);
        assert_eq!(cost.total_cost(), dec!(880));
    }

    #[test]
    fn oversized_product_is_an_error_not_a_panic() {
        let mut input = sample_input();
        input.consumption_rates[2].rate = Decimal::from_i128_with_scale(10_i128.pow(21), 0);
        let catalog = PricingCatalog::from_input(input).unwrap();
        let config = cluster(ClusterInput {
            name: Some("fleet".to_string()),
            kind: "jobs".to_string(),
            accelerated: false,
            driver: "r5.large".to_string(),
            executor: None,
            executor_nodes: 1_000_000,
            hours_per_day: dec!(24),
            days_per_month: 31,
        });
        assert_eq!(
            compute(&config, &catalog),
            Err(PricingError::Overflow {
                workload: "fleet".to_string()
            })
        );
    }

    #[test]
    fn max_executor_count_keeps_the_driver_node() {
        let config = cluster(ClusterInput {
            name: None,
            kind: "jobs".to_string(),
            accelerated: false,
            driver: "r5.large".to_string(),
            executor: None,
            executor_nodes: u32::MAX,
            hours_per_day: dec!(1),
            days_per_month: 1,
        });
        let cost = compute(&config, &sample_catalog()).unwrap();
        assert_eq!(cost.node_hours(), Decimal::from(4_294_967_296_u64));
    }

    proptest! {
        #[test]
        fn executor_cost_is_linear_in_node_count(
            nodes in 1u32..500,
            tenth_hours in 1u32..=240,
            days in 1u32..=31,
        ) {
            let catalog = sample_catalog();
            let make = |executor_nodes: u32| cluster(ClusterInput {
                name: None,
                kind: "all-purpose".to_string(),
                accelerated: false,
                driver: "m5.large".to_string(),
                executor: Some("r5.xlarge".to_string()),
                executor_nodes,
                hours_per_day: Decimal::new(i64::from(tenth_hours), 1),
                days_per_month: days,
            });
            let single = compute(&make(nodes), &catalog).unwrap();
            let double = compute(&make(nodes * 2), &catalog).unwrap();

            prop_assert_eq!(
                double.executor_instance_cost(),
                single.executor_instance_cost() * Decimal::from(2)
            );
            prop_assert_eq!(double.driver_instance_cost(), single.driver_instance_cost());
        }

        #[test]
        fn total_is_exact_sum_of_parts(
            nodes in 0u32..200,
            tenth_hours in 1u32..=240,
            days in 1u32..=31,
            accelerated in any::<bool>(),
        ) {
            let config = cluster(ClusterInput {
                name: None,
                kind: "jobs".to_string(),
                accelerated,
                driver: "r5.large".to_string(),
                executor: None,
                executor_nodes: nodes,
                hours_per_day: Decimal::new(i64::from(tenth_hours), 1),
                days_per_month: days,
            });
            let cost = compute(&config, &sample_catalog()).unwrap();
            prop_assert_eq!(cost.total_cost(), cost.consumption_cost() + cost.instance_cost());
            prop_assert_eq!(
                cost.instance_cost(),
                cost.driver_instance_cost() + cost.executor_instance_cost()
            );
        }

        #[test]
        fn serverless_never_has_instance_cost(
            clusters in 1u32..=10,
            hours in 1u32..=24,
            days in 1u32..=31,
            medium in any::<bool>(),
        ) {
            let config = WorkloadInput::Serverless(ServerlessInput {
                name: None,
                size: if medium { "Medium" } else { "Small" }.to_string(),
                clusters,
                hours_per_day: Decimal::from(hours),
                days_per_month: days,
            })
            .into_config(0, &sample_catalog())
            .unwrap();
            let cost = compute(&config, &sample_catalog()).unwrap();
            prop_assert_eq!(cost.instance_cost(), Decimal::ZERO);
            prop_assert_eq!(cost.total_cost(), cost.consumption_cost());
        }
    }
}
