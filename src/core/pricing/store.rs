use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::core::models::cost::Report;
use crate::core::models::workload::WorkloadConfig;
use crate::core::pricing::catalog::{PricingCatalog, PricingError};
use crate::core::pricing::report::aggregate;

/// Holds the current pricing catalog and lets it be replaced while other
/// threads keep estimating.
///
/// Readers take a snapshot and price against it; a replacement installs a
/// whole new catalog in one step, so an estimate never mixes rates from two
/// catalogs.
pub struct CatalogStore {
    current: ArcSwap<PricingCatalog>,
}

impl CatalogStore {
    pub fn new(catalog: PricingCatalog) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
        }
    }

    pub fn snapshot(&self) -> Arc<PricingCatalog> {
        self.current.load_full()
    }

    /// Install `catalog` and return the one it replaced.
    pub fn replace(&self, catalog: PricingCatalog) -> Arc<PricingCatalog> {
        let summary = catalog.summary();
        let previous = self.current.swap(Arc::new(catalog));
        tracing::info!(
            instance_prices = summary.instance_prices,
            consumption_rates = summary.consumption_rates,
            "pricing catalog replaced"
        );
        previous
    }

    /// Aggregate against a single snapshot taken at call time.
    pub fn estimate(&self, configs: &[WorkloadConfig]) -> Result<Report, PricingError> {
        let catalog = self.snapshot();
        aggregate(configs, &catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::workload::{ServerlessInput, WorkloadInput};
    use crate::core::pricing::catalog::fixtures::{sample_catalog, sample_input};
    use rust_decimal_macros::dec;

    fn doubled_catalog() -> PricingCatalog {
        let mut input = sample_input();
        for rate in &mut input.serverless_rates {
            rate.rate_per_hour *= dec!(2);
        }
        PricingCatalog::from_input(input).unwrap()
    }

    fn warehouse() -> WorkloadConfig {
        WorkloadInput::Serverless(ServerlessInput {
            name: Some("bi".to_string()),
            size: "Small".to_string(),
            clusters: 1,
            hours_per_day: dec!(10),
            days_per_month: 22,
        })
        .into_config(0, &sample_catalog())
        .unwrap()
    }

    #[test]
    fn replace_changes_later_estimates_only() {
        let store = CatalogStore::new(sample_catalog());
        let configs = vec![warehouse()];

        let before = store.snapshot();
        assert_eq!(store.estimate(&configs).unwrap().grand_total(), dec!(880));

        let previous = store.replace(doubled_catalog());
        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(store.estimate(&configs).unwrap().grand_total(), dec!(1760));

        // a snapshot taken earlier still prices with the old rates
        assert_eq!(aggregate(&configs, &before).unwrap().grand_total(), dec!(880));
    }

    #[test]
    fn concurrent_readers_see_one_catalog_or_the_other() {
        let store = CatalogStore::new(sample_catalog());
        let configs = vec![warehouse(), warehouse()];

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..200 {
                        let total = store.estimate(&configs).unwrap().grand_total();
                        assert!(
                            total == dec!(1760) || total == dec!(3520),
                            "mixed catalog total {total}"
                        );
                    }
                });
            }
            scope.spawn(|| {
                for i in 0..50 {
                    if i % 2 == 0 {
                        store.replace(doubled_catalog());
                    } else {
                        store.replace(sample_catalog());
                    }
                }
            });
        });
    }
}
