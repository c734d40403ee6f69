use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::models::workload::WorkloadConfig;
use crate::core::pricing::catalog::PricingError;

/// Itemized monthly cost of one workload.
///
/// `instance_cost` and `total_cost` are derived in [`CostBreakdown::new`]
/// from their parts, so the total is always the exact sum of consumption
/// and instance cost. A sum past the `Decimal` range is an error, never a
/// panic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    name: String,
    kind: String,
    monthly_hours: Decimal,
    node_hours: Decimal,
    consumption_cost: Decimal,
    driver_instance_cost: Decimal,
    executor_instance_cost: Decimal,
    instance_cost: Decimal,
    total_cost: Decimal,
}

impl CostBreakdown {
    pub(crate) fn new(
        config: &WorkloadConfig,
        node_hours: Decimal,
        consumption_cost: Decimal,
        driver_instance_cost: Decimal,
        executor_instance_cost: Decimal,
    ) -> Result<Self, PricingError> {
        let overflow = || PricingError::overflow(config.name());
        let instance_cost = driver_instance_cost
            .checked_add(executor_instance_cost)
            .ok_or_else(overflow)?;
        let total_cost = consumption_cost
            .checked_add(instance_cost)
            .ok_or_else(overflow)?;
        Ok(Self {
            name: config.name().to_string(),
            kind: config.kind_label(),
            monthly_hours: config.schedule().monthly_hours(),
            node_hours,
            consumption_cost,
            driver_instance_cost,
            executor_instance_cost,
            instance_cost,
            total_cost,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn monthly_hours(&self) -> Decimal {
        self.monthly_hours
    }

    pub fn node_hours(&self) -> Decimal {
        self.node_hours
    }

    pub fn consumption_cost(&self) -> Decimal {
        self.consumption_cost
    }

    pub fn driver_instance_cost(&self) -> Decimal {
        self.driver_instance_cost
    }

    pub fn executor_instance_cost(&self) -> Decimal {
        self.executor_instance_cost
    }

    pub fn instance_cost(&self) -> Decimal {
        self.instance_cost
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub workload: WorkloadConfig,
    pub cost: CostBreakdown,
}

/// Costs for a full set of workloads. Rebuilt from scratch on every
/// recomputation; totals come from [`Report::from_rows`] only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    rows: Vec<ReportRow>,
    total_consumption: Decimal,
    total_instance: Decimal,
    grand_total: Decimal,
    total_node_hours: Decimal,
}

impl Report {
    /// Sum the rows. Overflow names the row whose addition went out of range.
    pub(crate) fn from_rows(rows: Vec<ReportRow>) -> Result<Self, PricingError> {
        let mut total_consumption = Decimal::ZERO;
        let mut total_instance = Decimal::ZERO;
        let mut grand_total = Decimal::ZERO;
        let mut total_node_hours = Decimal::ZERO;
        for row in &rows {
            let cost = &row.cost;
            let sums = (
                total_consumption.checked_add(cost.consumption_cost()),
                total_instance.checked_add(cost.instance_cost()),
                grand_total.checked_add(cost.total_cost()),
                total_node_hours.checked_add(cost.node_hours()),
            );
            let (Some(consumption), Some(instance), Some(total), Some(node_hours)) = sums else {
                return Err(PricingError::overflow(cost.name()));
            };
            total_consumption = consumption;
            total_instance = instance;
            grand_total = total;
            total_node_hours = node_hours;
        }
        Ok(Self {
            rows,
            total_consumption,
            total_instance,
            grand_total,
            total_node_hours,
        })
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_consumption(&self) -> Decimal {
        self.total_consumption
    }

    pub fn total_instance(&self) -> Decimal {
        self.total_instance
    }

    pub fn grand_total(&self) -> Decimal {
        self.grand_total
    }

    pub fn total_node_hours(&self) -> Decimal {
        self.total_node_hours
    }
}
