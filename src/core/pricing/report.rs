use crate::core::models::cost::{Report, ReportRow};
use crate::core::models::workload::WorkloadConfig;
use crate::core::pricing::calculator::compute;
use crate::core::pricing::catalog::{PricingCatalog, PricingError};

/// Price every workload in order and roll the results up into a [`Report`].
///
/// Fails on the first workload whose pricing data is missing; no partial
/// report is produced. An empty workload list yields an empty report with
/// zero totals.
pub fn aggregate(
    configs: &[WorkloadConfig],
    catalog: &PricingCatalog,
) -> Result<Report, PricingError> {
    let span = tracing::debug_span!("aggregate", workloads = configs.len());
    let _guard = span.enter();

    let rows = configs
        .iter()
        .map(|config| {
            let cost = compute(config, catalog).inspect_err(|err| {
                tracing::debug!(workload = config.name(), error = %err, "pricing failed");
            })?;
            tracing::trace!(workload = config.name(), total = %cost.total_cost(), "priced");
            Ok(ReportRow {
                workload: config.clone(),
                cost,
            })
        })
        .collect::<Result<Vec<_>, PricingError>>()?;

    let report = Report::from_rows(rows)?;
    tracing::debug!(grand_total = %report.grand_total(), "report built");
    Ok(report)
}
