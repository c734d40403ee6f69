use colored::{control, Colorize};

use clustercost::core::formatter::{
    format_hours, format_money, format_rate, format_schedule, format_share,
};
use clustercost::core::models::cost::{Report, ReportRow};
use clustercost::core::models::workload::WorkloadConfig;
use clustercost::core::pricing::catalog::{CatalogSummary, InstanceListing};

/// Render a report as a colored (or plain) string.
///
/// Compact layout, one line per workload:
/// ```text
///  Monthly estimate (2 workloads)
///   nightly-etl   jobs                  160h       $157.44
///   bi            serverless-warehouse  220h       $880.00
///   Total                                          $1,037.44
/// ```
///
/// With `detailed`, each workload gets its own block with the consumption
/// and instance split, and the footer shows both subtotals.
pub fn render_report(report: &Report, detailed: bool, use_color: bool) -> String {
    control::set_override(use_color);

    if report.is_empty() {
        return format!(
            "{}\n  {}",
            " Monthly estimate".bold(),
            "No workloads to price.".dimmed()
        );
    }

    let mut lines: Vec<String> = Vec::new();
    let count = report.rows().len();
    lines.push(
        format!(
            " Monthly estimate ({} workload{})",
            count,
            if count == 1 { "" } else { "s" }
        )
        .bold()
        .to_string(),
    );

    let name_width = report
        .rows()
        .iter()
        .map(|r| r.cost.name().chars().count())
        .max()
        .unwrap_or(0)
        .max(5);

    if detailed {
        for row in report.rows() {
            render_row_detailed(&mut lines, row, report);
        }
        lines.push(String::new());
        lines.push(format!(
            "  {} {:>14}",
            format!("{:<16}", "Consumption").cyan(),
            format_money(report.total_consumption())
        ));
        lines.push(format!(
            "  {} {:>14}",
            format!("{:<16}", "Instances").cyan(),
            format_money(report.total_instance())
        ));
        lines.push(format!(
            "  {} {:>14}",
            format!("{:<16}", "Node-hours").cyan(),
            format_hours(report.total_node_hours())
        ));
    } else {
        for row in report.rows() {
            lines.push(format!(
                "  {:<name_width$}  {} {:>8}  {:>14}",
                row.cost.name(),
                format!("{:<24}", row.cost.kind()).cyan(),
                format!("{}h", format_hours(row.cost.monthly_hours())),
                format_money(row.cost.total_cost()),
            ));
        }
    }

    lines.push(
        format!(
            "  {:<16} {:>14}",
            "Total",
            format_money(report.grand_total())
        )
        .bold()
        .green()
        .to_string(),
    );

    lines.join("\n")
}

fn render_row_detailed(lines: &mut Vec<String>, row: &ReportRow, report: &Report) {
    let cost = &row.cost;
    lines.push(String::new());
    lines.push(format!(
        "  {} ({})",
        cost.name().bold(),
        cost.kind().cyan()
    ));
    lines.push(format!(
        "    {:<14} {}",
        "Schedule",
        format_schedule(row.workload.schedule())
    ));

    match &row.workload {
        WorkloadConfig::Cluster(cluster) => {
            let executor = if cluster.executor().is_same_as_driver() {
                format!("{} (same as driver)", cluster.executor_instance())
            } else {
                cluster.executor_instance().to_string()
            };
            lines.push(format!(
                "    {:<14} {} driver + {} x {}",
                "Nodes",
                cluster.driver_instance(),
                cluster.executor_nodes(),
                executor
            ));
            lines.push(format!(
                "    {:<14} {}",
                "Node-hours",
                format_hours(cost.node_hours())
            ));
            lines.push(format!(
                "    {:<14} {:>14}",
                "Consumption",
                format_money(cost.consumption_cost())
            ));
            lines.push(format!(
                "    {:<14} {:>14}   (driver {}, executors {})",
                "Instances",
                format_money(cost.instance_cost()),
                format_money(cost.driver_instance_cost()),
                format_money(cost.executor_instance_cost())
            ));
        }
        WorkloadConfig::Serverless(warehouse) => {
            lines.push(format!(
                "    {:<14} {} x {}",
                "Warehouse",
                warehouse.clusters(),
                warehouse.size()
            ));
            lines.push(format!(
                "    {:<14} {:>14}",
                "Consumption",
                format_money(cost.consumption_cost())
            ));
        }
    }

    lines.push(format!(
        "    {} {}   {} of total",
        format!("{:<14}", "Total").bold(),
        format!("{:>14}", format_money(cost.total_cost())).bold(),
        format_share(cost.total_cost(), report.grand_total())
    ));
}

/// Render catalog instance types as a table, in the order given.
pub fn render_instances(listings: &[InstanceListing<'_>], use_color: bool) -> String {
    control::set_override(use_color);

    if listings.is_empty() {
        return "  No instance types in catalog.".dimmed().to_string();
    }

    let width = listings
        .iter()
        .map(|l| l.instance_type.len())
        .max()
        .unwrap_or(0)
        .max(8);

    let mut lines = vec![format!(
        " {:<width$}  {:>6}  {:>10}  {:>12}",
        "Instance", "vCPU", "Memory", "Price"
    )
    .bold()
    .to_string()];

    for listing in listings {
        let (vcpu, memory) = match listing.spec {
            Some(spec) => (
                spec.vcpu.to_string(),
                format!("{} GiB", spec.memory_gib.normalize()),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        let price = match listing.hourly_rate {
            Some(rate) => format!("{:>12}", format_rate(rate)),
            None => format!("{:>12}", "unpriced").yellow().to_string(),
        };
        lines.push(format!(
            " {:<width$}  {:>6}  {:>10}  {}",
            listing.instance_type, vcpu, memory, price
        ));
    }

    lines.join("\n")
}

/// Render the entry counts of a validated catalog.
pub fn render_catalog_summary(path: &str, summary: &CatalogSummary, use_color: bool) -> String {
    control::set_override(use_color);

    let lines = [
        format!(" Catalog is valid: {}", path).green().to_string(),
        format!("  {} {}", format!("{:<18}", "Consumption rates").cyan(), summary.consumption_rates),
        format!("  {} {}", format!("{:<18}", "Instance prices").cyan(), summary.instance_prices),
        format!("  {} {}", format!("{:<18}", "Instance specs").cyan(), summary.instance_specs),
        format!("  {} {}", format!("{:<18}", "Serverless rates").cyan(), summary.serverless_rates),
    ];
    lines.join("\n")
}
