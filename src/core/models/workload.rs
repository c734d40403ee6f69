use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::core::pricing::catalog::PricingCatalog;

/// A workload description that cannot be priced as given.
///
/// Raised while turning a [`WorkloadInput`] into a [`WorkloadConfig`]; a
/// config that exists has already passed every one of these checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidConfig {
    #[error("hours_per_day must be greater than 0 and at most 24 (got {0})")]
    HoursPerDay(Decimal),
    #[error("days_per_month must be between 1 and 31 (got {0})")]
    DaysPerMonth(u32),
    #[error("unknown workload kind '{0}' (expected all-purpose, jobs or dlt-advanced)")]
    UnknownWorkloadKind(String),
    #[error("unknown warehouse size '{0}'")]
    UnknownWarehouseSize(String),
    #[error("{role} instance type must not be empty")]
    EmptyInstanceType { role: &'static str },
    #[error("{role} instance type '{instance_type}' is not listed in the catalog specs")]
    UnknownInstanceType {
        role: &'static str,
        instance_type: String,
    },
    #[error("serverless warehouse needs at least 1 cluster (got {0})")]
    ServerlessClusters(u32),
    #[error("workload name must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    AllPurpose,
    Jobs,
    DltAdvanced,
}

impl WorkloadKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "all-purpose" | "all_purpose" | "allpurpose" => Some(Self::AllPurpose),
            "jobs" | "job" => Some(Self::Jobs),
            "dlt-advanced" | "dlt_advanced" | "dltadvanced" | "dlt" => Some(Self::DltAdvanced),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::AllPurpose => "all-purpose",
            Self::Jobs => "jobs",
            Self::DltAdvanced => "dlt-advanced",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Rate schedule selector for cluster workloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelerationMode {
    Standard,
    Accelerated,
}

impl AccelerationMode {
    pub fn from_flag(accelerated: bool) -> Self {
        if accelerated {
            Self::Accelerated
        } else {
            Self::Standard
        }
    }
}

impl fmt::Display for AccelerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Accelerated => f.write_str("accelerated"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum WarehouseSize {
    #[serde(rename = "2X-Small")]
    XXSmall,
    #[serde(rename = "X-Small")]
    XSmall,
    #[serde(rename = "Small")]
    Small,
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "Large")]
    Large,
    #[serde(rename = "X-Large")]
    XLarge,
    #[serde(rename = "2X-Large")]
    XXLarge,
    #[serde(rename = "3X-Large")]
    XXXLarge,
    #[serde(rename = "4X-Large")]
    XXXXLarge,
}

impl WarehouseSize {
    pub fn all() -> &'static [WarehouseSize] {
        &[
            Self::XXSmall,
            Self::XSmall,
            Self::Small,
            Self::Medium,
            Self::Large,
            Self::XLarge,
            Self::XXLarge,
            Self::XXXLarge,
            Self::XXXXLarge,
        ]
    }

    /// Accepts the display form ("2X-Small") as well as snake/kebab case.
    pub fn from_id(id: &str) -> Option<Self> {
        let normalized = id.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "2x-small" | "xx-small" => Some(Self::XXSmall),
            "x-small" | "xsmall" => Some(Self::XSmall),
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "x-large" | "xlarge" => Some(Self::XLarge),
            "2x-large" | "xx-large" => Some(Self::XXLarge),
            "3x-large" => Some(Self::XXXLarge),
            "4x-large" => Some(Self::XXXXLarge),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::XXSmall => "2X-Small",
            Self::XSmall => "X-Small",
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
            Self::XLarge => "X-Large",
            Self::XXLarge => "2X-Large",
            Self::XXXLarge => "3X-Large",
            Self::XXXXLarge => "4X-Large",
        }
    }
}

impl fmt::Display for WarehouseSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// VM instance type identifier, e.g. `r5.large`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InstanceType(String);

impl InstanceType {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn into_inner(self) -> String {
        self.0
    }

    /// Family prefix before the first `.` (`r5.large` -> `r5`).
    pub fn family(&self) -> &str {
        instance_family(&self.0)
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn instance_family(instance_type: &str) -> &str {
    instance_type
        .split_once('.')
        .map(|(family, _)| family)
        .unwrap_or(instance_type)
}

/// Executor instance choice as the user expressed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorInstance {
    SameAsDriver,
    Explicit(InstanceType),
}

impl ExecutorInstance {
    pub const SAME_AS_DRIVER: &'static str = "same_as_driver";

    pub fn from_id(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            None | Some("") => Self::SameAsDriver,
            Some(s) if s.eq_ignore_ascii_case(Self::SAME_AS_DRIVER) => Self::SameAsDriver,
            Some(s) if s.eq_ignore_ascii_case("same-as-driver") => Self::SameAsDriver,
            Some(s) => Self::Explicit(InstanceType::new(s)),
        }
    }

    pub fn is_same_as_driver(&self) -> bool {
        matches!(self, Self::SameAsDriver)
    }
}

impl Serialize for ExecutorInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::SameAsDriver => serializer.serialize_str(Self::SAME_AS_DRIVER),
            Self::Explicit(instance) => serializer.serialize_str(instance.as_str()),
        }
    }
}

/// Recurring daily-hours x monthly-days usage pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageSchedule {
    hours_per_day: Decimal,
    days_per_month: u32,
}

impl UsageSchedule {
    pub const MAX_HOURS_PER_DAY: u32 = 24;
    pub const MAX_DAYS_PER_MONTH: u32 = 31;

    pub fn new(hours_per_day: Decimal, days_per_month: u32) -> Result<Self, InvalidConfig> {
        if hours_per_day <= Decimal::ZERO || hours_per_day > Decimal::from(Self::MAX_HOURS_PER_DAY)
        {
            return Err(InvalidConfig::HoursPerDay(hours_per_day));
        }
        if !(1..=Self::MAX_DAYS_PER_MONTH).contains(&days_per_month) {
            return Err(InvalidConfig::DaysPerMonth(days_per_month));
        }
        Ok(Self {
            hours_per_day,
            days_per_month,
        })
    }

    pub fn hours_per_day(&self) -> Decimal {
        self.hours_per_day
    }

    pub fn days_per_month(&self) -> u32 {
        self.days_per_month
    }

    pub fn monthly_hours(&self) -> Decimal {
        self.hours_per_day * Decimal::from(self.days_per_month)
    }
}

/// Driver plus zero or more executors, billed per node-hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterWorkload {
    name: String,
    kind: WorkloadKind,
    accelerated: bool,
    driver_instance: InstanceType,
    executor: ExecutorInstance,
    executor_instance: InstanceType,
    executor_nodes: u32,
    schedule: UsageSchedule,
}

impl ClusterWorkload {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> WorkloadKind {
        self.kind
    }

    pub fn accelerated(&self) -> bool {
        self.accelerated
    }

    pub fn acceleration_mode(&self) -> AccelerationMode {
        AccelerationMode::from_flag(self.accelerated)
    }

    pub fn driver_instance(&self) -> &InstanceType {
        &self.driver_instance
    }

    /// The executor choice as requested (may be [`ExecutorInstance::SameAsDriver`]).
    pub fn executor(&self) -> &ExecutorInstance {
        &self.executor
    }

    /// The executor instance type after resolving the same-as-driver choice.
    pub fn executor_instance(&self) -> &InstanceType {
        &self.executor_instance
    }

    pub fn executor_nodes(&self) -> u32 {
        self.executor_nodes
    }

    /// Executors plus the single driver. Widened so `u32::MAX` executors
    /// still count the driver.
    pub fn total_nodes(&self) -> u64 {
        u64::from(self.executor_nodes) + 1
    }

    pub fn schedule(&self) -> &UsageSchedule {
        &self.schedule
    }
}

/// Size-tier billed warehouse with no instance-hour component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerlessWarehouse {
    name: String,
    size: WarehouseSize,
    clusters: u32,
    schedule: UsageSchedule,
}

impl ServerlessWarehouse {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> WarehouseSize {
        self.size
    }

    pub fn clusters(&self) -> u32 {
        self.clusters
    }

    pub fn schedule(&self) -> &UsageSchedule {
        &self.schedule
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkloadConfig {
    Cluster(ClusterWorkload),
    Serverless(ServerlessWarehouse),
}

impl WorkloadConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Cluster(c) => c.name(),
            Self::Serverless(w) => w.name(),
        }
    }

    pub fn schedule(&self) -> &UsageSchedule {
        match self {
            Self::Cluster(c) => c.schedule(),
            Self::Serverless(w) => w.schedule(),
        }
    }

    /// Short label for the rate schedule in use, e.g. `jobs` or
    /// `all-purpose-accelerated`.
    pub fn kind_label(&self) -> String {
        match self {
            Self::Cluster(c) if c.accelerated() => format!("{}-accelerated", c.kind().id()),
            Self::Cluster(c) => c.kind().id().to_string(),
            Self::Serverless(_) => SERVERLESS_LABEL.to_string(),
        }
    }
}

const SERVERLESS_LABEL: &str = "serverless-warehouse";

fn default_clusters() -> u32 {
    1
}

/// Cluster workload as read from a workloads file, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterInput {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub accelerated: bool,
    pub driver: String,
    #[serde(default)]
    pub executor: Option<String>,
    pub executor_nodes: u32,
    pub hours_per_day: Decimal,
    pub days_per_month: u32,
}

/// Serverless warehouse as read from a workloads file, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerlessInput {
    #[serde(default)]
    pub name: Option<String>,
    pub size: String,
    #[serde(default = "default_clusters")]
    pub clusters: u32,
    pub hours_per_day: Decimal,
    pub days_per_month: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkloadInput {
    Cluster(ClusterInput),
    Serverless(ServerlessInput),
}

impl WorkloadInput {
    /// Validate against `catalog` and build the config. `index` is the
    /// 0-based position in the workload list and only feeds the default name.
    pub fn into_config(
        self,
        index: usize,
        catalog: &PricingCatalog,
    ) -> Result<WorkloadConfig, InvalidConfig> {
        match self {
            Self::Cluster(input) => input.into_workload(index, catalog).map(WorkloadConfig::Cluster),
            Self::Serverless(input) => input.into_workload(index).map(WorkloadConfig::Serverless),
        }
    }
}

impl ClusterInput {
    fn into_workload(
        self,
        index: usize,
        catalog: &PricingCatalog,
    ) -> Result<ClusterWorkload, InvalidConfig> {
        let kind = WorkloadKind::from_id(&self.kind)
            .ok_or_else(|| InvalidConfig::UnknownWorkloadKind(self.kind.clone()))?;
        let schedule = UsageSchedule::new(self.hours_per_day, self.days_per_month)?;

        let driver_instance = known_instance(&self.driver, "driver", catalog)?;
        let executor = ExecutorInstance::from_id(self.executor.as_deref());
        let executor_instance = match &executor {
            ExecutorInstance::SameAsDriver => driver_instance.clone(),
            ExecutorInstance::Explicit(instance) => {
                known_instance(instance.as_str(), "executor", catalog)?
            }
        };

        Ok(ClusterWorkload {
            name: resolve_name(self.name, || format!("{}-{}", kind.id(), index + 1))?,
            kind,
            accelerated: self.accelerated,
            driver_instance,
            executor,
            executor_instance,
            executor_nodes: self.executor_nodes,
            schedule,
        })
    }
}

impl ServerlessInput {
    fn into_workload(self, index: usize) -> Result<ServerlessWarehouse, InvalidConfig> {
        let size = WarehouseSize::from_id(&self.size)
            .ok_or_else(|| InvalidConfig::UnknownWarehouseSize(self.size.clone()))?;
        if self.clusters == 0 {
            return Err(InvalidConfig::ServerlessClusters(self.clusters));
        }
        let schedule = UsageSchedule::new(self.hours_per_day, self.days_per_month)?;

        Ok(ServerlessWarehouse {
            name: resolve_name(self.name, || format!("sql-warehouse-{}", index + 1))?,
            size,
            clusters: self.clusters,
            schedule,
        })
    }
}

fn known_instance(
    id: &str,
    role: &'static str,
    catalog: &PricingCatalog,
) -> Result<InstanceType, InvalidConfig> {
    let instance = InstanceType::new(id);
    if instance.as_str().is_empty() {
        return Err(InvalidConfig::EmptyInstanceType { role });
    }
    if !catalog.has_instance_spec(instance.as_str()) {
        return Err(InvalidConfig::UnknownInstanceType {
            role,
            instance_type: instance.into_inner(),
        });
    }
    Ok(instance)
}

fn resolve_name(
    name: Option<String>,
    default: impl FnOnce() -> String,
) -> Result<String, InvalidConfig> {
    match name {
        None => Ok(default()),
        Some(name) if name.trim().is_empty() => Err(InvalidConfig::EmptyName),
        Some(name) => Ok(name.trim().to_string()),
    }
}
