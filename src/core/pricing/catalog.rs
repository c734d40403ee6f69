use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::models::workload::{
    instance_family, AccelerationMode, InstanceType, WarehouseSize, WorkloadKind,
};

/// Malformed catalog input, rejected before a [`PricingCatalog`] exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("{section}: duplicate entry for {key}")]
    DuplicateEntry { section: &'static str, key: String },
    #[error("{section}: rate for {key} must be positive (got {rate})")]
    NonPositiveRate {
        section: &'static str,
        key: String,
        rate: Decimal,
    },
    #[error("consumption_rates: unknown workload kind '{0}'")]
    UnknownWorkloadKind(String),
    #[error("serverless_rates: unknown warehouse size '{0}'")]
    UnknownWarehouseSize(String),
    #[error("{section}: instance type must not be empty")]
    EmptyInstanceType { section: &'static str },
    #[error("instance_specs: {instance_type} has invalid {field} ({value})")]
    InvalidSpec {
        instance_type: String,
        field: &'static str,
        value: String,
    },
}

/// A rate or price the calculation needs is absent from the catalog.
///
/// Never defaulted: a silent zero would undercount the estimate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("pricing data missing: no consumption rate for {kind} ({mode})")]
    MissingConsumptionRate {
        kind: WorkloadKind,
        mode: AccelerationMode,
    },
    #[error("pricing data missing: no hourly price for instance type '{0}'")]
    MissingInstancePrice(String),
    #[error("pricing data missing: no serverless rate for warehouse size {0}")]
    MissingServerlessRate(WarehouseSize),
    #[error("cost of workload '{workload}' exceeds the representable range")]
    Overflow { workload: String },
}

impl PricingError {
    pub(crate) fn overflow(workload: &str) -> Self {
        Self::Overflow {
            workload: workload.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionRateInput {
    pub workload_kind: String,
    #[serde(default)]
    pub accelerated: bool,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstancePriceInput {
    pub instance_type: String,
    pub hourly_rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSpecInput {
    pub instance_type: String,
    pub vcpu: u32,
    pub memory_gib: Decimal,
    #[serde(default)]
    pub family: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerlessRateInput {
    pub size: String,
    pub rate_per_hour: Decimal,
}

/// Catalog as supplied by a file or another collaborator, not yet validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingCatalogInput {
    #[serde(default)]
    pub consumption_rates: Vec<ConsumptionRateInput>,
    #[serde(default)]
    pub instance_prices: Vec<InstancePriceInput>,
    #[serde(default)]
    pub instance_specs: Vec<InstanceSpecInput>,
    #[serde(default)]
    pub serverless_rates: Vec<ServerlessRateInput>,
}

/// Hardware description of an instance type. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSpec {
    pub vcpu: u32,
    pub memory_gib: Decimal,
    pub family: String,
}

/// One instance type as listed by [`PricingCatalog::instances`].
#[derive(Debug, Clone, Serialize)]
pub struct InstanceListing<'a> {
    pub instance_type: &'a str,
    pub hourly_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<&'a InstanceSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub consumption_rates: usize,
    pub instance_prices: usize,
    pub instance_specs: usize,
    pub serverless_rates: usize,
}

/// Immutable pricing snapshot. Built once by [`PricingCatalog::from_input`];
/// nothing mutates it afterwards, so one instance can be shared freely
/// across threads.
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    consumption_rates: HashMap<(WorkloadKind, AccelerationMode), Decimal>,
    instance_prices: HashMap<String, Decimal>,
    instance_specs: HashMap<String, InstanceSpec>,
    serverless_rates: HashMap<WarehouseSize, Decimal>,
}

impl PricingCatalog {
    pub fn from_input(input: PricingCatalogInput) -> Result<Self, CatalogError> {
        let mut consumption_rates = HashMap::new();
        for entry in input.consumption_rates {
            let kind = WorkloadKind::from_id(&entry.workload_kind)
                .ok_or_else(|| CatalogError::UnknownWorkloadKind(entry.workload_kind.clone()))?;
            let mode = AccelerationMode::from_flag(entry.accelerated);
            let key = format!("{} ({})", kind, mode);
            ensure_positive("consumption_rates", &key, entry.rate)?;
            if consumption_rates.insert((kind, mode), entry.rate).is_some() {
                return Err(duplicate("consumption_rates", key));
            }
        }

        let mut instance_prices = HashMap::new();
        for entry in input.instance_prices {
            let instance = instance_key("instance_prices", &entry.instance_type)?;
            ensure_positive("instance_prices", &instance, entry.hourly_rate)?;
            if instance_prices.contains_key(&instance) {
                return Err(duplicate("instance_prices", instance));
            }
            instance_prices.insert(instance, entry.hourly_rate);
        }

        let mut instance_specs = HashMap::new();
        for entry in input.instance_specs {
            let instance = instance_key("instance_specs", &entry.instance_type)?;
            if entry.vcpu == 0 {
                return Err(invalid_spec(&instance, "vcpu", entry.vcpu.to_string()));
            }
            if entry.memory_gib <= Decimal::ZERO {
                return Err(invalid_spec(&instance, "memory_gib", entry.memory_gib.to_string()));
            }
            if instance_specs.contains_key(&instance) {
                return Err(duplicate("instance_specs", instance));
            }
            let family = entry
                .family
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| instance_family(&instance).to_string());
            instance_specs.insert(
                instance,
                InstanceSpec {
                    vcpu: entry.vcpu,
                    memory_gib: entry.memory_gib,
                    family,
                },
            );
        }

        let mut serverless_rates = HashMap::new();
        for entry in input.serverless_rates {
            let size = WarehouseSize::from_id(&entry.size)
                .ok_or_else(|| CatalogError::UnknownWarehouseSize(entry.size.clone()))?;
            ensure_positive("serverless_rates", size.id(), entry.rate_per_hour)?;
            if serverless_rates.insert(size, entry.rate_per_hour).is_some() {
                return Err(duplicate("serverless_rates", size.id().to_string()));
            }
        }

        let catalog = Self {
            consumption_rates,
            instance_prices,
            instance_specs,
            serverless_rates,
        };
        catalog.warn_on_coverage_gaps();

        let summary = catalog.summary();
        tracing::debug!(
            consumption_rates = summary.consumption_rates,
            instance_prices = summary.instance_prices,
            instance_specs = summary.instance_specs,
            serverless_rates = summary.serverless_rates,
            "pricing catalog loaded"
        );
        Ok(catalog)
    }

    pub fn consumption_rate(
        &self,
        kind: WorkloadKind,
        mode: AccelerationMode,
    ) -> Result<Decimal, PricingError> {
        self.consumption_rates
            .get(&(kind, mode))
            .copied()
            .ok_or(PricingError::MissingConsumptionRate { kind, mode })
    }

    pub fn instance_price(&self, instance: &InstanceType) -> Result<Decimal, PricingError> {
        self.instance_prices
            .get(instance.as_str())
            .copied()
            .ok_or_else(|| PricingError::MissingInstancePrice(instance.to_string()))
    }

    pub fn serverless_rate(&self, size: WarehouseSize) -> Result<Decimal, PricingError> {
        self.serverless_rates
            .get(&size)
            .copied()
            .ok_or(PricingError::MissingServerlessRate(size))
    }

    pub fn instance_spec(&self, instance_type: &str) -> Option<&InstanceSpec> {
        self.instance_specs.get(instance_type)
    }

    pub fn has_instance_spec(&self, instance_type: &str) -> bool {
        self.instance_specs.contains_key(instance_type)
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            consumption_rates: self.consumption_rates.len(),
            instance_prices: self.instance_prices.len(),
            instance_specs: self.instance_specs.len(),
            serverless_rates: self.serverless_rates.len(),
        }
    }

    /// Every instance type with a price or a spec, in natural order.
    pub fn instances(&self) -> Vec<InstanceListing<'_>> {
        let names: BTreeSet<&str> = self
            .instance_prices
            .keys()
            .chain(self.instance_specs.keys())
            .map(String::as_str)
            .collect();
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_by_key(|name| instance_sort_key(name));

        names
            .into_iter()
            .map(|name| InstanceListing {
                instance_type: name,
                hourly_rate: self.instance_prices.get(name).copied(),
                spec: self.instance_specs.get(name),
            })
            .collect()
    }

    fn warn_on_coverage_gaps(&self) {
        for name in self.instance_specs.keys() {
            if !self.instance_prices.contains_key(name) {
                tracing::warn!(instance_type = %name, "instance has specs but no hourly price");
            }
        }
        for name in self.instance_prices.keys() {
            if !self.instance_specs.contains_key(name) {
                tracing::warn!(instance_type = %name, "instance has a price but no specs");
            }
        }
    }
}

fn ensure_positive(section: &'static str, key: &str, rate: Decimal) -> Result<(), CatalogError> {
    if rate <= Decimal::ZERO {
        return Err(CatalogError::NonPositiveRate {
            section,
            key: key.to_string(),
            rate,
        });
    }
    Ok(())
}

fn instance_key(section: &'static str, raw: &str) -> Result<String, CatalogError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CatalogError::EmptyInstanceType { section });
    }
    Ok(name.to_string())
}

fn duplicate(section: &'static str, key: String) -> CatalogError {
    CatalogError::DuplicateEntry { section, key }
}

fn invalid_spec(instance_type: &str, field: &'static str, value: String) -> CatalogError {
    CatalogError::InvalidSpec {
        instance_type: instance_type.to_string(),
        field,
        value,
    }
}

/// Sort key ordering instance types by family, then by size:
/// nano < micro < small < medium < large < xlarge < 2xlarge < ... < metal.
///
/// Examples:
///   "r5.large"   -> ("r5", 5, "large")
///   "r5.12xlarge" -> ("r5", 22, "12xlarge")
pub fn instance_sort_key(instance_type: &str) -> (String, u32, String) {
    let Some((family, size)) = instance_type.split_once('.') else {
        return (instance_type.to_string(), 0, String::new());
    };

    let digits_end = size
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(size.len());
    let (count, suffix) = size.split_at(digits_end);

    let rank = match (count.parse::<u32>().ok(), suffix) {
        (None, "nano") => 1,
        (None, "micro") => 2,
        (None, "small") => 3,
        (None, "medium") => 4,
        (None, "large") => 5,
        (None, "xlarge") => 11,
        (Some(n), "xlarge") => 10 + n,
        (None, "metal") => 10_000,
        _ => 9_999,
    };

    (family.to_string(), rank, size.to_string())
}
