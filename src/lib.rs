//! Cost engine for data-platform workloads.
//!
//! Everything under [`crate::core`] is pure: a [`crate::core::pricing::PricingCatalog`] is
//! built once from validated input, [`crate::core::models::workload::WorkloadConfig`]
//! values are validated against it, and [`crate::core::pricing::compute`] /
//! [`crate::core::pricing::aggregate`] turn them into cost breakdowns and reports.

pub mod core;
