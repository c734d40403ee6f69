pub mod cost;
pub mod workload;
