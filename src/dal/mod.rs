pub mod client_business_db;
pub mod intel_db;
pub mod lead_db;
pub mod lead_search_db;
pub mod schedule_db;
pub mod store;
pub mod swot_db;

#[cfg(test)]
pub mod memory_store;

pub use store::*;
