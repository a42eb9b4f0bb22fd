pub mod client_business;
pub mod intel;
pub mod lead;
pub mod lead_business;
pub mod lead_search;
pub mod schedule;
pub mod swot;
