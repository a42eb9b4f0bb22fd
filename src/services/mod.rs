pub mod intel_bridge;
pub mod lead_search;
pub mod result_mapper;
pub mod schedule_runner;
pub mod token_store;
pub mod webhook_client;

pub use intel_bridge::*;
pub use lead_search::*;
pub use result_mapper::*;
pub use schedule_runner::*;
pub use token_store::*;
pub use webhook_client::*;
