pub mod config;
pub mod driver;
pub mod job;
pub mod metrics;
pub mod validate;
pub mod workload;

pub use config::{MAX_PROCESSES, MIN_PROCESSES, Scenario, SimConfig};
pub use driver::{Sim, SimOutcome, simulate, simulate_with_events};
pub use job::{ProcessId, ProcessRecord, ProcessSpec};
pub use metrics::Summary;
