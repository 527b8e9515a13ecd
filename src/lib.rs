pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use error::SimError;
pub use scheduler::{Policy, PolicyKind, TieBreak};
pub use sim::{
    ProcessId, ProcessRecord, ProcessSpec, Scenario, Sim, SimConfig, SimOutcome, Summary,
    simulate, simulate_with_events,
};
