pub mod driver;
pub mod event;
pub mod observer;
pub mod state;
pub mod trace;

pub use driver::SimCore;
pub use event::SimEvent;
pub use state::{ProcIdx, Process, ProcessState, QueueId, Rank, ReadyQueue, SimCtx, Ticks};
pub use trace::{Trace, TraceEntry, TraceRecorder};
