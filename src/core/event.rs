use crate::core::{ProcIdx, Ticks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Arrived {
        process: ProcIdx,
        at: Ticks,
    },
    // Ran `process` over [start, end)
    Dispatched {
        process: ProcIdx,
        start: Ticks,
        end: Ticks,
    },
    // Slice ended with work left; process went back to the ready set
    Preempted {
        process: ProcIdx,
        at: Ticks,
    },
    Completed {
        process: ProcIdx,
        at: Ticks,
    },
    // CPU idle even after select_and_advance(); clock jumped to the next arrival
    Idle {
        from: Ticks,
        until: Ticks,
    },
}
