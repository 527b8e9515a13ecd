use super::{
    state::{ProcessState, SimCtx},
    trace::Trace,
};

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SimCtx) {
        self.step += 1;

        if let Some(idx) = ctx.running {
            debug_assert_eq!(
                ctx.process(idx).state,
                ProcessState::Running,
                "cpu.current process {idx} must be Running"
            );
        }

        let mut completed = 0;
        for process in &ctx.processes {
            debug_assert!(
                process.remaining <= process.burst,
                "Process {} remaining {} exceeds burst {}",
                process.id,
                process.remaining,
                process.burst
            );
            debug_assert_eq!(
                process.completion_time.is_some(),
                process.state == ProcessState::Completed,
                "Process {} completion time out of sync with state",
                process.id
            );
            if process.state == ProcessState::Completed {
                completed += 1;
            }
        }
        debug_assert_eq!(completed, ctx.completed_count(), "completed count drifted");

        for (&idx, &queue_id) in &ctx.queued {
            let process = ctx.process(idx);
            debug_assert_eq!(
                process.state,
                ProcessState::Ready,
                "Queued process {idx} must be Ready"
            );
            if let Some(queue) = ctx.queues.get(queue_id) {
                debug_assert!(
                    queue.contains(idx),
                    "queued claims process {idx} in {queue_id:?}, but queue does not contain it"
                );
            } else {
                debug_assert!(false, "queued references unknown queue {queue_id:?}");
            }
        }
    }

    /// End-of-run checks: single CPU, work conserved, completion matches the trace.
    pub fn observe_finish(&self, ctx: &SimCtx, trace: &Trace) {
        for pair in trace.entries().windows(2) {
            debug_assert!(
                pair[0].end <= pair[1].start,
                "trace intervals overlap: {:?} / {:?}",
                pair[0],
                pair[1]
            );
        }

        for process in &ctx.processes {
            debug_assert_eq!(
                trace.time_for(process.id),
                process.burst,
                "Process {} ran for a different time than its burst",
                process.id
            );
            debug_assert_eq!(
                trace.for_process(process.id).map(|e| e.end).max(),
                process.completion_time,
                "Process {} completion disagrees with its last interval",
                process.id
            );
        }
    }
}
