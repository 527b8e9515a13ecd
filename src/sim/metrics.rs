//! Per-process and aggregate metrics, derived from the finished process set
//! and its trace.
//!
//! Completion is read back from the trace (last interval end), so the same
//! code serves policies that leave one interval per process and those that
//! fragment execution. Averages are not rounded.

use average::{Estimate, Mean};
use serde::{Deserialize, Serialize};

use super::job::ProcessRecord;
use crate::core::{Process, Ticks, Trace, TraceEntry};

/// Aggregate figures over one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_turnaround: Ticks,
    pub average_turnaround: f64,
    pub total_waiting: Ticks,
    pub average_waiting: f64,
    pub average_response: f64,
    /// End of the last trace interval.
    pub makespan: Ticks,
    pub busy_time: Ticks,
    /// Time in `[0, makespan)` with no process on the CPU.
    pub idle_time: Ticks,
    /// Adjacent trace intervals that belong to different processes.
    pub context_switches: usize,
}

/// Per-process record for `process`. Completion is read off `trace`,
/// response off the first dispatch the driver recorded.
pub fn process_record(process: &Process, trace: &Trace) -> ProcessRecord {
    let completion_time = trace
        .for_process(process.id)
        .map(|entry| entry.end)
        .max()
        .unwrap_or(0);

    let turnaround_time = completion_time.saturating_sub(process.arrival);
    debug_assert!(
        turnaround_time >= process.burst,
        "Process {} finished before it could have run its burst",
        process.id
    );
    let waiting_time = turnaround_time.saturating_sub(process.burst);
    let response_time = process
        .first_dispatch
        .map_or(0, |t| t.saturating_sub(process.arrival));

    ProcessRecord {
        id: process.id,
        arrival: process.arrival,
        burst: process.burst,
        priority: process.priority,
        completion_time,
        turnaround_time,
        waiting_time,
        response_time,
    }
}

fn total(values: impl Iterator<Item = Ticks>) -> Ticks {
    values.fold(0, Ticks::saturating_add)
}

fn mean(values: impl Iterator<Item = Ticks>) -> f64 {
    values.map(|v| v as f64).collect::<Mean>().estimate()
}

pub fn summarize(records: &[ProcessRecord], trace: &Trace) -> Summary {
    let makespan = trace.last_end();
    let busy_time = total(trace.iter().map(TraceEntry::duration));
    let context_switches = trace
        .entries()
        .windows(2)
        .filter(|pair| pair[0].process != pair[1].process)
        .count();

    Summary {
        total_turnaround: total(records.iter().map(|r| r.turnaround_time)),
        average_turnaround: mean(records.iter().map(|r| r.turnaround_time)),
        total_waiting: total(records.iter().map(|r| r.waiting_time)),
        average_waiting: mean(records.iter().map(|r| r.waiting_time)),
        average_response: mean(records.iter().map(|r| r.response_time)),
        makespan,
        busy_time,
        idle_time: makespan.saturating_sub(busy_time),
        context_switches,
    }
}

/// Records for every process (input order) plus the run summary.
pub fn compute(processes: &[Process], trace: &Trace) -> (Vec<ProcessRecord>, Summary) {
    let records: Vec<ProcessRecord> = processes
        .iter()
        .map(|process| process_record(process, trace))
        .collect();
    let summary = summarize(&records, trace);
    (records, summary)
}
