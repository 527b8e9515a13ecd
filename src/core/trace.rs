//! Execution trace: the ordered `(process, start, end)` intervals a run
//! produced, with consecutive slices of one process coalesced.

use serde::{Deserialize, Serialize};

use super::state::Ticks;
use crate::sim::ProcessId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub process: ProcessId,
    pub start: Ticks,
    pub end: Ticks,
}

impl TraceEntry {
    pub fn duration(&self) -> Ticks {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceEntry> {
        self.entries.iter()
    }

    pub fn for_process(&self, process: ProcessId) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter().filter(move |e| e.process == process)
    }

    /// Total CPU time the trace attributes to `process`.
    pub fn time_for(&self, process: ProcessId) -> Ticks {
        self.for_process(process).map(TraceEntry::duration).sum()
    }

    pub fn last_end(&self) -> Ticks {
        self.entries.last().map_or(0, |e| e.end)
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceEntry;
    type IntoIter = std::slice::Iter<'a, TraceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds a [`Trace`] from executed slices.
///
/// Holds the open segment; a slice that continues it (same process, starting
/// where it ended) extends it, anything else closes it and opens a new one.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    closed: Vec<TraceEntry>,
    current: Option<TraceEntry>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, process: ProcessId, start: Ticks, end: Ticks) {
        debug_assert!(start < end, "empty slice [{start}, {end}) for {process}");
        if start >= end {
            return;
        }

        match &mut self.current {
            Some(segment) if segment.process == process && segment.end == start => {
                segment.end = end;
            }
            current => {
                debug_assert!(
                    current.is_none_or(|segment| segment.end <= start),
                    "slice [{start}, {end}) overlaps the open segment"
                );
                if let Some(segment) = current.replace(TraceEntry {
                    process,
                    start,
                    end,
                }) {
                    self.closed.push(segment);
                }
            }
        }
    }

    pub fn finish(mut self) -> Trace {
        self.closed.extend(self.current.take());
        Trace {
            entries: self.closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P0: ProcessId = ProcessId(0);
    const P1: ProcessId = ProcessId(1);

    #[test]
    fn contiguous_slices_of_one_process_merge() {
        let mut rec = TraceRecorder::new();
        rec.record(P0, 0, 1);
        rec.record(P0, 1, 2);
        rec.record(P0, 2, 4);
        let trace = rec.finish();

        assert_eq!(
            trace.entries(),
            &[TraceEntry {
                process: P0,
                start: 0,
                end: 4
            }]
        );
    }

    #[test]
    fn switch_and_gap_open_new_segments() {
        let mut rec = TraceRecorder::new();
        rec.record(P0, 0, 2);
        rec.record(P1, 2, 3);
        rec.record(P0, 3, 4);
        // Idle gap: same process but not contiguous
        rec.record(P0, 6, 7);
        let trace = rec.finish();

        let spans: Vec<_> = trace.iter().map(|e| (e.process, e.start, e.end)).collect();
        assert_eq!(spans, vec![(P0, 0, 2), (P1, 2, 3), (P0, 3, 4), (P0, 6, 7)]);
        assert_eq!(trace.time_for(P0), 4);
        assert_eq!(trace.last_end(), 7);
    }

    #[test]
    fn empty_recorder_yields_empty_trace() {
        let trace = TraceRecorder::new().finish();
        assert!(trace.is_empty());
        assert_eq!(trace.last_end(), 0);
    }
}
