use keyed_priority_queue::KeyedPriorityQueue;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use std::{cmp::Ordering, collections::VecDeque};

use crate::sim::ProcessId;

// Index into the process Vec; doubles as input order
pub type ProcIdx = usize;
pub type Ticks = u64;
new_key_type! {
    pub struct QueueId;
}

/// Ordering key for ranked ready queues. Smaller ranks run first.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub struct Rank {
    /// Policy-specific key: burst time for SJN, priority for the priority policies.
    pub key: u64,
    pub arrival: Ticks,
    /// Times the process was switched onto the CPU; zero unless the fairness
    /// tie-break is on.
    pub dispatches: u32,
    pub seq: ProcIdx,
}

impl Rank {
    fn as_tuple(&self) -> (u64, Ticks, u32, ProcIdx) {
        (self.key, self.arrival, self.dispatches, self.seq)
    }
}

// KeyedPriorityQueue is a max-heap, so flip the order to pop the smallest rank
impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        other.as_tuple().cmp(&self.as_tuple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Not arrived yet.
    Pending,
    Ready,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Process {
    pub idx: ProcIdx,
    pub id: ProcessId,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub priority: Option<u64>,
    pub state: ProcessState,
    pub remaining: Ticks,
    // Switches onto the CPU; back-to-back slices of one process count once
    pub dispatches: u32,
    pub first_dispatch: Option<Ticks>,
    pub completion_time: Option<Ticks>,
}

impl Process {
    pub fn new(
        idx: ProcIdx,
        id: ProcessId,
        arrival: Ticks,
        burst: Ticks,
        priority: Option<u64>,
    ) -> Self {
        Self {
            idx,
            id,
            arrival,
            burst,
            priority,
            state: ProcessState::Pending,
            remaining: burst,
            dispatches: 0,
            first_dispatch: None,
            completion_time: None,
        }
    }
}

#[derive(Debug)]
pub enum ReadyQueue {
    Fifo {
        procs: VecDeque<ProcIdx>,
    },
    Ranked {
        procs: KeyedPriorityQueue<ProcIdx, Rank>,
    },
}

impl ReadyQueue {
    pub fn new_fifo() -> Self {
        Self::Fifo {
            procs: VecDeque::new(),
        }
    }

    pub fn new_ranked() -> Self {
        Self::Ranked {
            procs: KeyedPriorityQueue::new(),
        }
    }

    pub fn contains(&self, idx: ProcIdx) -> bool {
        match self {
            Self::Fifo { procs } => procs.contains(&idx),
            Self::Ranked { procs } => procs.get_priority(&idx).is_some(),
        }
    }
}

/// Arena of processes plus the ready queues policies create over it.
#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub processes: Vec<Process>,
    pub queues: SlotMap<QueueId, ReadyQueue>,
    pub queued: FxHashMap<ProcIdx, QueueId>,
    pub running: Option<ProcIdx>,

    // Most recent holder of the CPU, kept across idle gaps
    last_run: Option<ProcIdx>,
    // Pending processes sorted by (arrival, input order)
    arrivals: Vec<ProcIdx>,
    arrival_cursor: usize,
    completed: usize,
    horizon: Ticks,
}

impl SimCtx {
    pub fn new(processes: Vec<Process>) -> Self {
        for (pos, process) in processes.iter().enumerate() {
            debug_assert_eq!(process.idx, pos, "ProcIdx must match Vec index");
        }

        let mut arrivals: Vec<ProcIdx> = (0..processes.len()).collect();
        arrivals.sort_by_key(|&idx| (processes[idx].arrival, idx));

        // No valid schedule can run past the last arrival plus all CPU demand
        let horizon = processes
            .iter()
            .map(|p| p.burst)
            .fold(processes.iter().map(|p| p.arrival).max().unwrap_or(0), Ticks::saturating_add);

        Self {
            now: 0,
            processes,
            queues: SlotMap::with_key(),
            queued: FxHashMap::default(),
            running: None,
            last_run: None,
            arrivals,
            arrival_cursor: 0,
            completed: 0,
            horizon,
        }
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn advance_to(&mut self, t: Ticks) {
        debug_assert!(t >= self.now, "clock must not run backwards ({} -> {t})", self.now);
        self.now = self.now.max(t);
    }

    pub fn horizon(&self) -> Ticks {
        self.horizon
    }

    pub fn create_queue_fifo(&mut self) -> QueueId {
        self.queues.insert(ReadyQueue::new_fifo())
    }

    pub fn create_queue_ranked(&mut self) -> QueueId {
        self.queues.insert(ReadyQueue::new_ranked())
    }

    fn queue_push(&mut self, queue_id: QueueId, idx: ProcIdx, rank: Option<Rank>) {
        assert!(
            !self.queued.contains_key(&idx),
            "Process {idx} already present in some ready queue"
        );

        let process = self.process(idx);
        debug_assert!(
            process.state == ProcessState::Ready,
            "Process {idx} must be Ready when enqueued, found {:?}",
            process.state
        );

        let queue = self.queues.get_mut(queue_id).expect("Unknown ready queue");
        match queue {
            ReadyQueue::Fifo { procs } => procs.push_back(idx),
            ReadyQueue::Ranked { procs } => {
                procs.push(
                    idx,
                    rank.expect("Attempted to push to a ranked queue with no rank"),
                );
            }
        };

        self.queued.insert(idx, queue_id);
    }

    pub fn queue_push_back(&mut self, queue_id: QueueId, idx: ProcIdx) {
        self.queue_push(queue_id, idx, None);
    }

    pub fn queue_push_ranked(&mut self, queue_id: QueueId, idx: ProcIdx, rank: Rank) {
        self.queue_push(queue_id, idx, Some(rank));
    }

    pub fn queue_pop(&mut self, queue_id: QueueId) -> Option<ProcIdx> {
        let queue = self.queues.get_mut(queue_id)?;
        let idx = match queue {
            ReadyQueue::Fifo { procs } => procs.pop_front(),
            ReadyQueue::Ranked { procs } => procs.pop().map(|(idx, _)| idx),
        }?;

        let removed = self.queued.remove(&idx);
        debug_assert!(removed.is_some(), "Process {idx} missing queue membership");

        Some(idx)
    }

    /// Next process `queue_pop` would return, left in place.
    pub fn queue_peek(&self, queue_id: QueueId) -> Option<ProcIdx> {
        match self.queues.get(queue_id)? {
            ReadyQueue::Fifo { procs } => procs.front().copied(),
            ReadyQueue::Ranked { procs } => procs.peek().map(|(&idx, _)| idx),
        }
    }

    /// Removes a specific process from a queue, wherever it sits.
    pub fn queue_remove(&mut self, queue_id: QueueId, idx: ProcIdx) -> bool {
        let Some(queue) = self.queues.get_mut(queue_id) else {
            return false;
        };
        let removed = match queue {
            ReadyQueue::Fifo { procs } => match procs.iter().position(|&p| p == idx) {
                Some(pos) => procs.remove(pos).is_some(),
                None => false,
            },
            ReadyQueue::Ranked { procs } => procs.remove(&idx).is_some(),
        };

        if removed {
            self.queued.remove(&idx);
        }
        removed
    }

    /// FIFO contents front to back; empty for ranked or unknown queues.
    pub fn fifo_iter(&self, queue_id: QueueId) -> impl Iterator<Item = ProcIdx> + '_ {
        let procs = match self.queues.get(queue_id) {
            Some(ReadyQueue::Fifo { procs }) => Some(procs),
            _ => None,
        };
        procs.into_iter().flat_map(|procs| procs.iter().copied())
    }

    pub fn process(&self, idx: ProcIdx) -> &Process {
        &self.processes[idx]
    }

    pub fn process_mut(&mut self, idx: ProcIdx) -> &mut Process {
        &mut self.processes[idx]
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed
    }

    pub fn all_completed(&self) -> bool {
        self.completed == self.processes.len()
    }

    /// Arrival time of the next process that has not been admitted yet.
    pub fn next_arrival(&self) -> Option<Ticks> {
        self.arrivals
            .get(self.arrival_cursor)
            .map(|&idx| self.processes[idx].arrival)
    }

    /// Marks every pending process with `arrival <= now` Ready and returns
    /// them in (arrival, input order).
    pub fn take_arrived(&mut self) -> Vec<ProcIdx> {
        let mut arrived = Vec::new();
        while let Some(&idx) = self.arrivals.get(self.arrival_cursor) {
            if self.processes[idx].arrival > self.now {
                break; // Sorted, so nothing further has arrived either
            }
            self.arrival_cursor += 1;
            self.mark_ready(idx);
            arrived.push(idx);
        }
        arrived
    }

    pub fn mark_ready(&mut self, idx: ProcIdx) {
        let process = self.process_mut(idx);
        debug_assert!(
            process.state != ProcessState::Completed,
            "Completed process {} cannot become ready",
            process.id
        );
        process.state = ProcessState::Ready;
    }

    // Return previous state
    pub fn set_running(&mut self, idx: ProcIdx) -> ProcessState {
        debug_assert!(
            !self.queued.contains_key(&idx),
            "Running process {idx} must not be enqueued"
        );
        debug_assert!(
            self.running.is_none(),
            "CPU already running process {:?}",
            self.running
        );

        self.running = Some(idx);
        let switched = self.last_run.replace(idx) != Some(idx);
        let now = self.now;
        let process = self.process_mut(idx);
        let prev_state = process.state;
        process.state = ProcessState::Running;
        if switched {
            process.dispatches += 1;
        }
        process.first_dispatch.get_or_insert(now);
        prev_state
    }

    pub fn clear_running(&mut self) {
        self.running = None;
    }

    pub fn mark_completed(&mut self, idx: ProcIdx, completion_time: Ticks) {
        debug_assert!(
            !self.queued.contains_key(&idx),
            "Completing process {idx} that is still enqueued"
        );

        let process = &mut self.processes[idx];
        debug_assert!(
            process.state == ProcessState::Running,
            "Process {} must have been running before marked complete",
            process.id
        );
        debug_assert!(
            process.completion_time.is_none(),
            "Process {} completed twice",
            process.id
        );

        process.state = ProcessState::Completed;
        process.remaining = 0;
        process.completion_time = Some(completion_time);
        self.completed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(specs: &[(Ticks, Ticks)]) -> SimCtx {
        let processes = specs
            .iter()
            .enumerate()
            .map(|(idx, &(arrival, burst))| {
                Process::new(idx, ProcessId(idx as u32), arrival, burst, None)
            })
            .collect();
        SimCtx::new(processes)
    }

    #[test]
    fn arrivals_admitted_in_arrival_then_input_order() {
        let mut ctx = ctx(&[(3, 1), (0, 1), (3, 1), (1, 1)]);
        assert_eq!(ctx.next_arrival(), Some(0));
        assert_eq!(ctx.take_arrived(), vec![1]);

        ctx.advance_to(3);
        assert_eq!(ctx.take_arrived(), vec![3, 0, 2]);
        assert_eq!(ctx.next_arrival(), None);
        assert!(ctx.processes.iter().all(|p| p.state == ProcessState::Ready));
    }

    #[test]
    fn ranked_queue_pops_smallest_rank_first() {
        let mut ctx = ctx(&[(0, 5), (0, 2), (0, 2)]);
        let queue = ctx.create_queue_ranked();
        for idx in ctx.take_arrived() {
            let p = ctx.process(idx);
            let rank = Rank {
                key: p.burst,
                arrival: p.arrival,
                dispatches: 0,
                seq: idx,
            };
            ctx.queue_push_ranked(queue, idx, rank);
        }

        assert_eq!(ctx.queue_pop(queue), Some(1));
        assert_eq!(ctx.queue_pop(queue), Some(2));
        assert_eq!(ctx.queue_pop(queue), Some(0));
        assert_eq!(ctx.queue_pop(queue), None);
        assert!(ctx.queued.is_empty());
    }

    #[test]
    fn queue_remove_clears_membership() {
        let mut ctx = ctx(&[(0, 1), (0, 1), (0, 1)]);
        let queue = ctx.create_queue_fifo();
        for idx in ctx.take_arrived() {
            ctx.queue_push_back(queue, idx);
        }

        assert!(ctx.queue_remove(queue, 1));
        assert!(!ctx.queue_remove(queue, 1));
        assert_eq!(ctx.fifo_iter(queue).collect::<Vec<_>>(), vec![0, 2]);
        assert!(!ctx.queued.contains_key(&1));
    }

    #[test]
    fn horizon_covers_last_arrival_plus_total_burst() {
        let ctx = ctx(&[(0, 4), (10, 2), (2, 3)]);
        assert_eq!(ctx.horizon(), 19);
    }

    fn run_once(ctx: &mut SimCtx, idx: ProcIdx) {
        ctx.set_running(idx);
        ctx.clear_running();
        ctx.mark_ready(idx);
    }

    #[test]
    fn set_running_records_first_dispatch_once() {
        let mut ctx = ctx(&[(0, 4), (0, 2), (0, 1)]);
        ctx.take_arrived();
        ctx.advance_to(2);
        run_once(&mut ctx, 0);
        ctx.advance_to(5);
        ctx.set_running(0);

        assert_eq!(ctx.process(0).first_dispatch, Some(2));
    }

    #[test]
    fn dispatches_count_switches_not_slices() {
        let mut ctx = ctx(&[(0, 4), (0, 2), (0, 1)]);
        ctx.take_arrived();
        run_once(&mut ctx, 0);
        run_once(&mut ctx, 0);
        run_once(&mut ctx, 0);
        assert_eq!(ctx.process(0).dispatches, 1);

        run_once(&mut ctx, 1);
        run_once(&mut ctx, 0);
        assert_eq!(ctx.process(0).dispatches, 2);
        assert_eq!(ctx.process(1).dispatches, 1);
    }

    #[test]
    fn horizon_saturates_instead_of_wrapping() {
        let ctx = ctx(&[(5, Ticks::MAX), (0, Ticks::MAX), (0, 1)]);
        assert_eq!(ctx.horizon(), Ticks::MAX);
    }
}
