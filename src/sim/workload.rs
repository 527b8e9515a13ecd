use rand::prelude::*;

use super::{
    config::{MAX_PROCESSES, MIN_PROCESSES},
    job::ProcessSpec,
};

pub const MAX_PRIORITY: i64 = 5;

/// Seeded workload: each tick a process arrives with probability `p_arrival`,
/// and is short (`short_burst`) with probability `p_short`, else long. Stops
/// once `count` processes exist, clamped to the accepted process range.
///
/// Every process gets a priority in `1..=MAX_PRIORITY`, so the result is a
/// valid input for all four policies.
pub fn bernoulli_workload(
    seed: u64,
    count: usize,
    p_arrival: f64,
    p_short: f64,
    short_burst: i64,
    long_burst: i64,
) -> Vec<ProcessSpec> {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = count.clamp(MIN_PROCESSES, MAX_PROCESSES);
    // At least one arrival every 100 ticks on average
    let p_arrival = p_arrival.clamp(0.01, 1.0);
    let mut specs = Vec::with_capacity(count);

    let mut t = 0;
    while specs.len() < count {
        if rng.random::<f64>() < p_arrival {
            let burst = if rng.random::<f64>() < p_short {
                short_burst
            } else {
                long_burst
            };

            specs.push(
                ProcessSpec::new(specs.len() as u32, t, burst.max(1))
                    .with_priority(rng.random_range(1..=MAX_PRIORITY)),
            );
        }
        t += 1;
    }

    specs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{PolicyKind, TieBreak};
    use crate::sim::validate::validate;

    #[test]
    fn same_seed_same_workload() {
        let a = bernoulli_workload(7, 6, 0.3, 0.3, 2, 6);
        let b = bernoulli_workload(7, 6, 0.3, 0.3, 2, 6);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn generated_workloads_validate_for_every_policy() {
        for seed in 0..20 {
            let specs = bernoulli_workload(seed, 10, 0.5, 0.5, 1, 4);
            for policy in PolicyKind::ALL {
                assert!(validate(&specs, policy, Some(2), TieBreak::InputOrder).is_ok());
            }
        }
    }

    #[test]
    fn count_is_clamped_to_accepted_range() {
        assert_eq!(bernoulli_workload(1, 0, 1.0, 0.5, 1, 2).len(), MIN_PROCESSES);
        assert_eq!(bernoulli_workload(1, 50, 1.0, 0.5, 1, 2).len(), MAX_PROCESSES);
    }
}
