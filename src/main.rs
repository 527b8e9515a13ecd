mod logger;

use average::{Estimate, Mean};
use cpu_sched_model::{
    PolicyKind, ProcessSpec, Scenario, SimConfig, SimOutcome, simulate,
    sim::workload::bernoulli_workload,
};
use std::{env, error::Error, fs};

fn main() -> Result<(), Box<dyn Error>> {
    logger::init()?;

    // Optional scenario file; otherwise compare every policy on a random workload
    match env::args().nth(1) {
        Some(path) => {
            let scenario = Scenario::from_json(&fs::read_to_string(&path)?)?;
            let outcome = simulate(&scenario.config, &scenario.processes)?;
            report(&outcome);
        }
        None => {
            let specs = bernoulli_workload(0, 6, 0.3, 0.3, 2, 6);
            for policy in PolicyKind::ALL {
                report(&simulate(&demo_config(policy), &specs)?);
            }
            compare(&specs)?;
        }
    }

    Ok(())
}

fn demo_config(policy: PolicyKind) -> SimConfig {
    match policy {
        PolicyKind::RoundRobin => SimConfig::round_robin(3),
        other => SimConfig::new(other),
    }
}

fn report(outcome: &SimOutcome) {
    println!("== {}", outcome.policy.name());
    for entry in &outcome.trace {
        println!("  {} [{}, {})", entry.process, entry.start, entry.end);
    }
    for p in &outcome.processes {
        println!(
            "  {}: arrival={} burst={} completion={} turnaround={} waiting={}",
            p.id, p.arrival, p.burst, p.completion_time, p.turnaround_time, p.waiting_time
        );
    }
    let s = &outcome.summary;
    println!(
        "  total turnaround {} (avg {:.2}), total waiting {} (avg {:.2})",
        s.total_turnaround, s.average_turnaround, s.total_waiting, s.average_waiting
    );
}

// Longest and mean wait per policy over the same workload
fn compare(specs: &[ProcessSpec]) -> Result<(), Box<dyn Error>> {
    println!("== Comparison");
    for policy in PolicyKind::ALL {
        let outcome = simulate(&demo_config(policy), specs)?;
        let mean: Mean = outcome.processes.iter().map(|p| p.waiting_time as f64).collect();
        let longest = outcome.processes.iter().map(|p| p.waiting_time).max().unwrap_or(0);
        println!(
            "  {:<26} mean wait {:>6.2}  longest wait {:>4}  switches {}",
            policy.name(),
            mean.estimate(),
            longest,
            outcome.summary.context_switches
        );
    }
    Ok(())
}
