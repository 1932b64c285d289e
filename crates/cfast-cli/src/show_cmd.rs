//! `cfast show` command: summarize recorded attempts.

use std::path::Path;

use anyhow::Result;

use crate::sink::{StoredAttempt, read_attempts};

/// Run the show command.
pub fn run_show(path: &Path, events: bool) -> Result<()> {
    let attempts = read_attempts(path)?;
    if attempts.is_empty() {
        println!("No attempts recorded in {}.", path.display());
        return Ok(());
    }

    println!(
        "{:<36} {:<20} {:<28} {:>20} {:>9} {:>9} {:>9} {:>10}",
        "ATTEMPT", "RECORDED", "TEST", "SEED", "ATTEMPTED", "CORRECT", "ACCURACY", "MEDIAN RT"
    );
    println!("{}", "-".repeat(148));
    for attempt in &attempts {
        println!("{}", summary_row(attempt));
    }

    if events {
        for attempt in &attempts {
            println!();
            println!("Attempt {} ({})", attempt.attempt_id, attempt.record.test_code);
            if attempt.record.events.is_empty() {
                println!("  No scored events.");
                continue;
            }
            for e in &attempt.record.events {
                let mark = if e.is_correct { "ok" } else { "--" };
                let rt = e
                    .rt_ms
                    .map_or_else(|| "-".to_string(), |ms| format!("{ms}ms"));
                println!(
                    "  [{:>3}] {mark} {:<12} expected={:<10} response={:<10} score={:.2} rt={rt}",
                    e.seq, e.kind, e.expected, e.response, e.score
                );
            }
        }
    }

    println!();
    println!("{} attempt(s) in {}", attempts.len(), path.display());
    Ok(())
}

fn summary_row(attempt: &StoredAttempt) -> String {
    let r = &attempt.record;
    let median = r
        .median_rt_ms
        .map_or_else(|| "n/a".to_string(), |ms| format!("{ms:.0}ms"));
    format!(
        "{:<36} {:<20} {:<28} {:>20} {:>9} {:>9} {:>8.0}% {:>10}",
        attempt.attempt_id.to_string(),
        attempt.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        r.test_code,
        r.meta.seed,
        r.attempted,
        r.correct,
        r.accuracy * 100.0,
        median
    )
}
