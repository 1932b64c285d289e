//! `cfast list` command: show the built-in test catalog.

use cfast_core::catalog::{self, CatalogEntry, TestKind};

/// Run the list command.
pub fn run_list() {
    let entries = catalog::builtin().list();
    if entries.is_empty() {
        println!("No tests available.");
        return;
    }

    println!(
        "{:<28} {:<32} {:<10} {:>10} {:>10}",
        "CODE", "TITLE", "KIND", "PRACTICE", "SCORED"
    );
    println!("{}", "-".repeat(94));
    for entry in entries {
        println!(
            "{:<28} {:<32} {:<10} {:>10} {:>10}",
            entry.code,
            entry.title,
            entry.kind.to_string(),
            practice_label(entry),
            format_duration(entry.scored_duration_s)
        );
    }
}

/// Practice is counted in questions for discrete tests and in seconds for
/// continuous ones.
fn practice_label(entry: &CatalogEntry) -> String {
    match entry.kind {
        TestKind::Discrete => format!("{} q", entry.practice_questions),
        TestKind::Continuous => format_duration(entry.practice_duration_s),
    }
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    let (mins, secs) = (total / 60, total % 60);
    if mins == 0 {
        format!("{secs}s")
    } else if secs == 0 {
        format!("{mins}m")
    } else {
        format!("{mins}m {secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_read_naturally() {
        assert_eq!(format_duration(45.0), "45s");
        assert_eq!(format_duration(120.0), "2m");
        assert_eq!(format_duration(780.0), "13m");
        assert_eq!(format_duration(90.4), "1m 30s");
    }

    #[test]
    fn practice_label_depends_on_kind() {
        let numerical = catalog::builtin().get("numerical_operations").unwrap();
        assert_eq!(practice_label(numerical), "5 q");
        let auditory = catalog::builtin().get("auditory_capacity").unwrap();
        assert_eq!(practice_label(auditory), "1m");
    }
}
