//! The plain-text reports: run summary and missing-students listing.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::io::roster::RosterEntry;
use crate::prefs::PreferenceLoop;
use crate::{Group, Student};

/// Format the run summary: aggregate counts, unassigned participants, detected preference
/// loops and the accumulated warnings.
///
/// The output format will look like
/// ```text
/// Total students processed: 7
/// Number of groups formed: 2
/// Groups with 3 students: 1
/// Groups with 4 students: 1
/// Students in preference loops: 3
/// Unassigned students:
/// Detected 1 preference loop(s) involving 3 students:
/// Loop 1: Ada -> Ben -> Cid -> Ada
/// ```
pub fn team_report(
    students: &[Student],
    groups: &[Group],
    unassigned: &[usize],
    loops: &[PreferenceLoop],
    warnings: &[String],
) -> String {
    let groups_of_3 = groups.iter().filter(|g| g.members.len() == 3).count();
    let groups_of_4 = groups.iter().filter(|g| g.members.len() == 4).count();
    let looped_students: BTreeSet<usize> = loops
        .iter()
        .flat_map(|l| l.members.iter().copied())
        .collect();

    let mut result = String::new();
    let _ = writeln!(result, "Total students processed: {}", students.len());
    let _ = writeln!(result, "Number of groups formed: {}", groups.len());
    let _ = writeln!(result, "Groups with 3 students: {}", groups_of_3);
    let _ = writeln!(result, "Groups with 4 students: {}", groups_of_4);
    let _ = writeln!(
        result,
        "Students in preference loops: {}",
        looped_students.len()
    );

    let _ = writeln!(result, "Unassigned students:");
    for &s in unassigned {
        let _ = writeln!(result, "- {} ({})", students[s].name, students[s].email);
    }

    if loops.is_empty() {
        let _ = writeln!(result, "No preference loops detected.");
    } else {
        let _ = writeln!(
            result,
            "Detected {} preference loop(s) involving {} students:",
            loops.len(),
            looped_students.len()
        );
        for (index, preference_loop) in loops.iter().enumerate() {
            let names: Vec<&str> = preference_loop
                .members
                .iter()
                .map(|&m| students[m].name.as_str())
                .collect();
            let _ = writeln!(
                result,
                "Loop {}: {} -> {}",
                index + 1,
                names.join(" -> "),
                names[0]
            );
        }
    }

    if !warnings.is_empty() {
        let _ = writeln!(result);
        let _ = writeln!(result, "Warnings:");
        for warning in warnings {
            let _ = writeln!(result, "- {}", warning);
        }
    }

    result
}

/// Format the listing of roster students without a survey response
pub fn missing_students_report(missing: &[RosterEntry]) -> String {
    let mut result = String::new();
    let _ = writeln!(
        result,
        "{} roster student(s) did not submit the survey:",
        missing.len()
    );
    for entry in missing {
        let _ = writeln!(result, "- {} ({})", entry.name, entry.email);
    }
    result
}
