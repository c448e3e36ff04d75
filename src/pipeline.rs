//! The orchestrator: sequences reconciliation, preference analysis, model building,
//! solving and post-processing, and collects diagnostics along the way.

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::error::MatchError;
use crate::groups::{self, NumberedGroups};
use crate::io::roster::RosterEntry;
use crate::model;
use crate::prefs::{self, PreferenceLoop};
use crate::reconcile;
use crate::solver::{self, SolveStatus};
use crate::{Group, SoftConflictWeights, Student};

/// Run configuration, fed from the command line
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Synthesize placeholder participants for roster students without a survey response
    pub include_missing: bool,
    /// Solver wall-clock budget
    pub time_budget: Duration,
    /// Soft conflict penalty weights
    pub weights: SoftConflictWeights,
    /// Solver random seed
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            include_missing: false,
            time_budget: Duration::from_secs(600),
            weights: SoftConflictWeights::default(),
            seed: 0,
        }
    }
}

/// Counts, timings and recoverable problems collected across the pipeline phases
#[derive(Debug)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub solver_status: SolveStatus,
    /// Preferred-partner edges whose endpoints share a group, mutual pairs included
    pub honored_preferences: usize,
    pub reconcile_time: Duration,
    pub analysis_time: Duration,
    pub solve_time: Duration,
}

/// Everything a run produces: the participant vector (owned here for the run's duration),
/// the numbered groups, the loop analysis, the missing-students list and the diagnostics.
#[derive(Debug)]
pub struct RunOutcome {
    pub students: Vec<Student>,
    pub groups: Vec<Group>,
    pub unassigned: Vec<usize>,
    pub loops: Vec<PreferenceLoop>,
    pub missing: Vec<RosterEntry>,
    pub diagnostics: Diagnostics,
}

/// Run the whole pipeline on parsed inputs
pub fn run(
    survey: Vec<Student>,
    roster: Vec<RosterEntry>,
    config: &RunConfig,
) -> Result<RunOutcome, MatchError> {
    config.weights.validate()?;
    let mut warnings = Vec::new();

    let phase_start = Instant::now();
    let reconciled = reconcile::reconcile(survey, &roster, config.include_missing);
    warnings.extend(reconciled.warnings);
    let students = reconciled.students;
    let missing = reconciled.missing;
    let reconcile_time = phase_start.elapsed();
    info!(
        "Reconciled survey and roster: {} participant(s), {} missing",
        students.len(),
        missing.len()
    );

    let phase_start = Instant::now();
    let (graph, graph_warnings) = prefs::build_graph(&students);
    warnings.extend(graph_warnings);
    let loops = graph.find_loops(&students);
    for preference_loop in &loops {
        if preference_loop.len() > model::MAX_GROUP_SIZE {
            let message = format!(
                "preference loop of {} students cannot be placed into a single group",
                preference_loop.len()
            );
            warn!("{}", message);
            warnings.push(message);
        }
    }
    let prepared = model::prepare(&students);
    let group_model = model::build(&students, &prepared, &graph, &loops, config.weights)?;
    let analysis_time = phase_start.elapsed();

    let phase_start = Instant::now();
    let solved = solver::solve(group_model, config.time_budget, config.seed)?;
    let solve_time = phase_start.elapsed();

    let NumberedGroups { groups, unassigned } =
        groups::number_groups(&students, &solved.assignment, solved.num_slots);

    let honored_preferences = graph
        .directed_edges()
        .iter()
        .filter(|&&(u, v)| solved.assignment[u].is_some() && solved.assignment[u] == solved.assignment[v])
        .count();

    info!(
        "Formed {} group(s), honored {} preference(s), status {:?}",
        groups.len(),
        honored_preferences,
        solved.status
    );

    Ok(RunOutcome {
        students,
        groups,
        unassigned,
        loops,
        missing,
        diagnostics: Diagnostics {
            warnings,
            solver_status: solved.status,
            honored_preferences,
            reconcile_time,
            analysis_time,
            solve_time,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report;
    use crate::MeetingMode;
    use std::collections::BTreeSet;

    fn student(name: &str, email: &str, partner: Option<&str>, times: &[&str]) -> Student {
        let availability: Option<BTreeSet<String>> = if times.is_empty() {
            None
        } else {
            Some(times.iter().map(|t| t.to_string()).collect())
        };
        Student {
            student_id: format!("id-{}", name),
            name: name.to_owned(),
            email: email.to_owned(),
            github: Some(format!("gh-{}", name)),
            ruby: 3,
            html_css: 3,
            js: 3,
            meeting: MeetingMode::NoPreference,
            availability,
            section: None,
            preferred_partner: partner.map(|p| p.to_owned()),
            is_placeholder: false,
        }
    }

    fn fixture() -> (Vec<Student>, Vec<RosterEntry>) {
        let survey = vec![
            student("Ada", "ada@x.edu", Some("ben@x.edu"), &["Mon"]),
            student("Ben", "ben@x.edu", Some("ada@x.edu"), &["Mon"]),
            student("Cid", "cid@x.edu", None, &["Mon", "Tue"]),
            student("Dot", "dot@x.edu", None, &["Tue"]),
            student("Eve", "eve@x.edu", None, &["Tue"]),
            student("Fay", "fay@x.edu", None, &["Mon"]),
            student("Gus", "gus@x.edu", None, &[]),
        ];
        let roster: Vec<RosterEntry> = survey
            .iter()
            .map(|s| RosterEntry {
                student_id: s.student_id.clone(),
                name: s.name.clone(),
                email: s.email.clone(),
            })
            .collect();
        (survey, roster)
    }

    #[test]
    fn identical_inputs_produce_identical_outputs() {
        let config = RunConfig {
            time_budget: Duration::from_secs(60),
            ..RunConfig::default()
        };

        let (survey, roster) = fixture();
        let first = run(survey, roster, &config).unwrap();
        let (survey, roster) = fixture();
        let second = run(survey, roster, &config).unwrap();

        assert_eq!(first.groups, second.groups);
        let first_report = report::team_report(
            &first.students,
            &first.groups,
            &first.unassigned,
            &first.loops,
            &first.diagnostics.warnings,
        );
        let second_report = report::team_report(
            &second.students,
            &second.groups,
            &second.unassigned,
            &second.loops,
            &second.diagnostics.warnings,
        );
        assert_eq!(first_report, second_report);
    }

    #[test]
    fn mutual_pair_counts_towards_honored_preferences() {
        let config = RunConfig {
            time_budget: Duration::from_secs(60),
            ..RunConfig::default()
        };
        let (survey, roster) = fixture();
        let outcome = run(survey, roster, &config).unwrap();
        assert!(outcome.unassigned.is_empty());
        assert_eq!(outcome.diagnostics.honored_preferences, 2);
        // Ada and Ben form a loop of length two.
        assert_eq!(outcome.loops.len(), 1);
        assert_eq!(outcome.loops[0].members.len(), 2);
    }

    #[test]
    fn placeholders_enter_the_run_only_when_requested() {
        let (mut survey, mut roster) = fixture();
        survey.truncate(6);
        roster.push(RosterEntry {
            student_id: String::from("id-Hal"),
            name: String::from("Hal"),
            email: String::from("hal@x.edu"),
        });

        let config = RunConfig {
            include_missing: true,
            time_budget: Duration::from_secs(60),
            ..RunConfig::default()
        };
        let outcome = run(survey, roster, &config).unwrap();
        assert_eq!(outcome.students.len(), 8);
        assert_eq!(outcome.missing.len(), 2);
        let placeholders: Vec<&Student> = outcome
            .students
            .iter()
            .filter(|s| s.is_placeholder)
            .collect();
        assert_eq!(placeholders.len(), 2);
        // Both placeholders are assigned like everyone else.
        assert!(outcome.unassigned.is_empty());
    }

    #[test]
    fn weight_ordering_violation_is_rejected() {
        let config = RunConfig {
            weights: SoftConflictWeights {
                avail: 1,
                meet: 4,
                section: 8,
            },
            ..RunConfig::default()
        };
        let (survey, roster) = fixture();
        match run(survey, roster, &config) {
            Err(MatchError::InvalidConfig(_)) => {}
            other => panic!("expected InvalidConfig, got {:?}", other.map(|_| ())),
        }
    }
}
