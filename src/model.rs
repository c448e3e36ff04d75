//! The mixed-integer model of the group assignment problem.
//!
//! The module provides the precomputation of the pairwise conflict structure, the decision
//! variables and the constraint/objective assembly. All the data conversion from `Student`
//! objects to matrices and linear expressions for the solver happens here; actually running
//! the solver is the `solver` module's job.
//!
//! Formulation outline: binary variables x[s][g] place participant s into group slot g, with
//! `used`/`four` indicators per slot. Hard constraints cover exactly-one membership, the 3..4
//! size window, the four-indicator linking, the skill floor, placeholder dispersion and
//! mutual-pair co-location. Soft terms (conflict literals per conflicting pair and slot,
//! preference indicators per non-mutual edge, loop co-location indicators, and the skill
//! spread) are combined into a single maximization objective with separating weights, so one
//! solve realizes the whole lexicographic priority order.

pub mod weights;


use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables, Variable};
use itertools::Itertools;
use log::{debug, info};
use ndarray::{Array1, Array2};

use crate::error::MatchError;
use crate::prefs::{PreferenceGraph, PreferenceLoop};
use crate::{MeetingMode, SoftConflictWeights, Student};

/// Minimum allowed group size
pub const MIN_GROUP_SIZE: usize = 3;
/// Maximum allowed group size
pub const MAX_GROUP_SIZE: usize = 4;
/// Hard lower bound on a group's total skill, per member
pub const SKILL_FLOOR_PER_MEMBER: i32 = 5;

/// Number of group slots the model allocates for `n` participants
pub fn max_group_slots(n: usize) -> usize {
    n / MIN_GROUP_SIZE
}

/// Precomputed problem structure that only depends on the participants, not on the
/// variables: pairwise conflict matrices, per-participant skill totals and the placeholder
/// mask. Computed once and shared by the model builder and its tests.
pub struct PreparedProblem {
    /// Per-participant sum of the three skill ratings
    pub skill_totals: Array1<i32>,
    /// Marks the synthesized placeholder participants
    pub placeholders: Array1<bool>,
    /// `[i, j]` is true iff i and j have known, non-empty, disjoint availability
    pub avail_conflicts: Array2<bool>,
    /// `[i, j]` is true iff one of i, j insists on in-person and the other on remote
    pub meeting_conflicts: Array2<bool>,
    /// `[i, j]` is true iff both sections are known and differ
    pub section_conflicts: Array2<bool>,
}

impl PreparedProblem {
    /// Number of conflicting pairs per conflict type (availability, meeting, section)
    pub fn conflict_pair_counts(&self) -> (usize, usize, usize) {
        let count = |m: &Array2<bool>| {
            let n = m.dim().0;
            (0..n)
                .tuple_combinations()
                .filter(|&(i, j): &(usize, usize)| m[[i, j]])
                .count()
        };
        (
            count(&self.avail_conflicts),
            count(&self.meeting_conflicts),
            count(&self.section_conflicts),
        )
    }
}

fn availability_conflict(a: &Student, b: &Student) -> bool {
    match (&a.availability, &b.availability) {
        (Some(x), Some(y)) if !x.is_empty() && !y.is_empty() => x.is_disjoint(y),
        _ => false,
    }
}

fn meeting_conflict(a: &Student, b: &Student) -> bool {
    matches!(
        (a.meeting, b.meeting),
        (MeetingMode::InPerson, MeetingMode::Remote)
            | (MeetingMode::Remote, MeetingMode::InPerson)
    )
}

fn section_conflict(a: &Student, b: &Student) -> bool {
    match (&a.section, &b.section) {
        (Some(x), Some(y)) => x != y,
        _ => false,
    }
}

/// Generate the precomputed problem structure from the participant list
pub fn prepare(students: &[Student]) -> PreparedProblem {
    let n = students.len();

    let skill_totals = Array1::from_iter(students.iter().map(|s| s.skill_total()));
    let placeholders = Array1::from_iter(students.iter().map(|s| s.is_placeholder));

    let mut avail_conflicts = Array2::from_elem((n, n), false);
    let mut meeting_conflicts = Array2::from_elem((n, n), false);
    let mut section_conflicts = Array2::from_elem((n, n), false);
    for (i, j) in (0..n).tuple_combinations() {
        if availability_conflict(&students[i], &students[j]) {
            avail_conflicts[[i, j]] = true;
            avail_conflicts[[j, i]] = true;
        }
        if meeting_conflict(&students[i], &students[j]) {
            meeting_conflicts[[i, j]] = true;
            meeting_conflicts[[j, i]] = true;
        }
        if section_conflict(&students[i], &students[j]) {
            section_conflicts[[i, j]] = true;
            section_conflicts[[j, i]] = true;
        }
    }

    PreparedProblem {
        skill_totals,
        placeholders,
        avail_conflicts,
        meeting_conflicts,
        section_conflicts,
    }
}

/// The assembled model, ready to be handed to the solver driver
pub struct GroupModel {
    /// The variable container of the underlying LP library
    pub vars: ProblemVariables,
    /// Objective to maximize
    pub objective: Expression,
    /// All hard and linearization constraints
    pub constraints: Vec<Constraint>,
    /// x[s][g]: participant s sits in group slot g
    pub assignment_vars: Vec<Vec<Variable>>,
    /// Number of group slots the model was built with
    pub num_slots: usize,
}

/// Build the full assignment model for the given participants.
///
/// Fails with `Infeasible` right away when fewer than three participants exist; all other
/// infeasibilities (five participants, unsatisfiable skill floor, contradictory mutual
/// pairs) surface from the solver.
pub fn build(
    students: &[Student],
    prepared: &PreparedProblem,
    graph: &PreferenceGraph,
    loops: &[PreferenceLoop],
    soft_weights: SoftConflictWeights,
) -> Result<GroupModel, MatchError> {
    let n = students.len();
    if n < MIN_GROUP_SIZE {
        return Err(MatchError::Infeasible(format!(
            "{} participant(s) cannot form a group of at least {}",
            n, MIN_GROUP_SIZE
        )));
    }
    let num_slots = max_group_slots(n);

    let mut vars = ProblemVariables::new();
    let mut constraints = Vec::new();

    let assignment_vars: Vec<Vec<Variable>> = (0..n)
        .map(|_| vars.add_vector(variable().binary(), num_slots))
        .collect();
    let used = vars.add_vector(variable().binary(), num_slots);
    let four = vars.add_vector(variable().binary(), num_slots);

    // Exactly-one membership per participant
    for s in 0..n {
        let membership: Expression = assignment_vars[s].iter().copied().sum();
        constraints.push(constraint!(membership == 1.0));
    }

    for g in 0..num_slots {
        let size: Expression = (0..n).map(|s| assignment_vars[s][g]).sum();

        // Size window: an occupied slot holds 3 or 4 participants, an empty one none
        constraints.push(constraint!(size.clone() >= 3.0 * used[g]));
        constraints.push(constraint!(size.clone() <= 4.0 * used[g]));

        // four[g] <=> the slot holds exactly four participants
        constraints.push(constraint!(4.0 * four[g] <= size.clone()));
        constraints.push(constraint!(size.clone() - four[g] <= 3.0));

        // Skill floor: total skill >= 5 * size, i.e. sum of (skill - 5) * x >= 0
        let skill_slack = (0..n).fold(Expression::from(0.0), |acc, s| {
            acc + (prepared.skill_totals[s] - SKILL_FLOOR_PER_MEMBER) as f64
                * assignment_vars[s][g]
        });
        constraints.push(constraint!(skill_slack >= 0.0));

        // At most one placeholder per group
        if prepared.placeholders.iter().any(|&p| p) {
            let placeholder_count = (0..n)
                .filter(|&s| prepared.placeholders[s])
                .fold(Expression::from(0.0), |acc, s| acc + assignment_vars[s][g]);
            constraints.push(constraint!(placeholder_count <= 1.0));
        }
    }

    // Participants that name each other always share a slot
    let mutual_pairs = graph.mutual_pairs();
    for &(a, b) in &mutual_pairs {
        for g in 0..num_slots {
            constraints.push(constraint!(
                assignment_vars[a][g] - assignment_vars[b][g] == 0.0
            ));
        }
    }

    // Conflict literals: one binary per conflicting pair and slot, forced to 1 when both
    // pair members occupy the slot
    let mut conflict_cost = Expression::from(0.0);
    let conflict_types: [(&Array2<bool>, u32); 3] = [
        (&prepared.avail_conflicts, soft_weights.avail),
        (&prepared.meeting_conflicts, soft_weights.meet),
        (&prepared.section_conflicts, soft_weights.section),
    ];
    for (matrix, weight) in conflict_types {
        for (i, j) in (0..n).tuple_combinations() {
            if !matrix[[i, j]] {
                continue;
            }
            for g in 0..num_slots {
                let literal = vars.add(variable().binary());
                constraints.push(constraint!(
                    literal - assignment_vars[i][g] - assignment_vars[j][g] >= -1.0
                ));
                constraints.push(constraint!(literal <= assignment_vars[i][g]));
                constraints.push(constraint!(literal <= assignment_vars[j][g]));
                conflict_cost += weight as f64 * literal;
            }
        }
    }

    // Honored-preference indicators for the edges not already enforced as mutual pairs
    let preference_edges = graph.non_mutual_edges();
    let mut preference_total = Expression::from(0.0);
    for &(u, v) in &preference_edges {
        for g in 0..num_slots {
            let together = vars.add(variable().binary());
            constraints.push(constraint!(together <= assignment_vars[u][g]));
            constraints.push(constraint!(together <= assignment_vars[v][g]));
            preference_total += together;
        }
    }

    // Co-location bonus for preference loops that fit into one group
    let colocatable_loops: Vec<&PreferenceLoop> = loops
        .iter()
        .filter(|l| l.len() > 2 && l.len() <= MAX_GROUP_SIZE)
        .collect();
    let mut loop_total = Expression::from(0.0);
    for preference_loop in &colocatable_loops {
        for g in 0..num_slots {
            let complete = vars.add(variable().binary());
            for &member in &preference_loop.members {
                constraints.push(constraint!(complete <= assignment_vars[member][g]));
            }
            loop_total += complete;
        }
    }

    // Skill spread: t_max dominates every slot total, t_min is pushed up to the smallest
    // total over the *used* slots (the big-M term neutralizes empty slots)
    let total_skill: i32 = prepared.skill_totals.iter().sum();
    let big_m = total_skill as f64;
    let t_max = vars.add(variable().min(0.0).max(big_m));
    let t_min = vars.add(variable().min(0.0).max(big_m));
    for g in 0..num_slots {
        let slot_total = (0..n).fold(Expression::from(0.0), |acc, s| {
            acc + prepared.skill_totals[s] as f64 * assignment_vars[s][g]
        });
        constraints.push(constraint!(t_max >= slot_total.clone()));
        constraints.push(constraint!(big_m * used[g] + t_min - slot_total <= big_m));
    }

    let (avail_pairs, meeting_pairs, section_pairs) = prepared.conflict_pair_counts();
    let bounds = weights::ObjectiveBounds {
        max_spread: total_skill as i64,
        max_conflict_cost: soft_weights.avail as i64 * avail_pairs as i64
            + soft_weights.meet as i64 * meeting_pairs as i64
            + soft_weights.section as i64 * section_pairs as i64,
        num_colocatable_loops: colocatable_loops.len() as i64,
        num_preference_edges: preference_edges.len() as i64,
    };
    let ladder = weights::SeparationLadder::derive(&bounds);
    debug!(
        "Separation ladder: four {}, preference {}, loop {}, conflict {}",
        ladder.four, ladder.preference, ladder.loop_bonus, ladder.conflict
    );

    let four_total: Expression = four.iter().copied().sum();
    let objective = ladder.four * four_total
        + ladder.preference * preference_total
        + ladder.loop_bonus * loop_total
        - ladder.conflict * conflict_cost
        - (t_max - t_min);

    info!(
        "Built model with {} participants, {} group slots, {} mutual pair(s), {} preference \
         edge(s), {} conflicting pair(s) and {} constraint(s)",
        n,
        num_slots,
        mutual_pairs.len(),
        preference_edges.len(),
        avail_pairs + meeting_pairs + section_pairs,
        constraints.len()
    );

    Ok(GroupModel {
        vars,
        objective,
        constraints,
        assignment_vars,
        num_slots,
    })
}
