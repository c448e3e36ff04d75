//! Driver for the underlying MILP engine.
//!
//! The engine is treated as a black box behind a single blocking call: the model is handed
//! over together with a wall-clock budget and a seed, and either a decoded assignment or an
//! error comes back. The solver handle only lives inside `solve`, so it is released on
//! every exit path.

use std::time::{Duration, Instant};

use good_lp::{default_solver, ResolutionError, Solution, SolverModel};
use log::{debug, info};

use crate::error::MatchError;
use crate::model::GroupModel;
use crate::Assignment;

/// How the solver terminated when it produced a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// The solution was proven optimal within the budget
    Optimal,
    /// The budget elapsed; the best feasible solution found so far is returned
    TimeLimit,
}

/// A decoded solver result
#[derive(Debug)]
pub struct SolveOutcome {
    pub assignment: Assignment,
    pub status: SolveStatus,
    /// Number of group slots of the solved model, needed to decode the groups
    pub num_slots: usize,
}

/// Solve the assignment model within the given wall-clock budget.
///
/// The engine runs single-threaded with a fixed seed, so identical inputs produce identical
/// solutions. Infeasibility and an exhausted budget without any incumbent are reported as
/// the distinct errors `Infeasible` and `SolverTimeout`; everything else the engine refuses
/// to do becomes `InternalSolverError`.
pub fn solve(
    model: GroupModel,
    time_budget: Duration,
    seed: u64,
) -> Result<SolveOutcome, MatchError> {
    let GroupModel {
        vars,
        objective,
        constraints,
        assignment_vars,
        num_slots,
    } = model;

    info!(
        "Starting MILP solve over {} group slots with a {:.0} s budget (seed {})",
        num_slots,
        time_budget.as_secs_f64(),
        seed
    );
    let start = Instant::now();

    let mut problem = vars
        .maximise(objective)
        .using(default_solver)
        .set_option("threads", 1)
        .set_option("random_seed", seed as i32)
        .set_option("time_limit", time_budget.as_secs_f64())
        .set_option("output_flag", "false");
    for constraint in constraints {
        problem.add_constraint(constraint);
    }

    match problem.solve() {
        Ok(solution) => {
            let elapsed = start.elapsed();
            let mut assignment: Assignment = vec![None; assignment_vars.len()];
            for (s, slots) in assignment_vars.iter().enumerate() {
                for (g, var) in slots.iter().enumerate() {
                    if solution.value(*var) > 0.5 {
                        assignment[s] = Some(g);
                        break;
                    }
                }
            }
            let status = if elapsed >= time_budget {
                SolveStatus::TimeLimit
            } else {
                SolveStatus::Optimal
            };
            info!("Solver finished with {:?} after {:.2?}", status, elapsed);
            Ok(SolveOutcome {
                assignment,
                status,
                num_slots,
            })
        }
        Err(ResolutionError::Infeasible) => Err(MatchError::Infeasible(String::from(
            "the hard constraints (group sizes, skill floor, placeholder dispersion, mutual \
             pairs) rule out every assignment",
        ))),
        Err(err) => {
            let elapsed = start.elapsed();
            debug!("Solver returned an error after {:.2?}: {}", elapsed, err);
            if elapsed >= time_budget {
                Err(MatchError::SolverTimeout)
            } else {
                Err(MatchError::InternalSolverError(err.to_string()))
            }
        }
    }
}
