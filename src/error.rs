//! Error types of the team matching pipeline.

use thiserror::Error;

/// Unified error type for all pipeline phases.
///
/// Every variant here is fatal for the run. Recoverable problems (a survey row with an
/// out-of-range skill rating, an unresolvable preferred partner email, a duplicate survey
/// submission) are not errors: the callers drop or coalesce the offending record and put a
/// warning into the diagnostics bag instead.
#[derive(Error, Debug)]
pub enum MatchError {
    /// The survey table cannot be used (e.g. a required column is missing)
    #[error("invalid survey input: {0}")]
    InvalidSurveyRow(String),

    /// The roster table lacks the required identity columns
    #[error("invalid roster input: {0}")]
    InvalidRoster(String),

    /// The run configuration violates an invariant (e.g. the weight ordering)
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The hard constraints admit no assignment at all
    #[error("no feasible group assignment exists: {0}")]
    Infeasible(String),

    /// The time budget elapsed before the solver found any feasible solution
    #[error("solver hit the time budget without finding a feasible solution")]
    SolverTimeout,

    /// The solver failed for a reason other than infeasibility or the time budget
    #[error("solver failure: {0}")]
    InternalSolverError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl MatchError {
    /// Process exit status for this error: 2 for infeasibility, 3 for a solver timeout,
    /// 4 for input validation failures and 1 for internal solver errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            MatchError::Infeasible(_) => 2,
            MatchError::SolverTimeout => 3,
            MatchError::InvalidSurveyRow(_)
            | MatchError::InvalidRoster(_)
            | MatchError::InvalidConfig(_)
            | MatchError::Io(_)
            | MatchError::Csv(_) => 4,
            MatchError::InternalSolverError(_) => 1,
        }
    }
}
