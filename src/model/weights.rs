//! Derivation of the separating objective weights.
//!
//! The lexicographic objective (four-groups, then honored preferences, then loop
//! co-location, then soft conflicts, then skill spread) is folded into a single weighted
//! sum. For the fold to be exact, each level's unit weight must strictly exceed the largest
//! value all lower levels can contribute together. The bounds fed in here are tight per
//! instance (actual conflicting-pair counts, actual edge and loop counts, the total skill
//! sum as a spread bound) rather than worst-case formulas, which keeps the top-level
//! coefficients small enough for the MILP engine's numerics.

/// Safe upper bounds on the magnitude of each objective component for one instance
#[derive(Debug, Clone, Copy)]
pub struct ObjectiveBounds {
    /// Largest possible skill spread (bounded by the total skill sum)
    pub max_spread: i64,
    /// Largest possible weighted soft conflict cost (every conflicting pair co-located)
    pub max_conflict_cost: i64,
    /// Number of preference loops small enough to fit into one group
    pub num_colocatable_loops: i64,
    /// Number of non-mutual preference edges
    pub num_preference_edges: i64,
}

/// Unit weight per objective level. Levels from the bottom: the skill spread has unit
/// weight 1 implicitly; `conflict` multiplies the weighted conflict cost; `loop_bonus`
/// rewards a fully co-located loop; `preference` rewards one honored edge; `four` rewards
/// one group of four.
#[derive(Debug, Clone, Copy)]
pub struct SeparationLadder {
    pub conflict: f64,
    pub loop_bonus: f64,
    pub preference: f64,
    pub four: f64,
}

impl SeparationLadder {
    /// Derive the ladder from the instance bounds: each level's weight is one more than
    /// the accumulated maximum of everything below it.
    pub fn derive(bounds: &ObjectiveBounds) -> SeparationLadder {
        let mut below: i64 = bounds.max_spread;
        let conflict = below + 1;
        below += conflict * bounds.max_conflict_cost;
        let loop_bonus = below + 1;
        below += loop_bonus * bounds.num_colocatable_loops;
        let preference = below + 1;
        below += preference * bounds.num_preference_edges;
        let four = below + 1;

        SeparationLadder {
            conflict: conflict as f64,
            loop_bonus: loop_bonus as f64,
            preference: preference as f64,
            four: four as f64,
        }
    }
}
