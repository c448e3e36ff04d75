pub mod error;
pub mod groups;
pub mod model;
pub mod pipeline;
pub mod prefs;
pub mod reconcile;
pub mod report;
pub mod solver;

pub mod io;

use std::collections::BTreeSet;

use crate::error::MatchError;

/// How a student prefers to meet with their project group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingMode {
    InPerson,
    Remote,
    NoPreference,
}

/// Representation of one participant's survey data
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    /// Student id from the survey (or the roster, for placeholders)
    pub student_id: String,
    /// Student's name. Mainly used for info/debug output and the report
    pub name: String,
    /// Student's email address, the identity key across survey and roster
    pub email: String,
    /// github.com username, if the student provided one
    pub github: Option<String>,
    /// Self-rated Ruby skill in 1..=5
    pub ruby: u8,
    /// Self-rated HTML/CSS skill in 1..=5
    pub html_css: u8,
    /// Self-rated JavaScript skill in 1..=5
    pub js: u8,
    /// Preferred meeting mode
    pub meeting: MeetingMode,
    /// Weekly time slots the student is available. `None` means the student did not answer the
    /// question; `Some` with an empty set means they answered with no usable slot. Both are
    /// treated as conflict-free by the availability conflict predicate.
    pub availability: Option<BTreeSet<String>>,
    /// Course section the student attends, if known
    pub section: Option<String>,
    /// Email address of the partner the student asked to be grouped with
    pub preferred_partner: Option<String>,
    /// Whether this record was synthesized for a roster student without a survey response
    pub is_placeholder: bool,
}

impl Student {
    /// Sum of the three skill self-ratings
    pub fn skill_total(&self) -> i32 {
        self.ruby as i32 + self.html_css as i32 + self.js as i32
    }

    /// Create a placeholder participant for a roster entry without a survey response.
    ///
    /// Placeholders get middling skill ratings, no meeting preference and unknown availability,
    /// so they never cause soft conflicts but still count towards the skill floor.
    pub fn placeholder(student_id: String, name: String, email: String) -> Student {
        Student {
            student_id,
            name,
            email,
            github: None,
            ruby: 2,
            html_css: 2,
            js: 2,
            meeting: MeetingMode::NoPreference,
            availability: None,
            section: None,
            preferred_partner: None,
            is_placeholder: true,
        }
    }
}

/// A project group as result of the overall pipeline. Members are indexes into the participant
/// list owned by the orchestrator; the group number is assigned by the post-processor.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// 1-based group number, stable across reruns on identical inputs
    pub number: u32,
    /// Member indexes, sorted by the members' email addresses
    pub members: Vec<usize>,
}

/// Penalty weights of the three pairwise soft conflict types.
///
/// The strict ordering `avail > meet > section` is part of the external contract: an
/// availability clash must always cost more than a meeting-mode clash, which must cost more
/// than a section clash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftConflictWeights {
    pub avail: u32,
    pub meet: u32,
    pub section: u32,
}

impl Default for SoftConflictWeights {
    fn default() -> Self {
        SoftConflictWeights {
            avail: 8,
            meet: 4,
            section: 1,
        }
    }
}

impl SoftConflictWeights {
    /// Check the positivity and strict ordering invariant of the weights
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.section == 0 || self.avail <= self.meet || self.meet <= self.section {
            return Err(MatchError::InvalidConfig(format!(
                "soft conflict weights must be positive and strictly ordered \
                 (got availability {}, meeting {}, section {})",
                self.avail, self.meet, self.section
            )));
        }
        Ok(())
    }
}

/// A group assignment as result of the solver. It maps each participant index to the group slot
/// the participant was placed in; `None` marks an unassigned participant (which a feasible
/// solution never produces, but the report has to be able to say so).
pub type Assignment = Vec<Option<usize>>;
