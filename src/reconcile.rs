//! Reconciliation of survey responses against the course roster.

use log::{info, warn};

use crate::io::roster::RosterEntry;
use crate::Student;

/// Result of merging the survey with the roster
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// The participant set handed to the solver
    pub students: Vec<Student>,
    /// Roster entries without a survey response, in roster order
    pub missing: Vec<RosterEntry>,
    /// Recoverable problems found while merging
    pub warnings: Vec<String>,
}

/// Merge survey respondents with the roster.
///
/// Duplicate survey submissions for the same email are coalesced, keeping the most recent one
/// (survey rows arrive in submission order). Roster students without a survey response are
/// listed as missing; when `include_missing` is set they additionally join the participant set
/// as placeholder records with default attributes.
pub fn reconcile(
    survey: Vec<Student>,
    roster: &[RosterEntry],
    include_missing: bool,
) -> ReconcileOutcome {
    let mut warnings = Vec::new();

    let mut students: Vec<Student> = Vec::with_capacity(survey.len());
    for student in survey {
        let email = student.email.trim().to_owned();
        match students.iter().position(|s| s.email.trim() == email) {
            Some(existing) => {
                let message = format!(
                    "duplicate survey submission for {}; keeping the most recent one",
                    email
                );
                warn!("{}", message);
                warnings.push(message);
                students[existing] = student;
            }
            None => students.push(student),
        }
    }

    let missing: Vec<RosterEntry> = roster
        .iter()
        .filter(|entry| {
            !students
                .iter()
                .any(|s| s.email.trim() == entry.email.trim())
        })
        .cloned()
        .collect();

    if !missing.is_empty() {
        info!(
            "{} roster student(s) did not submit the survey",
            missing.len()
        );
    }

    if include_missing {
        for entry in &missing {
            students.push(Student::placeholder(
                entry.student_id.clone(),
                entry.name.clone(),
                entry.email.clone(),
            ));
        }
    }

    ReconcileOutcome {
        students,
        missing,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeetingMode;

    fn survey_student(email: &str, ruby: u8) -> Student {
        Student {
            student_id: String::from("1000"),
            name: format!("Student {}", email),
            email: email.to_owned(),
            github: Some(String::from("ghuser")),
            ruby,
            html_css: 3,
            js: 3,
            meeting: MeetingMode::InPerson,
            availability: None,
            section: None,
            preferred_partner: None,
            is_placeholder: false,
        }
    }

    fn roster_entry(id: &str, name: &str, email: &str) -> RosterEntry {
        RosterEntry {
            student_id: id.to_owned(),
            name: name.to_owned(),
            email: email.to_owned(),
        }
    }

    #[test]
    fn keeps_latest_duplicate_submission() {
        let survey = vec![
            survey_student("a@x.edu", 1),
            survey_student("b@x.edu", 2),
            survey_student("a@x.edu", 5),
        ];
        let outcome = reconcile(survey, &[], false);
        assert_eq!(outcome.students.len(), 2);
        assert_eq!(outcome.students[0].ruby, 5, "the most recent row must win");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("a@x.edu"));
    }

    #[test]
    fn identifies_missing_roster_students() {
        let survey = vec![survey_student("a@x.edu", 3)];
        let roster = vec![
            roster_entry("1", "Ada", "a@x.edu"),
            roster_entry("2", "Ben", "b@x.edu"),
            roster_entry("3", "Cid", "c@x.edu"),
        ];
        let outcome = reconcile(survey, &roster, false);
        assert_eq!(outcome.students.len(), 1);
        let missing_emails: Vec<&str> =
            outcome.missing.iter().map(|m| m.email.as_str()).collect();
        assert_eq!(missing_emails, vec!["b@x.edu", "c@x.edu"]);
    }

    #[test]
    fn synthesizes_placeholders_when_requested() {
        let survey = vec![survey_student("a@x.edu", 3)];
        let roster = vec![
            roster_entry("1", "Ada", "a@x.edu"),
            roster_entry("2", "Ben", "b@x.edu"),
        ];
        let outcome = reconcile(survey, &roster, true);
        assert_eq!(outcome.students.len(), 2);
        let placeholder = &outcome.students[1];
        assert!(placeholder.is_placeholder);
        assert_eq!(placeholder.email, "b@x.edu");
        assert_eq!(placeholder.name, "Ben");
        assert_eq!(
            (placeholder.ruby, placeholder.html_css, placeholder.js),
            (2, 2, 2)
        );
        assert_eq!(placeholder.meeting, MeetingMode::NoPreference);
        assert_eq!(placeholder.availability, None);
        // The missing report lists them regardless of inclusion.
        assert_eq!(outcome.missing.len(), 1);
    }
}
