//! Tabular input and output of the tool: the survey and roster CSV readers and the
//! assignment/summary CSV writers.

pub mod roster;
pub mod survey;

use csv::StringRecord;
use serde::Serialize;

use crate::error::MatchError;
use crate::{Group, Student};

/// Case-insensitive, whitespace-trimmed lookup of column positions in a CSV header row
pub(crate) struct HeaderIndex {
    columns: Vec<String>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &StringRecord) -> HeaderIndex {
        HeaderIndex {
            columns: headers.iter().map(normalize_header).collect(),
        }
    }

    pub(crate) fn find(&self, label: &str) -> Option<usize> {
        let wanted = normalize_header(label);
        self.columns.iter().position(|column| *column == wanted)
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

#[derive(Serialize)]
struct AssignmentRow<'a> {
    #[serde(rename = "Group Number")]
    group_number: u32,
    #[serde(rename = "Email Address")]
    email: &'a str,
    #[serde(rename = "What is your name?")]
    name: &'a str,
    #[serde(rename = "What is your student ID?")]
    student_id: &'a str,
    #[serde(rename = "What is your github.com username?")]
    github: &'a str,
}

/// Write the group assignment table, one row per participant, sorted by group number and
/// member email (the order the post-processor already established).
pub fn write_assignment<W: std::io::Write>(
    writer: W,
    students: &[Student],
    groups: &[Group],
) -> Result<(), MatchError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for group in groups {
        for &member in &group.members {
            let student = &students[member];
            csv_writer.serialize(AssignmentRow {
                group_number: group.number,
                email: &student.email,
                name: &student.name,
                student_id: &student.student_id,
                github: student.github.as_deref().unwrap_or(""),
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct SummaryRow {
    #[serde(rename = "Group Number")]
    group_number: u32,
    #[serde(rename = "Members")]
    members: String,
}

/// Write the one-line-per-group summary table (group number and comma-joined member names)
pub fn write_group_summary<W: std::io::Write>(
    writer: W,
    students: &[Student],
    groups: &[Group],
) -> Result<(), MatchError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for group in groups {
        let members = group
            .members
            .iter()
            .map(|&m| students[m].name.as_str())
            .collect::<Vec<&str>>()
            .join(", ");
        csv_writer.serialize(SummaryRow {
            group_number: group.number,
            members,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeetingMode;

    fn student(name: &str, email: &str, github: Option<&str>) -> Student {
        Student {
            student_id: format!("9{}", name.len()),
            name: name.to_owned(),
            email: email.to_owned(),
            github: github.map(|g| g.to_owned()),
            ruby: 3,
            html_css: 3,
            js: 3,
            meeting: MeetingMode::NoPreference,
            availability: None,
            section: None,
            preferred_partner: None,
            is_placeholder: false,
        }
    }

    #[test]
    fn writes_assignment_rows_in_group_order() {
        let students = vec![
            student("Ada", "ada@x.edu", Some("ada-gh")),
            student("Ben", "ben@x.edu", None),
            student("Cid", "cid@x.edu", Some("cid-gh")),
        ];
        let groups = vec![Group {
            number: 1,
            members: vec![0, 1, 2],
        }];
        let mut buffer = Vec::new();
        write_assignment(&mut buffer, &students, &groups).unwrap();
        let written = String::from_utf8(buffer).unwrap();
        assert_eq!(
            written,
            "Group Number,Email Address,What is your name?,What is your student ID?,\
             What is your github.com username?\n\
             1,ada@x.edu,Ada,93,ada-gh\n\
             1,ben@x.edu,Ben,93,\n\
             1,cid@x.edu,Cid,93,cid-gh\n"
        );
    }

    #[test]
    fn writes_group_summary() {
        let students = vec![
            student("Ada", "ada@x.edu", None),
            student("Ben", "ben@x.edu", None),
            student("Cid", "cid@x.edu", None),
        ];
        let groups = vec![Group {
            number: 1,
            members: vec![0, 1, 2],
        }];
        let mut buffer = Vec::new();
        write_group_summary(&mut buffer, &students, &groups).unwrap();
        let written = String::from_utf8(buffer).unwrap();
        assert_eq!(written, "Group Number,Members\n1,\"Ada, Ben, Cid\"\n");
    }
}
