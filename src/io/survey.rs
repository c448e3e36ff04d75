// Copyright 2024 by Michael Thies <mail@mhthies.de>
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except in compliance with
// the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! Reader for the survey response CSV.
//!
//! Column headers are matched case-insensitively after trimming. Structural problems (a
//! missing required column) are fatal; problems within a single row (unparsable skill
//! rating, unknown meeting preference, missing email) drop that row and are returned as
//! warnings, so a single garbled response does not abort the whole run.

use std::collections::BTreeSet;

use csv::StringRecord;
use log::warn;

use super::HeaderIndex;
use crate::error::MatchError;
use crate::{MeetingMode, Student};

const COL_STUDENT_ID: &str = "Student ID";
const COL_NAME: &str = "Name";
const COL_EMAIL: &str = "Email";
const COL_GITHUB: &str = "GitHub Username";
const COL_PARTNER: &str = "Preferred Partner Email";
const COL_RUBY: &str = "Ruby Skill";
const COL_HTML_CSS: &str = "HTML/CSS Skill";
const COL_JS: &str = "JavaScript Skill";
const COL_MEETING: &str = "Meeting Preference";
const COL_TIMES: &str = "Available Times";
const COL_SECTION: &str = "Section";

struct SurveyColumns {
    student_id: usize,
    name: usize,
    email: usize,
    github: usize,
    partner: usize,
    ruby: usize,
    html_css: usize,
    js: usize,
    meeting: usize,
    times: usize,
    section: usize,
}

impl SurveyColumns {
    fn locate(headers: &HeaderIndex) -> Result<SurveyColumns, MatchError> {
        let find = |label: &str| {
            headers.find(label).ok_or_else(|| {
                MatchError::InvalidSurveyRow(format!("missing required column '{}'", label))
            })
        };
        Ok(SurveyColumns {
            student_id: find(COL_STUDENT_ID)?,
            name: find(COL_NAME)?,
            email: find(COL_EMAIL)?,
            github: find(COL_GITHUB)?,
            partner: find(COL_PARTNER)?,
            ruby: find(COL_RUBY)?,
            html_css: find(COL_HTML_CSS)?,
            js: find(COL_JS)?,
            meeting: find(COL_MEETING)?,
            times: find(COL_TIMES)?,
            section: find(COL_SECTION)?,
        })
    }
}

/// Read the survey responses in submission order. Returns the parsed students together with
/// the warnings for dropped rows.
pub fn read<R: std::io::Read>(reader: R) -> Result<(Vec<Student>, Vec<String>), MatchError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let columns = SurveyColumns::locate(&HeaderIndex::new(csv_reader.headers()?))?;

    let mut students = Vec::new();
    let mut warnings = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                let message = format!("dropping unreadable survey row {}: {}", line, err);
                warn!("{}", message);
                warnings.push(message);
                continue;
            }
        };
        match parse_row(&record, &columns) {
            Ok(student) => students.push(student),
            Err(reason) => {
                let message = format!("dropping survey row {}: {}", line, reason);
                warn!("{}", message);
                warnings.push(message);
            }
        }
    }

    Ok((students, warnings))
}

fn parse_row(record: &StringRecord, columns: &SurveyColumns) -> Result<Student, String> {
    let field = |index: usize| record.get(index).unwrap_or("").trim();
    let optional = |index: usize| {
        let value = field(index);
        if value.is_empty() {
            None
        } else {
            Some(value.to_owned())
        }
    };

    let email = field(columns.email);
    if email.is_empty() {
        return Err(String::from("no email address"));
    }

    Ok(Student {
        student_id: field(columns.student_id).to_owned(),
        name: field(columns.name).to_owned(),
        email: email.to_owned(),
        github: optional(columns.github),
        ruby: parse_skill(field(columns.ruby), COL_RUBY)?,
        html_css: parse_skill(field(columns.html_css), COL_HTML_CSS)?,
        js: parse_skill(field(columns.js), COL_JS)?,
        meeting: parse_meeting(field(columns.meeting))?,
        availability: parse_times(field(columns.times)),
        section: optional(columns.section),
        preferred_partner: optional(columns.partner),
        is_placeholder: false,
    })
}

fn parse_skill(raw: &str, label: &str) -> Result<u8, String> {
    match raw.parse::<u8>() {
        Ok(value) if (1..=5).contains(&value) => Ok(value),
        _ => Err(format!("{} '{}' is not an integer in 1..=5", label, raw)),
    }
}

/// Map the free-form meeting preference by prefix; hyphens count as spaces, so both
/// "In Person" and "in-person (on campus)" resolve. A blank answer means no preference.
fn parse_meeting(raw: &str) -> Result<MeetingMode, String> {
    let normalized = raw.to_lowercase().replace('-', " ");
    if normalized.is_empty() || normalized.starts_with("no preference") {
        Ok(MeetingMode::NoPreference)
    } else if normalized.starts_with("in person") {
        Ok(MeetingMode::InPerson)
    } else if normalized.starts_with("remote") {
        Ok(MeetingMode::Remote)
    } else {
        Err(format!("unknown meeting preference '{}'", raw))
    }
}

/// Split the availability answer into a token set. A blank cell means the question was not
/// answered at all, which is distinct from an answer without usable tokens.
fn parse_times(raw: &str) -> Option<BTreeSet<String>> {
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Student ID,Name,Email,GitHub Username,Preferred Partner Email,\
                          Ruby Skill,HTML/CSS Skill,JavaScript Skill,Meeting Preference,\
                          Available Times,Section";

    #[test]
    fn parses_a_complete_survey() {
        let data = format!(
            "{}\n\
             3034,Ada Lovelace,ada@x.edu,ada-gh,ben@x.edu,4,3,5,In Person,\"Mon 10, Wed 14\",A01\n\
             3035,Ben Byte,ben@x.edu,,,2,2,2,remote (mostly),,\n",
            HEADER
        );
        let (students, warnings) = read(data.as_bytes()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(students.len(), 2);

        let ada = &students[0];
        assert_eq!(ada.student_id, "3034");
        assert_eq!(ada.name, "Ada Lovelace");
        assert_eq!(ada.github.as_deref(), Some("ada-gh"));
        assert_eq!(ada.preferred_partner.as_deref(), Some("ben@x.edu"));
        assert_eq!((ada.ruby, ada.html_css, ada.js), (4, 3, 5));
        assert_eq!(ada.meeting, MeetingMode::InPerson);
        let times = ada.availability.as_ref().unwrap();
        assert!(times.contains("Mon 10") && times.contains("Wed 14"));
        assert_eq!(ada.section.as_deref(), Some("A01"));

        let ben = &students[1];
        assert_eq!(ben.github, None);
        assert_eq!(ben.meeting, MeetingMode::Remote);
        assert_eq!(ben.availability, None);
        assert_eq!(ben.section, None);
        assert!(!ben.is_placeholder);
    }

    #[test]
    fn header_matching_ignores_case_and_whitespace() {
        let data = " student id , NAME ,Email, github username ,Preferred Partner Email,\
                     ruby skill,html/css skill,JAVASCRIPT SKILL,Meeting Preference,\
                     Available Times,Section\n\
                     1,Ada,ada@x.edu,,,3,3,3,No Preference,,\n";
        let (students, warnings) = read(data.as_bytes()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].email, "ada@x.edu");
    }

    #[test]
    fn drops_rows_with_bad_skills_or_unknown_meeting_preference() {
        let data = format!(
            "{}\n\
             1,Ada,ada@x.edu,,,3,3,3,No Preference,,\n\
             2,Ben,ben@x.edu,,,6,3,3,No Preference,,\n\
             3,Cid,cid@x.edu,,,3,x,3,No Preference,,\n\
             4,Dot,dot@x.edu,,,3,3,3,by carrier pigeon,,\n\
             5,Eve,,,,3,3,3,No Preference,,\n",
            HEADER
        );
        let (students, warnings) = read(data.as_bytes()).unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].email, "ada@x.edu");
        assert_eq!(warnings.len(), 4);
        assert!(warnings[0].contains("row 3"));
        assert!(warnings[0].contains("Ruby Skill"));
        assert!(warnings[2].contains("meeting preference"));
        assert!(warnings[3].contains("no email address"));
    }

    #[test]
    fn missing_column_is_fatal() {
        let data = "Student ID,Name,Email\n1,Ada,ada@x.edu\n";
        match read(data.as_bytes()) {
            Err(MatchError::InvalidSurveyRow(message)) => {
                assert!(message.contains("GitHub Username"));
            }
            other => panic!("expected InvalidSurveyRow, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn meeting_preference_prefix_matching() {
        assert_eq!(parse_meeting("In Person"), Ok(MeetingMode::InPerson));
        assert_eq!(parse_meeting("in-person (on campus)"), Ok(MeetingMode::InPerson));
        assert_eq!(parse_meeting("Remote"), Ok(MeetingMode::Remote));
        assert_eq!(parse_meeting("No Preference"), Ok(MeetingMode::NoPreference));
        assert_eq!(parse_meeting(""), Ok(MeetingMode::NoPreference));
        assert!(parse_meeting("smoke signals").is_err());
    }

    #[test]
    fn availability_distinguishes_unknown_from_empty() {
        assert_eq!(parse_times(""), None);
        let known = parse_times("Mon, ,Tue").unwrap();
        assert_eq!(known.len(), 2);
        assert!(parse_times(",").unwrap().is_empty());
    }
}
