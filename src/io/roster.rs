//! Reader for the course roster CSV. Only the three identity columns are required; any
//! further columns are ignored.

use log::warn;

use super::HeaderIndex;
use crate::error::MatchError;

/// One roster line: the identity triple of an enrolled student
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub student_id: String,
    pub name: String,
    pub email: String,
}

/// Read the roster in file order. Rows without an email address are dropped with a warning;
/// a missing identity column is fatal.
pub fn read<R: std::io::Read>(reader: R) -> Result<(Vec<RosterEntry>, Vec<String>), MatchError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = HeaderIndex::new(csv_reader.headers()?);
    let find = |label: &str| {
        headers.find(label).ok_or_else(|| {
            MatchError::InvalidRoster(format!("missing required column '{}'", label))
        })
    };
    let id_column = find("Student ID")?;
    let name_column = find("Name")?;
    let email_column = find("Email")?;

    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let field = |column: usize| record.get(column).unwrap_or("").trim().to_owned();
        let entry = RosterEntry {
            student_id: field(id_column),
            name: field(name_column),
            email: field(email_column),
        };
        if entry.email.is_empty() {
            let message = format!("dropping roster row {} without an email address", index + 2);
            warn!("{}", message);
            warnings.push(message);
            continue;
        }
        entries.push(entry);
    }

    Ok((entries, warnings))
}
