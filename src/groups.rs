//! Post-processing of the raw solver assignment into numbered groups.

use crate::{Assignment, Group, Student};

/// The final, renumbered groups plus the participants that ended up in no slot (empty for
/// every feasible solution, but the report has to be able to list them)
#[derive(Debug)]
pub struct NumberedGroups {
    pub groups: Vec<Group>,
    pub unassigned: Vec<usize>,
}

/// Convert the slot assignment into groups: empty slots are discarded, members are sorted
/// by email and the surviving groups are numbered from 1 in ascending order of their
/// smallest member email, so reruns on identical inputs produce identical numbering.
pub fn number_groups(
    students: &[Student],
    assignment: &Assignment,
    num_slots: usize,
) -> NumberedGroups {
    let mut slot_members: Vec<Vec<usize>> = vec![Vec::new(); num_slots];
    let mut unassigned = Vec::new();
    for (s, slot) in assignment.iter().enumerate() {
        match slot {
            Some(g) => slot_members[*g].push(s),
            None => unassigned.push(s),
        }
    }

    let mut groups: Vec<Group> = slot_members
        .into_iter()
        .filter(|members| !members.is_empty())
        .map(|mut members| {
            members.sort_by(|&a, &b| students[a].email.cmp(&students[b].email));
            Group { number: 0, members }
        })
        .collect();
    groups.sort_by(|a, b| students[a.members[0]].email.cmp(&students[b.members[0]].email));
    for (i, group) in groups.iter_mut().enumerate() {
        group.number = (i + 1) as u32;
    }

    NumberedGroups { groups, unassigned }
}
