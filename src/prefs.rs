//! Analysis of the preferred-partner graph.
//!
//! Every participant names at most one preferred partner, so the graph is a functional graph
//! with out-degree <= 1 and each weakly connected component contains at most one directed
//! cycle. Cycle detection is therefore a single walk per component with visited/on-path
//! marking instead of a general strongly-connected-components algorithm; this also lets us
//! emit every loop in a canonical orientation for reproducible output.

use log::warn;

use crate::Student;

/// The preferred-partner graph as a successor vector over participant indexes
#[derive(Debug, Clone)]
pub struct PreferenceGraph {
    successor: Vec<Option<usize>>,
}

/// A directed preference cycle of at least two participants. Member order follows the edges,
/// rotated such that the member with the lexicographically smallest email comes first.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceLoop {
    pub members: Vec<usize>,
}

impl PreferenceLoop {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Build the preference graph from the participants' preferred partner emails.
///
/// Emails that do not resolve to another participant are dropped with a warning, as are
/// self-preferences. Returns the graph and the accumulated warnings.
pub fn build_graph(students: &[Student]) -> (PreferenceGraph, Vec<String>) {
    let mut warnings = Vec::new();
    let mut successor = vec![None; students.len()];

    for (i, student) in students.iter().enumerate() {
        let Some(preferred) = &student.preferred_partner else {
            continue;
        };
        let preferred = preferred.trim();
        if preferred.is_empty() {
            continue;
        }
        match students.iter().position(|other| other.email.trim() == preferred) {
            Some(j) if j == i => {
                let message = format!(
                    "{} ({}) named themselves as preferred partner; ignoring",
                    student.name, student.email
                );
                warn!("{}", message);
                warnings.push(message);
            }
            Some(j) => successor[i] = Some(j),
            None => {
                let message = format!(
                    "preferred partner '{}' of {} ({}) does not match any participant; ignoring",
                    preferred, student.name, student.email
                );
                warn!("{}", message);
                warnings.push(message);
            }
        }
    }

    (PreferenceGraph { successor }, warnings)
}

impl PreferenceGraph {
    /// The participant this participant wants to be grouped with, if the wish resolved
    pub fn successor(&self, index: usize) -> Option<usize> {
        self.successor[index]
    }

    /// All resolved preference edges (u, v) in participant order
    pub fn directed_edges(&self) -> Vec<(usize, usize)> {
        self.successor
            .iter()
            .enumerate()
            .filter_map(|(u, v)| v.map(|v| (u, v)))
            .collect()
    }

    /// Pairs (a, b) with a < b that name each other, i.e. loops of length exactly two
    pub fn mutual_pairs(&self) -> Vec<(usize, usize)> {
        self.directed_edges()
            .into_iter()
            .filter(|&(u, v)| u < v && self.successor[v] == Some(u))
            .collect()
    }

    /// All resolved edges that are not half of a mutual pair
    pub fn non_mutual_edges(&self) -> Vec<(usize, usize)> {
        self.directed_edges()
            .into_iter()
            .filter(|&(u, v)| self.successor[v] != Some(u))
            .collect()
    }

    /// Find all preference loops of length >= 2.
    ///
    /// Walks the successor chain from every unvisited participant. A chain either ends (no
    /// successor, or a participant handled by an earlier walk) or closes a cycle on the
    /// current path. Loops are returned sorted by the email of their canonical first member.
    pub fn find_loops(&self, students: &[Student]) -> Vec<PreferenceLoop> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::New; self.successor.len()];
        let mut loops = Vec::new();

        for start in 0..self.successor.len() {
            if marks[start] != Mark::New {
                continue;
            }
            let mut path = Vec::new();
            let mut current = start;
            loop {
                marks[current] = Mark::OnPath;
                path.push(current);
                let Some(next) = self.successor[current] else {
                    break;
                };
                match marks[next] {
                    Mark::New => current = next,
                    Mark::OnPath => {
                        // The walk bit its own tail; everything from `next` onwards is a cycle.
                        let tail_start = path.iter().position(|&p| p == next).unwrap();
                        if path.len() - tail_start >= 2 {
                            loops.push(canonicalize(path[tail_start..].to_vec(), students));
                        }
                        break;
                    }
                    Mark::Done => break,
                }
            }
            for &p in &path {
                marks[p] = Mark::Done;
            }
        }

        loops.sort_by(|a, b| students[a.members[0]].email.cmp(&students[b.members[0]].email));
        loops
    }
}

/// Rotate the loop such that the member with the smallest email leads; the edge direction
/// is preserved.
fn canonicalize(members: Vec<usize>, students: &[Student]) -> PreferenceLoop {
    let anchor = members
        .iter()
        .enumerate()
        .min_by(|(_, &a), (_, &b)| students[a].email.cmp(&students[b].email))
        .map(|(pos, _)| pos)
        .unwrap();
    let mut rotated = members[anchor..].to_vec();
    rotated.extend_from_slice(&members[..anchor]);
    PreferenceLoop { members: rotated }
}
