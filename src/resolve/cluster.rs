// src/resolve/cluster.rs
//
// Greedy first-seen-wins clustering within one name group. Each group owns
// its signal maps outright, so groups can run in parallel with no shared
// state.

use std::collections::HashMap;

/// Printed form of the explicit "insufficient signal" outcome.
pub const UNRESOLVED_MARKER: &str = "*";

/// Identity assigned to one row of a name group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterLabel {
    /// Same id within a group means same believed real-world individual.
    Cluster(u32),
    /// Neither signal present; never merged with any other row.
    Unresolved,
}

impl ClusterLabel {
    pub fn render(&self) -> String {
        match self {
            ClusterLabel::Cluster(id) => id.to_string(),
            ClusterLabel::Unresolved => UNRESOLVED_MARKER.to_string(),
        }
    }
}

/// The date-of-birth and postal-code signals of one row, borrowed from it.
pub type Signals<'a> = (Option<&'a str>, Option<&'a str>);

#[derive(Debug, Default)]
struct GroupState {
    by_dob: HashMap<String, u32>,
    by_postcode: HashMap<String, u32>,
    next_id: u32,
}

impl GroupState {
    fn new() -> Self {
        GroupState {
            next_id: 1,
            ..GroupState::default()
        }
    }

    fn assign(&mut self, (dob, postcode): Signals<'_>) -> ClusterLabel {
        if let Some(dob) = dob {
            let id = match self.by_dob.get(dob) {
                Some(&id) => id,
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    self.by_dob.insert(dob.to_string(), id);
                    id
                }
            };
            // Cross-link this row's postcode so a later row carrying only
            // the postcode joins the same cluster. First binding wins; an
            // already-linked postcode is never rebound.
            if let Some(postcode) = postcode {
                self.by_postcode.entry(postcode.to_string()).or_insert(id);
            }
            return ClusterLabel::Cluster(id);
        }
        if let Some(postcode) = postcode {
            if let Some(&id) = self.by_postcode.get(postcode) {
                return ClusterLabel::Cluster(id);
            }
            let id = self.next_id;
            self.next_id += 1;
            self.by_postcode.insert(postcode.to_string(), id);
            return ClusterLabel::Cluster(id);
        }
        ClusterLabel::Unresolved
    }
}

/// Label every row of one name group, in the order given.
pub fn cluster_group<'a>(rows: impl IntoIterator<Item = Signals<'a>>) -> Vec<ClusterLabel> {
    let mut state = GroupState::new();
    rows.into_iter().map(|signals| state.assign(signals)).collect()
}
