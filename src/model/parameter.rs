use serde::{Deserialize, Serialize};

use super::host::{HostParameter, ParameterState, Rewards};

/// Deepest level rendered by default. The tree itself keeps every level.
pub const MAX_DISPLAY_DEPTH: usize = 4;

/// One node of a contract's goal tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterNode {
    pub title: String,
    pub state: ParameterState,
    /// Optional note text (absent or empty means no note)
    pub note: Option<String>,
    /// Nesting depth (0 = top-level)
    pub depth: usize,
    /// Whether this goal is an altitude envelope
    pub altitude_envelope: bool,
    pub rewards: Rewards,
    pub children: Vec<ParameterNode>,
    /// UI-only: note expanded
    #[serde(skip)]
    pub note_visible: bool,
}

impl ParameterNode {
    /// Materialize a host goal and all its descendants, starting at `depth`.
    pub fn from_host(param: &HostParameter, depth: usize) -> Self {
        ParameterNode {
            title: param.title.clone(),
            state: param.state,
            note: param.notes.clone(),
            depth,
            altitude_envelope: param.is_altitude_envelope(),
            rewards: param.rewards,
            children: param
                .children
                .iter()
                .map(|c| ParameterNode::from_host(c, depth + 1))
                .collect(),
            note_visible: false,
        }
    }

    /// Build the root-level nodes of a contract's goal tree
    pub fn tree_from_host(params: &[HostParameter]) -> Vec<ParameterNode> {
        params.iter().map(|p| ParameterNode::from_host(p, 0)).collect()
    }

    /// True if this node or any descendant is an altitude envelope
    pub fn contains_altitude_envelope(&self) -> bool {
        self.altitude_envelope || self.children.iter().any(|c| c.contains_altitude_envelope())
    }

    pub fn has_note(&self) -> bool {
        self.note.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Notes are only offered while the goal is still open
    pub fn note_displayable(&self) -> bool {
        self.state == ParameterState::Incomplete && self.has_note()
    }

    pub fn toggle_note(&mut self) {
        self.note_visible = !self.note_visible;
    }

    /// Copy completion state and notes from the host's current version of
    /// this goal. The shape of the tree is fixed at construction; extra or
    /// missing host children are ignored.
    pub fn mirror(&mut self, param: &HostParameter) {
        self.state = param.state;
        self.note = param.notes.clone();
        self.rewards = param.rewards;
        for (node, host) in self.children.iter_mut().zip(&param.children) {
            node.mirror(host);
        }
    }

    /// Depth-first walk of this node and its descendants, stopping below
    /// `max_depth`.
    pub fn displayed(&self, max_depth: usize) -> Vec<&ParameterNode> {
        let mut out = Vec::new();
        self.collect_displayed(max_depth, &mut out);
        out
    }

    fn collect_displayed<'a>(&'a self, max_depth: usize, out: &mut Vec<&'a ParameterNode>) {
        if self.depth > max_depth {
            return;
        }
        out.push(self);
        for child in &self.children {
            child.collect_displayed(max_depth, out);
        }
    }
}
