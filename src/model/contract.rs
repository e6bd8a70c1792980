use serde::Serialize;

use super::host::{ContractId, ContractState, HostContract};
use super::parameter::ParameterNode;

/// Countdown text shown when there is nothing to count down
pub const NO_COUNTDOWN: &str = "----";

/// A tracked contract: the host's data plus the materialized goal tree and
/// the cached fields the sort and display layers read.
///
/// The caches are only updated by the refresh engine
/// (`ops::refresh::refresh_records`), never on read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractRecord {
    pub contract: HostContract,
    pub parameters: Vec<ParameterNode>,
    /// Sum of the positive completion rewards
    pub total_reward: f64,
    /// Seconds until the deadline; 0 when not active, `f64::MAX` when
    /// there is no deadline
    pub duration: f64,
    /// Formatted countdown (e.g. `12d`)
    pub countdown: String,
    /// UI-only: parameter tree expanded
    #[serde(skip)]
    pub expanded: bool,
}

impl ContractRecord {
    pub fn new(contract: HostContract) -> Self {
        let parameters = ParameterNode::tree_from_host(&contract.parameters);
        let total_reward = contract.rewards.total_positive();
        ContractRecord {
            contract,
            parameters,
            total_reward,
            duration: 0.0,
            countdown: NO_COUNTDOWN.to_string(),
            expanded: false,
        }
    }

    pub fn id(&self) -> &ContractId {
        &self.contract.id
    }

    pub fn title(&self) -> &str {
        &self.contract.title
    }

    pub fn state(&self) -> ContractState {
        self.contract.state
    }

    /// Whether any goal in the tree is an altitude envelope
    pub fn has_altitude_envelope(&self) -> bool {
        self.parameters.iter().any(|p| p.contains_altitude_envelope())
    }

    /// Replace the host data with a newer copy of the same contract and
    /// mirror goal states into the existing tree. UI toggles survive.
    pub fn sync(&mut self, latest: &HostContract) {
        debug_assert_eq!(&latest.id, self.id());
        for (node, host) in self.parameters.iter_mut().zip(&latest.parameters) {
            node.mirror(host);
        }
        self.contract = latest.clone();
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }
}
