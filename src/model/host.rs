use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable unique identifier the host assigns to a contract
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(pub String);

impl ContractId {
    pub fn new(id: impl Into<String>) -> Self {
        ContractId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContractId {
    fn from(s: &str) -> Self {
        ContractId(s.to_string())
    }
}

/// Lifecycle state of a host contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractState {
    Active,
    Completed,
    Cancelled,
    DeadlineExpired,
    Failed,
    Withdrawn,
}

impl ContractState {
    pub fn label(self) -> &'static str {
        match self {
            ContractState::Active => "active",
            ContractState::Completed => "completed",
            ContractState::Cancelled => "cancelled",
            ContractState::DeadlineExpired => "deadline_expired",
            ContractState::Failed => "failed",
            ContractState::Withdrawn => "withdrawn",
        }
    }
}

/// Completion state of a single goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterState {
    #[default]
    Incomplete,
    Complete,
    Failed,
}

/// Difficulty tier of a contract. Ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prestige {
    #[default]
    Trivial,
    Significant,
    Exceptional,
}

/// Reward and penalty amounts attached to a contract or a goal
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    pub funds_completion: f64,
    pub funds_failure: f64,
    pub reputation_completion: f64,
    pub reputation_failure: f64,
    pub science_completion: f64,
}

impl Rewards {
    /// Sum of the positive completion rewards
    pub fn total_positive(&self) -> f64 {
        [
            self.funds_completion,
            self.reputation_completion,
            self.science_completion,
        ]
        .into_iter()
        .filter(|v| *v > 0.0)
        .sum()
    }
}

/// The goal subtype, as far as this crate cares about it.
///
/// Only the altitude envelope carries data that is ever consulted
/// (its minimum altitude drives the nested ordering of Type sorts).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    #[default]
    Generic,
    AltitudeEnvelope {
        #[serde(default)]
        min_altitude: Option<f64>,
        #[serde(default)]
        max_altitude: Option<f64>,
    },
}

/// One goal node as the host reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostParameter {
    pub title: String,
    #[serde(default)]
    pub state: ParameterState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub goal: GoalKind,
    #[serde(default)]
    pub rewards: Rewards,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HostParameter>,
}

impl HostParameter {
    pub fn new(title: impl Into<String>) -> Self {
        HostParameter {
            title: title.into(),
            state: ParameterState::Incomplete,
            notes: None,
            goal: GoalKind::Generic,
            rewards: Rewards::default(),
            children: Vec::new(),
        }
    }

    pub fn is_altitude_envelope(&self) -> bool {
        matches!(self.goal, GoalKind::AltitudeEnvelope { .. })
    }
}

/// A contract as the host reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostContract {
    pub id: ContractId,
    pub title: String,
    pub state: ContractState,
    /// Type classifier, e.g. `PartTest` or `SurveyContract`
    pub contract_type: String,
    #[serde(default)]
    pub prestige: Prestige,
    #[serde(default)]
    pub date_accepted: f64,
    /// Universal time of the deadline; `<= 0` means no deadline
    #[serde(default)]
    pub date_deadline: f64,
    #[serde(default)]
    pub rewards: Rewards,
    #[serde(default)]
    pub parameters: Vec<HostParameter>,
}

impl HostContract {
    /// A new active contract with no deadline, rewards or goals
    pub fn new(id: impl Into<String>, title: impl Into<String>, contract_type: impl Into<String>) -> Self {
        HostContract {
            id: ContractId::new(id),
            title: title.into(),
            state: ContractState::Active,
            contract_type: contract_type.into(),
            prestige: Prestige::Trivial,
            date_accepted: 0.0,
            date_deadline: 0.0,
            rewards: Rewards::default(),
            parameters: Vec::new(),
        }
    }

    /// Depth-first walk of every goal in the tree
    pub fn all_parameters(&self) -> Vec<&HostParameter> {
        fn walk<'a>(params: &'a [HostParameter], out: &mut Vec<&'a HostParameter>) {
            for p in params {
                out.push(p);
                walk(&p.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.parameters, &mut out);
        out
    }

    /// Minimum altitude of the first altitude-envelope goal, if there is
    /// one and the host supplied the value.
    pub fn envelope_min_altitude(&self) -> Option<f64> {
        self.all_parameters()
            .into_iter()
            .find(|p| p.is_altitude_envelope())
            .and_then(|p| match p.goal {
                GoalKind::AltitudeEnvelope { min_altitude, .. } => min_altitude,
                GoalKind::Generic => None,
            })
    }
}

/// Read-only view of everything the host currently knows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// Current universal time in seconds
    #[serde(default)]
    pub universal_time: f64,
    #[serde(default)]
    pub contracts: Vec<HostContract>,
}

impl HostSnapshot {
    pub fn find(&self, id: &ContractId) -> Option<&HostContract> {
        self.contracts.iter().find(|c| &c.id == id)
    }

    pub fn active(&self) -> impl Iterator<Item = &HostContract> {
        self.contracts
            .iter()
            .filter(|c| c.state == ContractState::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_positive_ignores_negative_and_penalties() {
        let r = Rewards {
            funds_completion: 1000.0,
            funds_failure: 500.0,
            reputation_completion: -3.0,
            reputation_failure: 2.0,
            science_completion: 4.5,
        };
        assert_eq!(r.total_positive(), 1004.5);
    }

    #[test]
    fn envelope_min_altitude_finds_nested_goal() {
        let mut outer = HostParameter::new("Fly a plane");
        let mut inner = HostParameter::new("Reach altitude");
        inner.goal = GoalKind::AltitudeEnvelope {
            min_altitude: Some(12_000.0),
            max_altitude: Some(18_000.0),
        };
        outer.children.push(inner);

        let contract = HostContract {
            id: "c1".into(),
            title: "Test".into(),
            state: ContractState::Active,
            contract_type: "PartTest".into(),
            prestige: Prestige::Trivial,
            date_accepted: 0.0,
            date_deadline: 0.0,
            rewards: Rewards::default(),
            parameters: vec![HostParameter::new("Launch"), outer],
        };
        assert_eq!(contract.envelope_min_altitude(), Some(12_000.0));
        assert_eq!(contract.all_parameters().len(), 3);
    }

    #[test]
    fn envelope_without_value_yields_none() {
        let mut p = HostParameter::new("Reach altitude");
        p.goal = GoalKind::AltitudeEnvelope {
            min_altitude: None,
            max_altitude: None,
        };
        let contract = HostContract {
            id: "c1".into(),
            title: "Test".into(),
            state: ContractState::Active,
            contract_type: "PartTest".into(),
            prestige: Prestige::Trivial,
            date_accepted: 0.0,
            date_deadline: 0.0,
            rewards: Rewards::default(),
            parameters: vec![p],
        };
        assert!(contract.all_parameters()[0].is_altitude_envelope());
        assert_eq!(contract.envelope_min_altitude(), None);
    }

    #[test]
    fn goal_kind_deserializes_with_default() {
        let json = r#"{
            "title": "Reach altitude",
            "goal": { "altitude_envelope": { "min_altitude": 500.0 } }
        }"#;
        let p: HostParameter = serde_json::from_str(json).unwrap();
        assert_eq!(
            p.goal,
            GoalKind::AltitudeEnvelope {
                min_altitude: Some(500.0),
                max_altitude: None
            }
        );
        assert_eq!(p.state, ParameterState::Incomplete);

        let plain: HostParameter = serde_json::from_str(r#"{"title": "Orbit"}"#).unwrap();
        assert_eq!(plain.goal, GoalKind::Generic);
    }
}
