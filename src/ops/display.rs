use serde::Serialize;

use crate::model::contract::ContractRecord;
use crate::model::host::{ContractState, ParameterState, Rewards};
use crate::model::parameter::ParameterNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Good,
    Warning,
    Finished,
}

/// Urgency of a record's countdown. `threshold` is in seconds.
pub fn urgency(record: &ContractRecord, threshold: f64) -> Urgency {
    if record.duration >= threshold {
        Urgency::Good
    } else if record.duration > 0.0 {
        Urgency::Warning
    } else if record.state() == ContractState::Completed {
        Urgency::Good
    } else {
        Urgency::Finished
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleStyle {
    Active,
    Completed,
    Failed,
}

pub fn title_style(state: ContractState) -> TitleStyle {
    match state {
        ContractState::Active => TitleStyle::Active,
        ContractState::Completed => TitleStyle::Completed,
        ContractState::Cancelled
        | ContractState::DeadlineExpired
        | ContractState::Failed
        | ContractState::Withdrawn => TitleStyle::Failed,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterStyle {
    Completed,
    Failed,
    /// Open top-level goal
    Text,
    /// Open nested goal
    Sub,
}

pub fn parameter_style(node: &ParameterNode) -> ParameterStyle {
    match node.state {
        ParameterState::Complete => ParameterStyle::Completed,
        ParameterState::Failed => ParameterStyle::Failed,
        ParameterState::Incomplete if node.depth == 0 => ParameterStyle::Text,
        ParameterState::Incomplete => ParameterStyle::Sub,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Funds,
    Reputation,
    Science,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RewardLine {
    pub currency: Currency,
    /// Positive for rewards, negative for penalties
    pub amount: f64,
}

fn pays_out(state: ContractState) -> bool {
    matches!(state, ContractState::Active | ContractState::Completed)
}

fn can_be_penalized(state: ContractState) -> bool {
    matches!(
        state,
        ContractState::Active
            | ContractState::Cancelled
            | ContractState::DeadlineExpired
            | ContractState::Failed
    )
}

/// Rewards still relevant to a contract in `state`: completion amounts
/// while it can pay out, failure amounts while it can be penalized.
pub fn reward_lines(rewards: &Rewards, state: ContractState) -> Vec<RewardLine> {
    let mut lines = Vec::new();
    let mut push = |currency, amount: f64, shown: bool, sign: f64| {
        if amount > 0.0 && shown {
            lines.push(RewardLine {
                currency,
                amount: amount * sign,
            });
        }
    };
    push(Currency::Funds, rewards.funds_completion, pays_out(state), 1.0);
    push(Currency::Funds, rewards.funds_failure, can_be_penalized(state), -1.0);
    push(Currency::Reputation, rewards.reputation_completion, pays_out(state), 1.0);
    push(Currency::Reputation, rewards.reputation_failure, can_be_penalized(state), -1.0);
    push(Currency::Science, rewards.science_completion, pays_out(state), 1.0);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::host::{HostContract, HostParameter};

    fn rewards() -> Rewards {
        Rewards {
            funds_completion: 1000.0,
            funds_failure: 200.0,
            reputation_completion: 5.0,
            reputation_failure: 0.0,
            science_completion: 2.0,
        }
    }

    #[test]
    fn active_contract_shows_rewards_and_penalties() {
        let lines = reward_lines(&rewards(), ContractState::Active);
        let amounts: Vec<f64> = lines.iter().map(|l| l.amount).collect();
        assert_eq!(amounts, vec![1000.0, -200.0, 5.0, 2.0]);
    }

    #[test]
    fn completed_contract_hides_penalties() {
        let lines = reward_lines(&rewards(), ContractState::Completed);
        assert!(lines.iter().all(|l| l.amount > 0.0));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn failed_contract_shows_only_penalties() {
        let lines = reward_lines(&rewards(), ContractState::Failed);
        assert_eq!(
            lines,
            vec![RewardLine {
                currency: Currency::Funds,
                amount: -200.0
            }]
        );
    }

    #[test]
    fn withdrawn_contract_shows_nothing() {
        assert!(reward_lines(&rewards(), ContractState::Withdrawn).is_empty());
    }

    #[test]
    fn urgency_thresholds() {
        let mut r = ContractRecord::new(HostContract::new("a", "A", "Generic"));
        r.duration = 3_000_000.0;
        assert_eq!(urgency(&r, 2_160_000.0), Urgency::Good);
        r.duration = 10.0;
        assert_eq!(urgency(&r, 2_160_000.0), Urgency::Warning);
        r.duration = 0.0;
        assert_eq!(urgency(&r, 2_160_000.0), Urgency::Finished);
        r.contract.state = ContractState::Completed;
        assert_eq!(urgency(&r, 2_160_000.0), Urgency::Good);
    }

    #[test]
    fn styles_follow_state() {
        assert_eq!(title_style(ContractState::DeadlineExpired), TitleStyle::Failed);
        assert_eq!(title_style(ContractState::Completed), TitleStyle::Completed);

        let mut host = HostParameter::new("root");
        host.children.push(HostParameter::new("child"));
        let node = ParameterNode::from_host(&host, 0);
        assert_eq!(parameter_style(&node), ParameterStyle::Text);
        assert_eq!(parameter_style(&node.children[0]), ParameterStyle::Sub);
    }
}
