use serde::Serialize;

use crate::model::contract::ContractRecord;
use crate::model::host::{ContractState, ParameterState, Prestige};
use crate::model::parameter::ParameterNode;
use crate::model::store::{PartitionKind, SortKey, SortOrder};
use crate::ops::display::{
    self, Currency, ParameterStyle, RewardLine, TitleStyle, Urgency,
};
use crate::ops::session::Session;
use crate::util::unicode::fit_to_width;

/// Title column width in text output
const TITLE_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ViewJson {
    pub context: String,
    pub view: PartitionKind,
    pub sort_key: SortKey,
    pub order: SortOrder,
    pub contracts: Vec<ContractJson>,
}

#[derive(Serialize)]
pub struct ContractJson {
    pub id: String,
    pub title: String,
    pub state: ContractState,
    pub contract_type: String,
    pub prestige: Prestige,
    pub style: TitleStyle,
    /// Seconds to deadline; absent when there is no deadline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub countdown: String,
    pub urgency: Urgency,
    pub total_reward: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rewards: Vec<RewardLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterJson>,
}

#[derive(Serialize)]
pub struct ParameterJson {
    pub title: String,
    pub state: ParameterState,
    pub depth: usize,
    pub style: ParameterStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rewards: Vec<RewardLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ParameterJson>,
}

/// Rendering knobs taken from the config
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub warning_threshold: f64,
    pub max_depth: usize,
    pub with_parameters: bool,
    pub with_notes: bool,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn contract_to_json(record: &ContractRecord, opts: &RenderOptions) -> ContractJson {
    let parameters = if opts.with_parameters {
        record
            .parameters
            .iter()
            .filter_map(|p| parameter_to_json(p, record.state(), opts))
            .collect()
    } else {
        Vec::new()
    };
    ContractJson {
        id: record.id().to_string(),
        title: record.title().to_string(),
        state: record.state(),
        contract_type: record.contract.contract_type.clone(),
        prestige: record.contract.prestige,
        style: display::title_style(record.state()),
        duration: (record.duration != f64::MAX).then_some(record.duration),
        countdown: record.countdown.clone(),
        urgency: display::urgency(record, opts.warning_threshold),
        total_reward: record.total_reward,
        rewards: display::reward_lines(&record.contract.rewards, record.state()),
        parameters,
    }
}

fn parameter_to_json(
    node: &ParameterNode,
    contract_state: ContractState,
    opts: &RenderOptions,
) -> Option<ParameterJson> {
    if node.depth > opts.max_depth {
        return None;
    }
    let note = (node.note_displayable() && opts.with_notes)
        .then(|| node.note.clone())
        .flatten();
    Some(ParameterJson {
        title: node.title.clone(),
        state: node.state,
        depth: node.depth,
        style: display::parameter_style(node),
        note,
        rewards: display::reward_lines(&node.rewards, contract_state),
        children: node
            .children
            .iter()
            .filter_map(|c| parameter_to_json(c, contract_state, opts))
            .collect(),
    })
}

pub fn view_to_json<'a>(
    session: &Session,
    records: impl IntoIterator<Item = &'a ContractRecord>,
    opts: &RenderOptions,
) -> ViewJson {
    let settings = session.settings();
    ViewJson {
        context: session.context().name().to_string(),
        view: settings.view,
        sort_key: settings.sort_key,
        order: settings.order,
        contracts: records
            .into_iter()
            .map(|r| contract_to_json(r, opts))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn state_char(style: TitleStyle) -> char {
    match style {
        TitleStyle::Active => ' ',
        TitleStyle::Completed => 'x',
        TitleStyle::Failed => '-',
    }
}

fn param_char(state: ParameterState) -> char {
    match state {
        ParameterState::Incomplete => ' ',
        ParameterState::Complete => 'x',
        ParameterState::Failed => '-',
    }
}

fn urgency_mark(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Good => "",
        Urgency::Warning => " !",
        Urgency::Finished => " \u{2717}",
    }
}

/// Whole-number amount with thousands separators, e.g. `12,000`
pub fn format_amount(amount: f64) -> String {
    let n = amount.abs().round() as u64;
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_rewards(lines: &[RewardLine]) -> String {
    lines
        .iter()
        .map(|l| {
            let sign = if l.amount < 0.0 { '-' } else { '+' };
            let unit = match l.currency {
                Currency::Funds => "f",
                Currency::Reputation => "rep",
                Currency::Science => "sci",
            };
            format!("{}{}{}", sign, format_amount(l.amount), unit)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Header line describing the view
pub fn format_view_header(session: &Session) -> String {
    let settings = session.settings();
    let list = match settings.view {
        PartitionKind::Primary => "Contracts",
        PartitionKind::Hidden => "Hidden contracts",
    };
    let arrow = if settings.order.is_ascending() { '\u{2191}' } else { '\u{2193}' };
    format!(
        "== {} ({}) \u{b7} sort: {} {} ==",
        list,
        session.context().name(),
        settings.sort_key,
        arrow
    )
}

/// One-line summary of a contract
pub fn format_contract_line(record: &ContractRecord, opts: &RenderOptions) -> String {
    let style = display::title_style(record.state());
    let rewards = display::reward_lines(&record.contract.rewards, record.state());
    let mut line = format!(
        "[{}] {}  {}  {:>7}{}",
        state_char(style),
        record.id(),
        fit_to_width(record.title(), TITLE_WIDTH),
        record.countdown,
        urgency_mark(display::urgency(record, opts.warning_threshold)),
    );
    if !rewards.is_empty() {
        line.push_str("  ");
        line.push_str(&format_rewards(&rewards));
    }
    line
}

/// Goal tree lines, indented under their contract
pub fn format_parameter_tree(record: &ContractRecord, opts: &RenderOptions) -> Vec<String> {
    let mut lines = Vec::new();
    for root in &record.parameters {
        for node in root.displayed(opts.max_depth) {
            let prefix = "  ".repeat(node.depth + 2);
            lines.push(format!("{}[{}] {}", prefix, param_char(node.state), node.title));
            if node.note_displayable()
                && opts.with_notes
                && let Some(note) = &node.note
            {
                for note_line in note.lines() {
                    lines.push(format!("{}    {}", prefix, note_line));
                }
            }
        }
    }
    lines
}

/// Full listing: header, then each contract (and its goals when requested)
pub fn format_view<'a>(
    session: &Session,
    records: impl IntoIterator<Item = &'a ContractRecord>,
    opts: &RenderOptions,
) -> Vec<String> {
    let mut lines = vec![format_view_header(session), String::new()];
    let mut any = false;
    for record in records {
        any = true;
        lines.push(format_contract_line(record, opts));
        if opts.with_parameters {
            lines.extend(format_parameter_tree(record, opts));
        }
    }
    if !any {
        lines.push("(no contracts)".to_string());
    }
    lines
}

/// Detailed view of a single contract
pub fn format_contract_detail(record: &ContractRecord, opts: &RenderOptions) -> Vec<String> {
    let mut lines = vec![format_contract_line(record, opts)];
    lines.push(format!("type: {}", record.contract.contract_type));
    lines.push(format!("state: {}", record.state().label()));
    lines.push(format!("prestige: {:?}", record.contract.prestige).to_lowercase());
    if !record.parameters.is_empty() {
        lines.push(String::new());
        lines.push("goals:".to_string());
        lines.extend(format_parameter_tree(record, opts));
    }
    lines
}
