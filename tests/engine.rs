//! Behavioural tests for the list engine, driven only through the public
//! API: sorting, refresh, visibility moves, and the session lifecycle.

use std::collections::BTreeMap;

use contracts_window::model::{
    CalendarKind, ContractRecord, ContractState, GoalKind, HostContract, HostParameter, HostSnapshot,
    NO_COUNTDOWN, PartitionKind, PresentationContext, Prestige, SortKey, SortOrder,
};
use contracts_window::ops::refresh::refresh_records;
use contracts_window::ops::session::{Command, CommandOutcome, HostEvent, Session, SessionOptions};
use contracts_window::ops::sort::sorted;
use contracts_window::ops::visibility::VisibilityChange;
use pretty_assertions::assert_eq;

const KEYS: [SortKey; 5] = [
    SortKey::Expiration,
    SortKey::Acceptance,
    SortKey::Difficulty,
    SortKey::Reward,
    SortKey::Type,
];

fn record(id: &str, title: &str) -> ContractRecord {
    ContractRecord::new(HostContract::new(id, title, "Generic"))
}

fn titles(records: &[ContractRecord]) -> Vec<&str> {
    records.iter().map(|r| r.title()).collect()
}

fn ids(records: &[ContractRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id().as_str()).collect()
}

/// Records whose every sortable field is identical
fn all_tied() -> Vec<ContractRecord> {
    ["Mun flyby", "Duna landing", "Kerbin orbit", "Eve probe"]
        .iter()
        .enumerate()
        .map(|(i, title)| record(&format!("t{}", i), title))
        .collect()
}

/// Records whose every sortable field is distinct, in the same order
fn all_distinct() -> Vec<ContractRecord> {
    let types = ["Alpha", "Bravo", "Charlie"];
    let prestige = [Prestige::Trivial, Prestige::Significant, Prestige::Exceptional];
    (0..3)
        .map(|i| {
            let mut c = HostContract::new(format!("d{}", i), format!("Title {}", 2 - i), types[i]);
            c.prestige = prestige[i];
            c.date_accepted = 100.0 * i as f64;
            let mut r = ContractRecord::new(c);
            r.duration = 1000.0 * (i + 1) as f64;
            r.total_reward = 10.0 * (i + 1) as f64;
            r
        })
        .collect()
}

fn envelope(title: &str, min_altitude: f64) -> HostParameter {
    let mut p = HostParameter::new(title);
    p.goal = GoalKind::AltitudeEnvelope {
        min_altitude: Some(min_altitude),
        max_altitude: None,
    };
    p
}

fn host(contracts: Vec<HostContract>) -> HostSnapshot {
    HostSnapshot {
        universal_time: 1000.0,
        contracts,
    }
}

fn settled(host: &HostSnapshot) -> Session {
    let mut s = Session::new(PresentationContext::Flight, SessionOptions::default());
    s.handle(HostEvent::ContractsLoaded, host);
    s.settle(host);
    s
}

fn partition_ids(s: &Session, kind: PartitionKind) -> Vec<String> {
    s.store()
        .partition(kind)
        .ids()
        .into_iter()
        .map(|id| id.0)
        .collect()
}

// ---------------------------------------------------------------------------
// Sort engine
// ---------------------------------------------------------------------------

#[test]
fn ties_break_by_ascending_title_in_both_directions() {
    for key in KEYS {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let out = sorted(all_tied(), key, order);
            assert_eq!(
                titles(&out),
                vec!["Duna landing", "Eve probe", "Kerbin orbit", "Mun flyby"],
                "key {key} order {order:?}"
            );
        }
    }
}

#[test]
fn default_key_keeps_input_order() {
    let out = sorted(all_tied(), SortKey::Default, SortOrder::Descending);
    assert_eq!(ids(&out), vec!["t0", "t1", "t2", "t3"]);
}

#[test]
fn sorting_is_idempotent() {
    let mut input = all_distinct();
    input.extend(all_tied());
    input.reverse();
    for key in KEYS {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let once = sorted(input.clone(), key, order);
            let twice = sorted(once.clone(), key, order);
            assert_eq!(ids(&once), ids(&twice), "key {key} order {order:?}");
        }
    }
}

#[test]
fn descending_is_ascending_reversed_when_keys_differ() {
    for key in KEYS {
        let asc = sorted(all_distinct(), key, SortOrder::Ascending);
        let mut reversed: Vec<&str> = ids(&asc);
        reversed.reverse();
        let desc = sorted(all_distinct(), key, SortOrder::Descending);
        assert_eq!(ids(&desc), reversed, "key {key}");
    }
}

#[test]
fn descending_keeps_title_order_within_a_tie_group() {
    let mut input = all_tied();
    let mut late = ContractRecord::new(HostContract::new("z", "Aardvark", "Generic"));
    late.total_reward = 99.0;
    input.push(late);

    let desc = sorted(input, SortKey::Reward, SortOrder::Descending);
    assert_eq!(
        titles(&desc),
        vec!["Aardvark", "Duna landing", "Eve probe", "Kerbin orbit", "Mun flyby"]
    );
}

#[test]
fn altitude_envelope_pass_reorders_only_flagged_slots() {
    // Same type for all three: the type sort orders by title alone
    let mut high = HostContract::new("high", "A high test", "PartTest");
    high.parameters.push(envelope("Between 500m and 900m", 500.0));
    let plain = HostContract::new("plain", "B plain test", "PartTest");
    let mut low = HostContract::new("low", "C low test", "PartTest");
    let mut wrapper = HostParameter::new("Test it");
    wrapper.children.push(envelope("Between 100m and 300m", 100.0));
    low.parameters.push(wrapper);

    let input: Vec<ContractRecord> = [low, plain, high].into_iter().map(ContractRecord::new).collect();

    let asc = sorted(input.clone(), SortKey::Type, SortOrder::Ascending);
    assert_eq!(ids(&asc), vec!["low", "plain", "high"]);

    let desc = sorted(input, SortKey::Type, SortOrder::Descending);
    assert_eq!(ids(&desc), vec!["high", "plain", "low"]);
}

#[test]
fn envelope_pass_leaves_other_types_in_place() {
    let mut a = HostContract::new("a", "Zed", "Aerial");
    a.parameters.push(envelope("Fly high", 800.0));
    let b = HostContract::new("b", "Any", "Base");
    let mut c = HostContract::new("c", "Yak", "Collect");
    c.parameters.push(envelope("Fly low", 50.0));

    let out = sorted(
        [c, b, a].into_iter().map(ContractRecord::new).collect(),
        SortKey::Type,
        SortOrder::Ascending,
    );
    // Slots 0 and 2 hold the envelope contracts, swapped by altitude
    assert_eq!(ids(&out), vec!["c", "b", "a"]);
}

// ---------------------------------------------------------------------------
// Refresh engine
// ---------------------------------------------------------------------------

#[test]
fn refresh_resets_finished_contracts() {
    let mut c = HostContract::new("done", "Done", "Generic");
    c.state = ContractState::Completed;
    c.date_deadline = 50_000.0;
    let mut r = ContractRecord::new(c);
    r.duration = 12_345.0;
    r.countdown = "3d".into();

    let mut records = vec![r];
    refresh_records(&mut records, 1000.0, SortKey::Default, SortOrder::Ascending, CalendarKind::Kerbin);
    assert_eq!(records[0].duration, 0.0);
    assert_eq!(records[0].countdown, NO_COUNTDOWN);
}

#[test]
fn refresh_handles_deadlines() {
    let mut open = HostContract::new("open", "Open", "Generic");
    open.date_deadline = 0.0;
    let mut soon = HostContract::new("soon", "Soon", "Generic");
    soon.date_deadline = 1000.0 + 3.0 * 21_600.0;
    let mut late = HostContract::new("late", "Late", "Generic");
    late.date_deadline = 900.0;

    let mut records: Vec<ContractRecord> = [open, soon, late].into_iter().map(ContractRecord::new).collect();
    refresh_records(&mut records, 1000.0, SortKey::Expiration, SortOrder::Ascending, CalendarKind::Kerbin);

    assert_eq!(ids(&records), vec!["late", "soon", "open"]);
    assert_eq!(records[0].duration, -100.0);
    assert_eq!(records[0].countdown, NO_COUNTDOWN);
    assert_eq!(records[1].countdown, "3d");
    assert_eq!(records[2].duration, f64::MAX);
    assert_eq!(records[2].countdown, NO_COUNTDOWN);
}

// ---------------------------------------------------------------------------
// Session: classification, visibility, accepts
// ---------------------------------------------------------------------------

#[test]
fn classification_fills_primary_from_active_contracts() {
    let h = host(vec![
        HostContract::new("b", "Beta", "Generic"),
        HostContract::new("a", "Alpha", "Generic"),
    ]);
    let s = settled(&h);
    assert_eq!(partition_ids(&s, PartitionKind::Primary), vec!["b", "a"]);
    assert!(s.store().hidden.is_empty());
}

#[test]
fn hide_then_unhide_restores_exactly_once() {
    let h = host(vec![
        HostContract::new("a", "Alpha", "Generic"),
        HostContract::new("b", "Beta", "Generic"),
    ]);
    let mut s = settled(&h);

    let hide = s.apply(Command::SetHidden { id: "a".into(), hidden: true }, &h);
    assert_eq!(
        hide,
        CommandOutcome::Visibility(VisibilityChange::Moved {
            from: PartitionKind::Primary,
            to: PartitionKind::Hidden,
        })
    );
    let again = s.apply(Command::SetHidden { id: "a".into(), hidden: true }, &h);
    assert_eq!(again, CommandOutcome::Visibility(VisibilityChange::Unchanged(PartitionKind::Hidden)));

    s.apply(Command::SetHidden { id: "a".into(), hidden: false }, &h);
    assert_eq!(partition_ids(&s, PartitionKind::Primary), vec!["b", "a"]);
    assert!(s.store().hidden.is_empty());

    let missing = s.apply(Command::SetHidden { id: "zz".into(), hidden: true }, &h);
    assert_eq!(missing, CommandOutcome::Visibility(VisibilityChange::NotFound));
}

#[test]
fn accepted_contract_leaves_hidden_untouched() {
    let mut h = host(vec![
        HostContract::new("a", "Alpha", "Generic"),
        HostContract::new("b", "Beta", "Generic"),
    ]);
    let mut s = settled(&h);
    s.apply(Command::SetHidden { id: "b".into(), hidden: true }, &h);
    let hidden_before = serde_json::to_string(&s.store().hidden.iter().collect::<Vec<_>>()).unwrap();

    let new = HostContract::new("n", "New", "Generic");
    h.contracts.push(new.clone());
    s.handle(HostEvent::ContractAccepted(new), &h);

    assert_eq!(partition_ids(&s, PartitionKind::Primary), vec!["a", "n"]);
    let hidden_after = serde_json::to_string(&s.store().hidden.iter().collect::<Vec<_>>()).unwrap();
    assert_eq!(hidden_after, hidden_before);
}

#[test]
fn restored_session_keeps_settings_and_lists() {
    let h = host(vec![
        HostContract::new("a", "Alpha", "Generic"),
        HostContract::new("b", "Beta", "Generic"),
        HostContract::new("c", "Gamma", "Generic"),
    ]);
    let mut first = settled(&h);
    first.apply(Command::SetSortKey(SortKey::Type), &h);
    first.apply(Command::ToggleOrder, &h);
    first.apply(Command::SetHidden { id: "b".into(), hidden: true }, &h);

    let mut second = Session::new(PresentationContext::Flight, SessionOptions::default());
    second.restore(first.saved_lists(), first.contexts().clone());
    second.settle(&h);

    assert_eq!(partition_ids(&second, PartitionKind::Primary), vec!["a", "c"]);
    assert_eq!(partition_ids(&second, PartitionKind::Hidden), vec!["b"]);
    assert_eq!(second.settings().order, SortOrder::Descending);
}

#[test]
fn empty_restore_falls_back_to_classification() {
    let h = host(vec![HostContract::new("a", "Alpha", "Generic")]);
    let mut s = Session::new(PresentationContext::Editor, SessionOptions::default());
    s.restore(Default::default(), BTreeMap::new());
    s.settle(&h);
    assert_eq!(partition_ids(&s, PartitionKind::Primary), vec!["a"]);
}
