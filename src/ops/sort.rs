use std::cmp::Ordering;

use crate::model::contract::ContractRecord;
use crate::model::store::{SortKey, SortOrder};

/// Combine a primary comparison with the title tie-break.
///
/// The direction only flips the primary comparison; titles always break
/// ties in ascending order.
fn primary_then_title(order: SortOrder, primary: Ordering, a: &ContractRecord, b: &ContractRecord) -> Ordering {
    match primary {
        Ordering::Equal => a.title().cmp(b.title()),
        ord if order.is_ascending() => ord,
        ord => ord.reverse(),
    }
}

/// Primary comparison for every key except `Default`
fn primary(key: SortKey, a: &ContractRecord, b: &ContractRecord) -> Ordering {
    match key {
        SortKey::Default => Ordering::Equal,
        SortKey::Expiration => a.duration.total_cmp(&b.duration),
        SortKey::Acceptance => a.contract.date_accepted.total_cmp(&b.contract.date_accepted),
        SortKey::Difficulty => a.contract.prestige.cmp(&b.contract.prestige),
        SortKey::Reward => a.total_reward.total_cmp(&b.total_reward),
        SortKey::Type => a.contract.contract_type.cmp(&b.contract.contract_type),
    }
}

/// Reorder `records` in place by `key`.
///
/// `Default` leaves the input order alone. `Type` additionally runs
/// [`reorder_altitude_envelopes`] over the type-sorted result.
pub fn sort_records(records: &mut [ContractRecord], key: SortKey, order: SortOrder) {
    if key == SortKey::Default {
        return;
    }
    tracing::debug!(count = records.len(), %key, ?order, "sorting contracts");
    records.sort_by(|a, b| primary_then_title(order, primary(key, a, b), a, b));
    if key == SortKey::Type {
        reorder_altitude_envelopes(records, order);
    }
}

/// Owned convenience wrapper around [`sort_records`]
pub fn sorted(mut records: Vec<ContractRecord>, key: SortKey, order: SortOrder) -> Vec<ContractRecord> {
    sort_records(&mut records, key, order);
    records
}

/// Re-sort the contracts that carry an altitude-envelope goal by that
/// goal's minimum altitude, writing them back into the slots they already
/// occupy. Every other position is left untouched.
///
/// A flagged contract whose envelope has no minimum altitude is left where
/// it is and takes no part in the re-sort.
pub fn reorder_altitude_envelopes(records: &mut [ContractRecord], order: SortOrder) {
    let mut slots: Vec<(usize, f64)> = Vec::new();
    for (pos, record) in records.iter().enumerate() {
        if !record.has_altitude_envelope() {
            continue;
        }
        match record.contract.envelope_min_altitude() {
            Some(alt) => slots.push((pos, alt)),
            None => tracing::warn!(
                id = %record.id(),
                title = record.title(),
                "altitude envelope has no minimum altitude; leaving contract in place"
            ),
        }
    }

    if slots.len() < 2 {
        return;
    }
    tracing::debug!(count = slots.len(), "sorting by altitude envelope");

    let mut extracted: Vec<(f64, ContractRecord)> = slots
        .iter()
        .map(|&(pos, alt)| (alt, records[pos].clone()))
        .collect();
    extracted.sort_by(|(alt_a, a), (alt_b, b)| primary_then_title(order, alt_a.total_cmp(alt_b), a, b));

    for (&(pos, _), (_, record)) in slots.iter().zip(extracted) {
        records[pos] = record;
    }
}
