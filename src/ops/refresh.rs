use crate::model::config::CalendarKind;
use crate::model::contract::{ContractRecord, NO_COUNTDOWN};
use crate::model::host::ContractState;
use crate::model::store::{ContextSettings, Partition, SortKey, SortOrder};
use crate::ops::sort::sort_records;

/// Format a remaining duration (seconds) as a short countdown in the
/// given calendar: `1y 12d`, `12d`, `5h` or `42m`. Non-positive durations
/// have nothing to count down.
pub fn format_countdown(duration: f64, calendar: CalendarKind) -> String {
    if duration <= 0.0 || !duration.is_finite() {
        return NO_COUNTDOWN.to_string();
    }
    let day = calendar.day_seconds();
    let year = day * calendar.year_days();

    let years = (duration / year).floor();
    let rem = duration - years * year;
    let days = (rem / day).floor();
    let rem = rem - days * day;
    let hours = (rem / 3600.0).floor();
    let minutes = ((rem - hours * 3600.0) / 60.0).floor();

    if years >= 1.0 {
        format!("{}y {}d", years as u64, days as u64)
    } else if days >= 1.0 {
        format!("{}d", days as u64)
    } else if hours >= 1.0 {
        format!("{}h", hours as u64)
    } else {
        format!("{}m", minutes as u64)
    }
}

/// Recompute the derived fields of one record at universal time `now`.
pub fn update_caches(record: &mut ContractRecord, now: f64, calendar: CalendarKind) {
    record.total_reward = record.contract.rewards.total_positive();

    if record.state() != ContractState::Active {
        record.duration = 0.0;
        record.countdown = NO_COUNTDOWN.to_string();
        return;
    }
    if record.contract.date_deadline <= 0.0 {
        record.duration = f64::MAX;
        record.countdown = NO_COUNTDOWN.to_string();
        return;
    }
    // Negative until the host moves the contract to DeadlineExpired
    record.duration = record.contract.date_deadline - now;
    record.countdown = format_countdown(record.duration, calendar);
}

/// Update every record's derived fields, then re-sort.
pub fn refresh_records(
    records: &mut [ContractRecord],
    now: f64,
    key: SortKey,
    order: SortOrder,
    calendar: CalendarKind,
) {
    for record in records.iter_mut() {
        update_caches(record, now, calendar);
    }
    sort_records(records, key, order);
}

/// Refresh a partition in place and store the re-sorted order as its
/// canonical order.
pub fn refresh_partition(
    partition: &mut Partition,
    now: f64,
    settings: ContextSettings,
    calendar: CalendarKind,
) {
    let mut records = partition.take();
    refresh_records(&mut records, now, settings.sort_key, settings.order, calendar);
    partition.replace(records);
}
