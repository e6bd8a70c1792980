use crate::model::config::CalendarKind;
use crate::model::host::ContractId;
use crate::model::store::{ContractStore, PartitionKind, PresentationContext};
use crate::ops::refresh::refresh_partition;

/// Result of a hide/unhide request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    /// The record left `from` and is now in `to`
    Moved { from: PartitionKind, to: PartitionKind },
    /// The record was already in the requested partition
    Unchanged(PartitionKind),
    /// No partition holds this id
    NotFound,
}

/// Move `id` into the hidden partition (`hidden = true`) or back to the
/// primary one, then refresh both partitions with `context`'s settings.
///
/// The target is checked for the id before inserting, so a repeated
/// request never produces a duplicate; the source copy is always removed.
pub fn set_hidden(
    store: &mut ContractStore,
    context: PresentationContext,
    id: &ContractId,
    hidden: bool,
    now: f64,
    calendar: CalendarKind,
) -> VisibilityChange {
    let to = if hidden {
        PartitionKind::Hidden
    } else {
        PartitionKind::Primary
    };
    let from = to.other();

    let Some(record) = store.partition_mut(from).remove(id) else {
        return if store.partition(to).contains(id) {
            VisibilityChange::Unchanged(to)
        } else {
            VisibilityChange::NotFound
        };
    };

    if !store.partition(to).contains(id) {
        store.partition_mut(to).push(record);
    } else {
        tracing::debug!(%id, "record already present in target partition; dropping duplicate");
    }

    let settings = store.settings(context);
    refresh_partition(store.partition_mut(from), now, settings, calendar);
    refresh_partition(store.partition_mut(to), now, settings, calendar);
    tracing::debug!(%id, ?from, ?to, "moved contract");

    VisibilityChange::Moved { from, to }
}
