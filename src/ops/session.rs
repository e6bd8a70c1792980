use std::collections::BTreeMap;

use crate::model::config::{CalendarKind, WindowConfig};
use crate::model::contract::ContractRecord;
use crate::model::host::{ContractId, HostContract, HostSnapshot};
use crate::model::parameter::ParameterNode;
use crate::model::store::{
    ContextSettings, ContractStore, Partition, PartitionKind, PresentationContext, SortKey,
};
use crate::ops::refresh::refresh_partition;
use crate::ops::visibility::{self, VisibilityChange};

/// Population state of the lists for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Host data not seen yet
    NotLoaded,
    /// Host data seen; waiting `ticks` of the settle delay
    Loading { ticks: u32 },
    /// Lists populated. Terminal for the session.
    Loaded,
}

/// Something the host reports
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// The host finished loading its contracts
    ContractsLoaded,
    /// The player accepted a new contract
    ContractAccepted(HostContract),
    /// One frame update; drives the settle delay
    FrameTick,
    /// The fixed-interval refresh timer fired
    TimerTick,
}

/// Something the player asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetSortKey(SortKey),
    ToggleOrder,
    /// Switch between the primary and hidden views
    ToggleView,
    SetHidden { id: ContractId, hidden: bool },
    /// Discard both lists and classify the host's active contracts again
    Rebuild,
    /// Show or collapse a contract's goal tree
    ToggleExpanded(ContractId),
    /// Show or collapse a goal's note. `path` holds child indices from the
    /// contract's root goals down to the node.
    ToggleNote { id: ContractId, path: Vec<usize> },
}

/// What a command did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// Not meaningful before the lists are loaded; nothing changed
    Deferred,
    Visibility(VisibilityChange),
    /// The id (or goal path) is not in either list
    NotFound,
}

/// Identifier lists restored from a previous session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedLists {
    pub primary: Vec<ContractId>,
    pub hidden: Vec<ContractId>,
}

impl SavedLists {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.hidden.is_empty()
    }
}

/// Session tunables
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub settle_ticks: u32,
    pub calendar: CalendarKind,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            settle_ticks: 15,
            calendar: CalendarKind::default(),
        }
    }
}

impl From<&WindowConfig> for SessionOptions {
    fn from(config: &WindowConfig) -> Self {
        SessionOptions {
            settle_ticks: config.session.settle_ticks,
            calendar: config.calendar.kind,
        }
    }
}

/// Owner of the contract lists for one presentation context.
///
/// Every trigger (host event or player command) runs to completion:
/// mutate, refresh derived fields, sort, then expose the active view.
#[derive(Debug)]
pub struct Session {
    context: PresentationContext,
    options: SessionOptions,
    store: ContractStore,
    load: LoadState,
    saved: SavedLists,
    pending_accepts: Vec<HostContract>,
}

impl Session {
    pub fn new(context: PresentationContext, options: SessionOptions) -> Self {
        Session {
            context,
            options,
            store: ContractStore::default(),
            load: LoadState::NotLoaded,
            saved: SavedLists::default(),
            pending_accepts: Vec::new(),
        }
    }

    /// Seed the session with lists and settings from a previous run. The
    /// lists are adopted once the settle delay completes.
    pub fn restore(&mut self, saved: SavedLists, contexts: BTreeMap<PresentationContext, ContextSettings>) {
        self.saved = saved;
        self.store.contexts = contexts;
    }

    pub fn context(&self) -> PresentationContext {
        self.context
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn is_loaded(&self) -> bool {
        self.load == LoadState::Loaded
    }

    pub fn store(&self) -> &ContractStore {
        &self.store
    }

    pub fn settings(&self) -> ContextSettings {
        self.store.settings(self.context)
    }

    /// Which partition this context is showing
    pub fn view(&self) -> PartitionKind {
        self.settings().view
    }

    /// The list the presentation layer should render
    pub fn active_view(&self) -> &Partition {
        self.store.partition(self.view())
    }

    pub fn find(&self, id: &ContractId) -> Option<&ContractRecord> {
        self.store
            .primary
            .get(id)
            .or_else(|| self.store.hidden.get(id))
    }

    /// Identifier lists to persist. Before loading completes these are the
    /// lists that were restored, so saving early loses nothing.
    pub fn saved_lists(&self) -> SavedLists {
        if self.is_loaded() {
            SavedLists {
                primary: self.store.primary.ids(),
                hidden: self.store.hidden.ids(),
            }
        } else {
            self.saved.clone()
        }
    }

    pub fn contexts(&self) -> &BTreeMap<PresentationContext, ContextSettings> {
        &self.store.contexts
    }

    // -----------------------------------------------------------------------
    // Host events
    // -----------------------------------------------------------------------

    pub fn handle(&mut self, event: HostEvent, host: &HostSnapshot) {
        match event {
            HostEvent::ContractsLoaded => self.begin_loading(),
            HostEvent::FrameTick => self.frame_tick(host),
            HostEvent::TimerTick => self.timer_tick(host),
            HostEvent::ContractAccepted(contract) => self.contract_accepted(contract, host),
        }
    }

    /// Drive the session to `Loaded` against a host whose data is already
    /// complete.
    pub fn settle(&mut self, host: &HostSnapshot) {
        self.begin_loading();
        while !self.is_loaded() {
            self.frame_tick(host);
        }
    }

    fn begin_loading(&mut self) {
        if self.load == LoadState::NotLoaded {
            tracing::debug!(context = self.context.name(), "host contracts available; settling");
            self.load = LoadState::Loading { ticks: 0 };
        }
    }

    fn frame_tick(&mut self, host: &HostSnapshot) {
        match self.load {
            // The flight scene has its contracts by the first frame; other
            // scenes wait for the host's loaded signal.
            LoadState::NotLoaded if self.context == PresentationContext::Flight => self.begin_loading(),
            LoadState::NotLoaded | LoadState::Loaded => {}
            LoadState::Loading { ticks } if ticks < self.options.settle_ticks => {
                self.load = LoadState::Loading { ticks: ticks + 1 };
            }
            LoadState::Loading { .. } => self.finish_loading(host),
        }
    }

    fn finish_loading(&mut self, host: &HostSnapshot) {
        self.load = LoadState::Loaded;
        let saved = std::mem::take(&mut self.saved);
        self.populate(&saved, host);

        for contract in std::mem::take(&mut self.pending_accepts) {
            self.contract_accepted(contract, host);
        }
    }

    /// Replace the lists with ones another writer saved since this session
    /// loaded. Records are rebuilt from the host, so expand and note toggles
    /// reset. Before loading completes this is the same as `restore`.
    pub fn reload(
        &mut self,
        saved: SavedLists,
        contexts: BTreeMap<PresentationContext, ContextSettings>,
        host: &HostSnapshot,
    ) {
        if !self.is_loaded() {
            self.restore(saved, contexts);
            return;
        }
        self.store.clear();
        self.store.contexts = contexts;
        self.populate(&saved, host);
    }

    /// Adopt saved lists, or classify the host's active contracts when
    /// nothing was saved
    fn populate(&mut self, saved: &SavedLists, host: &HostSnapshot) {
        self.adopt(saved, host);

        if self.store.is_empty() {
            tracing::debug!("no saved contract lists; classifying host contracts");
            self.classify(host);
        } else {
            tracing::debug!(
                primary = self.store.primary.len(),
                hidden = self.store.hidden.len(),
                "contract lists already populated"
            );
            self.refresh(PartitionKind::Primary, host.universal_time);
            self.refresh(PartitionKind::Hidden, host.universal_time);
        }
    }

    /// Rebuild records for saved ids the host still knows about
    fn adopt(&mut self, saved: &SavedLists, host: &HostSnapshot) {
        for (ids, kind) in [
            (&saved.primary, PartitionKind::Primary),
            (&saved.hidden, PartitionKind::Hidden),
        ] {
            for id in ids {
                let Some(contract) = host.find(id) else {
                    tracing::warn!(%id, "saved contract no longer known to host; dropping");
                    continue;
                };
                if self.store.locate(id).is_some() {
                    tracing::debug!(%id, "saved contract listed twice; keeping first");
                    continue;
                }
                self.store
                    .partition_mut(kind)
                    .push(ContractRecord::new(contract.clone()));
            }
        }
    }

    /// Fill the primary list with every active host contract
    fn classify(&mut self, host: &HostSnapshot) {
        for contract in host.active() {
            if self.store.locate(&contract.id).is_none() {
                self.store
                    .primary
                    .push(ContractRecord::new(contract.clone()));
            }
        }
        tracing::debug!(count = self.store.primary.len(), "contracts added to primary list");
        self.refresh(PartitionKind::Primary, host.universal_time);
    }

    fn timer_tick(&mut self, host: &HostSnapshot) {
        if !self.is_loaded() || self.active_view().is_empty() {
            return;
        }
        self.sync(host);
        self.refresh(self.view(), host.universal_time);
    }

    fn contract_accepted(&mut self, contract: HostContract, host: &HostSnapshot) {
        if !self.is_loaded() {
            self.pending_accepts.push(contract);
            return;
        }
        if self.store.locate(&contract.id).is_some() {
            tracing::debug!(id = %contract.id, "accepted contract already listed");
            return;
        }
        tracing::debug!(id = %contract.id, "adding new contract to primary list");
        self.store.primary.push(ContractRecord::new(contract));
        self.refresh(PartitionKind::Primary, host.universal_time);
    }

    /// Mirror the host's latest data into every record it still knows
    fn sync(&mut self, host: &HostSnapshot) {
        for record in self.store.primary.iter_mut().chain(self.store.hidden.iter_mut()) {
            if let Some(latest) = host.find(record.id()) {
                record.sync(latest);
            }
        }
    }

    fn refresh(&mut self, kind: PartitionKind, now: f64) {
        let settings = self.settings();
        let calendar = self.options.calendar;
        refresh_partition(self.store.partition_mut(kind), now, settings, calendar);
    }

    // -----------------------------------------------------------------------
    // Player commands
    // -----------------------------------------------------------------------

    pub fn apply(&mut self, command: Command, host: &HostSnapshot) -> CommandOutcome {
        let now = host.universal_time;
        match command {
            Command::SetSortKey(key) => {
                self.store.settings_mut(self.context).sort_key = key;
                self.sync(host);
                self.refresh(self.view(), now);
                CommandOutcome::Applied
            }
            Command::ToggleOrder => {
                let settings = self.store.settings_mut(self.context);
                settings.order = settings.order.toggled();
                self.sync(host);
                self.refresh(self.view(), now);
                CommandOutcome::Applied
            }
            Command::ToggleView => {
                let settings = self.store.settings_mut(self.context);
                settings.view = settings.view.other();
                self.sync(host);
                self.refresh(self.view(), now);
                CommandOutcome::Applied
            }
            Command::SetHidden { id, hidden } => {
                self.sync(host);
                let change = visibility::set_hidden(
                    &mut self.store,
                    self.context,
                    &id,
                    hidden,
                    now,
                    self.options.calendar,
                );
                CommandOutcome::Visibility(change)
            }
            Command::Rebuild => {
                if !self.is_loaded() {
                    tracing::debug!("rebuild requested before lists loaded; ignoring");
                    return CommandOutcome::Deferred;
                }
                tracing::info!("rebuilding contract lists");
                self.store.clear();
                self.store.settings_mut(self.context).view = PartitionKind::Primary;
                self.classify(host);
                CommandOutcome::Applied
            }
            Command::ToggleExpanded(id) => match self.find_mut(&id) {
                Some(record) => {
                    record.toggle_expanded();
                    CommandOutcome::Applied
                }
                None => CommandOutcome::NotFound,
            },
            Command::ToggleNote { id, path } => {
                let node = self
                    .find_mut(&id)
                    .and_then(|record| node_at(&mut record.parameters, &path));
                match node {
                    Some(node) => {
                        node.toggle_note();
                        CommandOutcome::Applied
                    }
                    None => CommandOutcome::NotFound,
                }
            }
        }
    }

    fn find_mut(&mut self, id: &ContractId) -> Option<&mut ContractRecord> {
        let kind = self.store.locate(id)?;
        self.store.partition_mut(kind).get_mut(id)
    }
}

fn node_at<'a>(nodes: &'a mut [ParameterNode], path: &[usize]) -> Option<&'a mut ParameterNode> {
    let (first, rest) = path.split_first()?;
    let node = nodes.get_mut(*first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        node_at(&mut node.children, rest)
    }
}
