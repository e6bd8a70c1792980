use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::snapshot_io;
use crate::io::state::{self, PersistedState};
use crate::model::config::WindowConfig;
use crate::model::contract::ContractRecord;
use crate::model::host::{ContractId, ContractState, HostSnapshot};
use crate::model::store::{PartitionKind, PresentationContext, SortKey};
use crate::ops::session::{Command, CommandOutcome, HostEvent, Session, SessionOptions};
use crate::ops::visibility::VisibilityChange;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    // Write commands hold the state lock from before the read until after
    // the save. Watch takes it per cycle instead.
    let locked = !matches!(
        cli.command,
        Commands::List(_) | Commands::Show(_) | Commands::Watch(_)
    );
    let mut window = Window::open(cli.dir.as_deref(), cli.context.as_deref(), locked)?;

    match cli.command {
        // Read commands
        Commands::List(args) => cmd_list(&window, args, json),
        Commands::Show(args) => cmd_show(&window, args, json),

        // Write commands
        Commands::Sort(args) => cmd_sort(&mut window, args, json),
        Commands::Order => cmd_view_change(&mut window, Command::ToggleOrder, json),
        Commands::ToggleHidden => cmd_view_change(&mut window, Command::ToggleView, json),
        Commands::Hide(args) => cmd_set_hidden(&mut window, args, true, json),
        Commands::Unhide(args) => cmd_set_hidden(&mut window, args, false, json),
        Commands::Accept(args) => cmd_accept(&mut window, args, json),
        Commands::Rebuild => cmd_rebuild(&mut window, json),

        Commands::Watch(args) => cmd_watch(&mut window, args, json),
    }
}

/// Working directory for a `-C` override (or the current directory)
pub fn resolve_dir(dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match dir {
        Some(d) => Ok(std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

// ---------------------------------------------------------------------------
// Window: config + snapshot + restored session for one invocation
// ---------------------------------------------------------------------------

struct Window {
    dir: PathBuf,
    config: WindowConfig,
    host: HostSnapshot,
    session: Session,
    _lock: Option<FileLock>,
}

impl Window {
    fn open(
        dir: Option<&str>,
        context: Option<&str>,
        locked: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = resolve_dir(dir)?;
        let config = config_io::read_config(&dir)?;
        let context = match context {
            Some(name) => name.parse::<PresentationContext>()?,
            None => config.session.context,
        };

        let lock = if locked {
            Some(FileLock::acquire_default(&dir.join(&config.paths.state))?)
        } else {
            None
        };

        let host = snapshot_io::read_snapshot(&dir.join(&config.paths.snapshot))?;
        let mut session = Session::new(context, SessionOptions::from(&config));
        if let Some(saved) = state::read_state(&dir.join(&config.paths.state)) {
            let (lists, contexts) = saved.into_parts();
            session.restore(lists, contexts);
        }
        session.settle(&host);

        Ok(Window {
            dir,
            config,
            host,
            session,
            _lock: lock,
        })
    }

    fn state_path(&self) -> PathBuf {
        self.dir.join(&self.config.paths.state)
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join(&self.config.paths.snapshot)
    }

    /// Callers hold the state lock.
    fn save(&self) -> CmdResult {
        state::write_state(&self.state_path(), &PersistedState::capture(&self.session))?;
        Ok(())
    }

    /// Pick up lists and settings another `cw` process saved. Callers hold
    /// the state lock.
    fn reload_state(&mut self) {
        if let Some(saved) = state::read_state(&self.state_path()) {
            let (lists, contexts) = saved.into_parts();
            self.session.reload(lists, contexts, &self.host);
        }
    }

    fn apply(&mut self, command: Command) -> CommandOutcome {
        self.session.apply(command, &self.host)
    }

    fn render_options(&self, with_parameters: bool, with_notes: bool) -> RenderOptions {
        RenderOptions {
            warning_threshold: self.config.display.warning_threshold_secs,
            max_depth: self.config.display.max_parameter_depth,
            with_parameters,
            with_notes,
        }
    }

    fn print_view(&self, json: bool, opts: &RenderOptions) -> CmdResult {
        print_records(&self.session, self.session.active_view().iter(), json, opts)
    }
}

fn print_records<'a>(
    session: &Session,
    records: impl IntoIterator<Item = &'a ContractRecord>,
    json: bool,
    opts: &RenderOptions,
) -> CmdResult {
    if json {
        let view = view_to_json(session, records, opts);
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        for line in format_view(session, records, opts) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(window: &Window, args: ListArgs, json: bool) -> CmdResult {
    let opts = window.render_options(args.expand, false);
    let filter = args
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| format!("invalid filter: {}", e))?;

    let records = window
        .session
        .active_view()
        .iter()
        .filter(|r| filter.as_ref().is_none_or(|re| re.is_match(r.title())));
    print_records(&window.session, records, json, &opts)
}

fn cmd_show(window: &Window, args: ShowArgs, json: bool) -> CmdResult {
    let id = ContractId::new(&args.id);
    let record = window
        .session
        .find(&id)
        .ok_or_else(|| format!("contract not found: {}", args.id))?;
    let opts = window.render_options(true, args.notes);

    if json {
        println!("{}", serde_json::to_string_pretty(&contract_to_json(record, &opts))?);
    } else {
        if window.session.store().hidden.contains(&id) {
            println!("(hidden)");
        }
        for line in format_contract_detail(record, &opts) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_sort(window: &mut Window, args: SortArgs, json: bool) -> CmdResult {
    let key: SortKey = args.key.parse()?;
    cmd_view_change(window, Command::SetSortKey(key), json)
}

/// Commands that only change how the active view is presented
fn cmd_view_change(window: &mut Window, command: Command, json: bool) -> CmdResult {
    window.apply(command);
    window.save()?;
    window.print_view(json, &window.render_options(false, false))
}

fn cmd_set_hidden(window: &mut Window, args: IdArgs, hidden: bool, json: bool) -> CmdResult {
    let id = ContractId::new(&args.id);
    let outcome = window.apply(Command::SetHidden {
        id: id.clone(),
        hidden,
    });

    let message = match outcome {
        CommandOutcome::Visibility(VisibilityChange::Moved { to, .. }) => match to {
            PartitionKind::Hidden => format!("hid {}", id),
            PartitionKind::Primary => format!("unhid {}", id),
        },
        CommandOutcome::Visibility(VisibilityChange::Unchanged(kind)) => match kind {
            PartitionKind::Hidden => format!("{} is already hidden", id),
            PartitionKind::Primary => format!("{} is already in the primary list", id),
        },
        _ => return Err(format!("contract not found: {}", id).into()),
    };

    window.save()?;
    if json {
        window.print_view(json, &window.render_options(false, false))
    } else {
        println!("{}", message);
        Ok(())
    }
}

fn cmd_accept(window: &mut Window, args: IdArgs, json: bool) -> CmdResult {
    let id = ContractId::new(&args.id);
    let contract = window
        .host
        .find(&id)
        .cloned()
        .ok_or_else(|| format!("contract not in snapshot: {}", id))?;
    if contract.state != ContractState::Active {
        return Err(format!("contract {} is not active ({})", id, contract.state.label()).into());
    }

    let already = window.session.find(&id).is_some();
    window
        .session
        .handle(HostEvent::ContractAccepted(contract), &window.host);
    window.save()?;

    if json {
        window.print_view(json, &window.render_options(false, false))
    } else {
        if already {
            println!("{} is already listed", id);
        } else {
            println!("accepted {}", id);
        }
        Ok(())
    }
}

fn cmd_rebuild(window: &mut Window, json: bool) -> CmdResult {
    window.apply(Command::Rebuild);
    window.save()?;
    if json {
        window.print_view(json, &window.render_options(false, false))
    } else {
        println!(
            "rebuilt: {} contracts in the primary list",
            window.session.store().primary.len()
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Watch
// ---------------------------------------------------------------------------

fn cmd_watch(window: &mut Window, args: WatchArgs, json: bool) -> CmdResult {
    let interval = Duration::from_secs(window.config.session.refresh_interval_secs);
    let opts = window.render_options(false, false);
    let mut cycle: u64 = 0;

    loop {
        if cycle > 0 {
            std::thread::sleep(interval);
        }
        {
            let _lock = FileLock::acquire_default(&window.state_path())?;
            let previous = if cycle > 0 { reload_snapshot(window) } else { None };
            window.reload_state();
            if let Some(previous) = previous {
                accept_new_contracts(window, &previous);
            }
            window.session.handle(HostEvent::TimerTick, &window.host);
            window.save()?;
        }
        window.print_view(json, &opts)?;

        cycle += 1;
        if args.cycles.is_some_and(|n| cycle >= n) {
            return Ok(());
        }
        if !json {
            println!();
        }
    }
}

/// Re-read the snapshot, returning the one it replaced. A failed read keeps
/// the previous snapshot.
fn reload_snapshot(window: &mut Window) -> Option<HostSnapshot> {
    match snapshot_io::read_snapshot(&window.snapshot_path()) {
        Ok(latest) => Some(std::mem::replace(&mut window.host, latest)),
        Err(e) => {
            tracing::warn!(error = %e, "keeping previous snapshot");
            None
        }
    }
}

/// Report contracts that turned up active since `previous` was read
fn accept_new_contracts(window: &mut Window, previous: &HostSnapshot) {
    let accepted: Vec<_> = window
        .host
        .active()
        .filter(|c| {
            window.session.find(&c.id).is_none()
                && previous
                    .find(&c.id)
                    .is_none_or(|old| old.state != ContractState::Active)
        })
        .cloned()
        .collect();

    for contract in accepted {
        tracing::info!(id = %contract.id, "new contract accepted");
        window
            .session
            .handle(HostEvent::ContractAccepted(contract), &window.host);
    }
}
