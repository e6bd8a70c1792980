use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cw", about = concat!("contracts window v", env!("CARGO_PKG_VERSION"), " - sorted, hideable contract lists"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,

    /// Presentation context whose settings apply (flight, editor, space_center, tracking_station)
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the contracts in the active view
    List(ListArgs),
    /// Show one contract with its goal tree
    Show(ShowArgs),
    /// Set the sort key (default, expiration, acceptance, difficulty, reward, type)
    Sort(SortArgs),
    /// Toggle ascending/descending order
    Order,
    /// Switch between the primary and hidden lists
    ToggleHidden,
    /// Move a contract to the hidden list
    Hide(IdArgs),
    /// Move a contract back to the primary list
    Unhide(IdArgs),
    /// Add a newly accepted contract from the snapshot to the primary list
    Accept(IdArgs),
    /// Discard both lists and rebuild from the snapshot's active contracts
    Rebuild,
    /// Re-read the snapshot on a timer and keep the lists current
    Watch(WatchArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Include each contract's goal tree
    #[arg(long)]
    pub expand: bool,
    /// Only list contracts whose title matches this regex
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Contract ID
    pub id: String,
    /// Include goal notes
    #[arg(long)]
    pub notes: bool,
}

#[derive(Args)]
pub struct SortArgs {
    /// Sort key
    pub key: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Contract ID
    pub id: String,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Stop after this many refresh cycles (default: run until interrupted)
    #[arg(long)]
    pub cycles: Option<u64>,
}
