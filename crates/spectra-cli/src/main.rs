//! Spectra metamodel inspector
//!
//! Loads a TOML domain model, builds the specification graph on demand and
//! prints what the metamodel knows about its types: hierarchy, members,
//! facet resolution and contributed actions.

mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use spectra_core::ActionType;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "spectra")]
#[command(about = "Inspect reflective object metamodels", long_about = None)]
#[command(version)]
struct Cli {
    /// Domain model file
    #[arg(short, long, global = true, default_value = "spectra.toml")]
    model: PathBuf,

    /// Log introspection (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every type in the model
    List {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one specification: hierarchy, classification and members
    Inspect {
        /// Fully-qualified type name or logical name
        type_name: String,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a facet over a type's hierarchy
    Facet {
        /// Fully-qualified type name or logical name
        type_name: String,
        /// Facet tag (title, icon, named, plural, describedAs, hidden, nature)
        facet: String,
    },

    /// List declared and contributed actions
    Actions {
        /// Fully-qualified type name or logical name
        type_name: String,
        /// Action types to include
        #[arg(short, long, value_enum, value_delimiter = ',', default_value = "user")]
        types: Vec<ActionKind>,
        /// Leave out actions contributed by services
        #[arg(long)]
        no_contributed: bool,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Introspect every type and report failures
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ActionKind {
    User,
    Explore,
    Prototype,
    Debug,
    All,
}

fn action_types(kinds: &[ActionKind]) -> Vec<ActionType> {
    let mut types = Vec::new();
    for kind in kinds {
        match kind {
            ActionKind::User => types.push(ActionType::User),
            ActionKind::Explore => types.push(ActionType::Explore),
            ActionKind::Prototype => types.push(ActionType::Prototype),
            ActionKind::Debug => types.push(ActionType::Debug),
            ActionKind::All => types.extend(ActionType::ALL),
        }
    }
    types.sort();
    types.dedup();
    types
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let choice = output::resolve_color_choice(cli.color.as_deref());
    let session = commands::Session::open(&cli.model, choice)?;

    match cli.command {
        Commands::List { json } => commands::list::execute(&session, json),
        Commands::Inspect { type_name, json } => commands::inspect::execute(&session, &type_name, json),
        Commands::Facet { type_name, facet } => commands::facet::execute(&session, &type_name, &facet),
        Commands::Actions {
            type_name,
            types,
            no_contributed,
            json,
        } => commands::actions::execute(
            &session,
            &type_name,
            &action_types(&types),
            !no_contributed,
            json,
        ),
        Commands::Check => commands::check::execute(&session),
    }
}
