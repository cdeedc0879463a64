use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use component_engine::cli::{self, Diagnosed};
use component_engine::diagnostics::color;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "component-engine")]
#[command(about = "Inspect, template and run user-submitted components", version)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the program model extracted from a component file
    #[command(alias = "p")]
    Parse {
        /// Component source file
        input: PathBuf,
    },

    /// Print the resolved entrypoint signature
    #[command(alias = "e")]
    Entrypoint {
        /// Component source file
        input: PathBuf,

        /// Entrypoint name (defaults to the configured one)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print the field template
    #[command(alias = "t")]
    Template {
        /// Component source file
        input: PathBuf,

        /// Field overrides (JSON object keyed by field name)
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Rebuild reactively after this field changed
        #[arg(long, requires = "values")]
        update_field: Option<String>,

        /// Current field values (JSON object)
        #[arg(long)]
        values: Option<PathBuf>,

        /// Print the whole frontend node instead of the template
        #[arg(long, conflicts_with = "update_field")]
        node: bool,
    },

    /// Compile the component and call its entrypoint
    #[command(alias = "r")]
    Run {
        /// Component source file
        input: PathBuf,

        /// Keyword arguments (JSON object)
        #[arg(long)]
        kwargs: Option<PathBuf>,
    },
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    let engine = cli::engine(cli.config.as_deref())?;
    match cli.command {
        Commands::Parse { input } => cli::parse(&engine, input),
        Commands::Entrypoint { input, name } => cli::entrypoint(&engine, input, name),
        Commands::Template { input, overrides, update_field, values, node } => {
            cli::template(&engine, input, overrides, update_field, values, node)
        }
        Commands::Run { input, kwargs } => cli::run(&engine, input, kwargs),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match execute(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<Diagnosed>() {
                Some(diagnosed) => eprint!("{}", diagnosed),
                None => eprintln!("{} {:#}", color::error_tag(), err),
            }
            ExitCode::FAILURE
        }
    }
}
