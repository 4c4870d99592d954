//! Spinforge CLI - Spinnaker applications and pipelines as code

use clap::{Args, Parser, Subcommand};
use spinforge_platform::SpinCli;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;

use commands::RenderArgs;
use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "spinforge")]
#[command(version)]
#[command(about = "Compile Spinnaker applications and pipelines from manifests and Jinja2 charts", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Log level or filter directive (error, warn, info, debug, trace)
    #[arg(short = 'v', long, global = true, env = "SPINFORGE_LOG", default_value = "info")]
    verbosity: String,

    /// spin CLI binary used to reach Spinnaker
    #[arg(long, global = true, env = "SPINFORGE_SPIN_BIN", default_value = "spin")]
    spin_bin: PathBuf,

    /// spin CLI config file [default: ~/.spinforge/context-spin-config.yaml]
    #[arg(long, global = true, env = "SPINFORGE_SPIN_CONFIG")]
    spin_config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Client for the platform, built from the resolved flags
    pub fn platform(&self) -> Result<SpinCli> {
        let config = match &self.spin_config {
            Some(path) => path.clone(),
            None => dirs::home_dir()
                .map(|home| home.join(".spinforge").join("context-spin-config.yaml"))
                .ok_or_else(|| {
                    CliError::usage(
                        "cannot locate the home directory for the default spin config",
                        "Pass --spin-config or set SPINFORGE_SPIN_CONFIG",
                    )
                })?,
        };
        tracing::debug!(bin = %self.spin_bin.display(), config = %config.display(), "Using spin CLI");
        Ok(SpinCli::new(&self.spin_bin, config))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show what apply would change, without saving anything
    Plan {
        /// Manifest file or directory (not recursive)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },

    /// Save new and changed objects to Spinnaker
    Apply {
        /// Manifest file or directory (not recursive)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Do not print diffs of changed objects
        #[arg(long)]
        no_plan: bool,
    },

    /// Render a chart locally
    Template {
        #[command(flatten)]
        render: RenderArgs,

        /// Compile the rendered manifests into the exact objects Spinnaker stores
        #[arg(long)]
        full_render: bool,

        /// Output directory (if not set, outputs to stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Render a chart and apply its manifests
    Install {
        #[command(flatten)]
        render: RenderArgs,

        /// Plan only, save nothing
        #[arg(long)]
        dry_run: bool,

        /// Do not print diffs of changed objects
        #[arg(long)]
        no_plan: bool,
    },

    /// Render a chart and delete the objects it describes
    Uninstall {
        #[command(flatten)]
        render: RenderArgs,
    },

    /// Delete applications or pipelines
    #[command(args_conflicts_with_subcommands = true)]
    Delete {
        /// Delete every object described in a manifest file or directory
        #[arg(short = 'f', long = "file")]
        file: Option<PathBuf>,

        #[command(subcommand)]
        target: Option<DeleteTarget>,
    },
}

#[derive(Subcommand)]
enum DeleteTarget {
    /// Delete an application (and, on the platform, its pipelines)
    Application {
        /// Application name
        name: String,
    },

    /// Delete one pipeline
    Pipeline {
        /// Owning application
        #[arg(short = 'a', long)]
        application: String,

        /// Pipeline name
        name: String,
    },
}

fn init_logging(verbosity: &str) {
    let filter = EnvFilter::try_new(verbosity).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let global = &cli.global;

    match cli.command {
        Commands::Plan { file } => commands::plan::run(global, &file),

        Commands::Apply { file, no_plan } => commands::apply::run(global, &file, !no_plan),

        Commands::Template {
            render,
            full_render,
            output,
        } => commands::template::run(&render, full_render, output.as_deref()),

        Commands::Install {
            render,
            dry_run,
            no_plan,
        } => commands::install::run(global, &render, dry_run, !no_plan),

        Commands::Uninstall { render } => commands::uninstall::run(global, &render),

        Commands::Delete { file, target } => match (file, target) {
            (Some(file), _) => commands::delete::from_file(global, &file),
            (None, Some(DeleteTarget::Application { name })) => commands::delete::application(global, &name),
            (None, Some(DeleteTarget::Pipeline { application, name })) => {
                commands::delete::pipeline(global, &application, &name)
            }
            (None, None) => Err(CliError::usage(
                "nothing to delete",
                "Use `delete -f <manifests>`, `delete application <name>` or `delete pipeline -a <app> <name>`",
            )),
        },
    }
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(&cli.global.verbosity);

    let code = match run(cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}
