use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use version_bumper::cli::orchestration::{
    run_bump_workflow, run_list_workflow, BumpWorkflowArgs, ListWorkflowArgs,
};
use version_bumper::config;
use version_bumper::domain::VersionPart;
use version_bumper::registry::ListOptions;
use version_bumper::ui::{self, Verbosity};

#[derive(Parser)]
#[command(
    name = "version-bumper",
    version,
    about = "Bump versions of .NET projects and cascade them to their dependents"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "Directory to scan [default: current directory]")]
    root: Option<PathBuf>,

    #[arg(short, long, global = true, conflicts_with = "debug", help = "Only print errors")]
    quiet: bool,

    #[arg(short, long, global = true, help = "Print debug output")]
    debug: bool,

    #[arg(long, global = true, help = "Never prompt; ambiguous patterns are skipped")]
    non_interactive: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bump the components matching the patterns and everything depending on them
    Bump {
        #[arg(
            short,
            long,
            default_value = "none",
            help = "Version part to bump: major, minor, patch (alias build) or none"
        )]
        part: VersionPart,

        #[arg(long, help = "Report orphans, multi-owned projects and missing projects")]
        diagnostics: bool,

        #[arg(required = true, help = "Case-insensitive regular expressions over component names")]
        patterns: Vec<String>,
    },
    /// List discovered components
    List {
        #[arg(default_value = "", help = "Case-insensitive regular expression over component names")]
        pattern: String,

        #[arg(long, help = "Only components listed in no solution")]
        orphans: bool,

        #[arg(long, help = "Group components by kind")]
        group_by_type: bool,

        #[arg(long, help = "Most depended-upon components first")]
        order_by_depth: bool,

        #[arg(long, help = "Show dependencies and dependents")]
        long: bool,

        #[arg(long, help = "Report orphans, multi-owned projects and missing projects")]
        diagnostics: bool,
    },
}

impl Args {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    ui::logger::init(args.verbosity());

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    let interactive =
        !args.non_interactive && config.bump.interactive && console::user_attended();

    match args.command {
        Command::Bump {
            part,
            diagnostics,
            patterns,
        } => {
            let result = run_bump_workflow(
                BumpWorkflowArgs {
                    root,
                    part,
                    diagnostics,
                    patterns,
                    interactive,
                },
                &config,
            )?;
            for pattern in &result.unresolved {
                warn!("No component bumped for pattern '{}'", pattern);
            }
        }
        Command::List {
            pattern,
            orphans,
            group_by_type,
            order_by_depth,
            long,
            diagnostics,
        } => {
            run_list_workflow(
                ListWorkflowArgs {
                    root,
                    pattern,
                    options: ListOptions {
                        order_by_tree_depth: order_by_depth,
                        group_by_type,
                        orphans_only: orphans,
                    },
                    long,
                    diagnostics,
                },
                &config,
            )?;
        }
    }
    Ok(())
}
