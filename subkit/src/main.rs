mod commands;
mod formatting;
mod prompts;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use subkit_core::RepoContext;
use tracing::Level;

use crate::formatting::print_warning;
use crate::prompts::is_cancelled;

#[derive(Parser)]
#[command(name = "subkit")]
#[command(about = "Move Rush projects between subspaces and keep their versions in line")]
struct Cli {
    /// Runs the interactive menu when omitted.
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository root; found from the current directory by default.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(short, long, action, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Enable subspaces and create the default subspace.
    Init,
    /// Move projects into a subspace.
    Move {
        /// Repository to take the projects from.
        #[arg(long)]
        source: Option<PathBuf>,
        #[arg(long)]
        subspace: Option<String>,
        #[arg(long = "project")]
        projects: Vec<String>,
        /// Decide everything automatically.
        #[arg(short, long, action)]
        yes: bool,
    },
    /// Resolve mismatched dependency versions.
    Sync {
        #[arg(long)]
        subspace: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(short, long, action)]
        yes: bool,
    },
    /// Drop redundant allowed alternative versions.
    Clean {
        #[arg(long)]
        subspace: Option<String>,
        #[arg(long, action)]
        dry_run: bool,
    },
    /// Report the versions a project would bring into conflict.
    Analyze {
        #[arg(long)]
        project: String,
        #[arg(long)]
        subspace: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, action)]
        json: bool,
    },
    /// List dependencies declared with several versions.
    Census {
        #[arg(long)]
        subspace: Option<String>,
        /// Include dependencies with a single version.
        #[arg(long, action)]
        all: bool,
        #[arg(long, action)]
        json: bool,
    },
    /// Print the local dependency tree of a project.
    Graph {
        project: String,
        /// Walk the projects that depend on it instead.
        #[arg(long, action)]
        from: bool,
        #[arg(long)]
        filter: Option<String>,
    },
}

fn open_context(root: Option<PathBuf>) -> Result<RepoContext> {
    let ctx = match root {
        Some(root) => RepoContext::open(root)?,
        None => RepoContext::discover(&std::env::current_dir()?)?,
    };
    tracing::debug!("Repository root: {}", ctx.root().display());
    Ok(ctx)
}

fn run(cli: Cli) -> Result<()> {
    let ctx = open_context(cli.root)?;

    match cli.command {
        None => commands::cmd_menu(&ctx)?,
        Some(Commands::Init) => commands::cmd_init(&ctx)?,
        Some(Commands::Move {
            source,
            subspace,
            projects,
            yes,
        }) => commands::cmd_move(&ctx, source, subspace, projects, yes)?,
        Some(Commands::Sync {
            subspace,
            project,
            yes,
        }) => commands::cmd_sync(&ctx, subspace, project, yes)?,
        Some(Commands::Clean { subspace, dry_run }) => {
            commands::cmd_clean(&ctx, subspace, dry_run)?
        }
        Some(Commands::Analyze {
            project,
            subspace,
            output,
            json,
        }) => commands::cmd_analyze(&ctx, project, subspace, output, json)?,
        Some(Commands::Census {
            subspace,
            all,
            json,
        }) => commands::cmd_census(&ctx, subspace, all, json)?,
        Some(Commands::Graph {
            project,
            from,
            filter,
        }) => commands::cmd_graph(&ctx, project, from, filter)?,
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Err(e) if is_cancelled(&e) => {
            print_warning("Cancelled");
            Ok(())
        }
        other => other,
    }
}
