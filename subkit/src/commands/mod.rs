//! Command implementations for the CLI.

mod inspect;
mod menu;
mod migrate;
mod setup;
mod sync_reporter;
mod versions;

use anyhow::Result;
use subkit_core::context::DEFAULT_SUBSPACE;
use subkit_core::subspace::{is_supported, validate_subspace_name};
use subkit_core::{AutoDecisions, DecisionProvider, Error, RepoContext};

use crate::prompts::{select_subspace, TerminalDecisions};

pub use inspect::{cmd_analyze, cmd_census, cmd_graph};
pub use menu::cmd_menu;
pub use migrate::cmd_move;
pub use setup::cmd_init;
pub use versions::{cmd_clean, cmd_sync};

/// `--yes` answers without asking; otherwise the terminal does.
fn decision_provider(yes: bool) -> Box<dyn DecisionProvider> {
    if yes {
        Box::new(AutoDecisions::default())
    } else {
        Box::new(TerminalDecisions)
    }
}

fn require_subspaces(ctx: &RepoContext) -> Result<()> {
    if is_supported(ctx) {
        Ok(())
    } else {
        Err(Error::SubspacesNotEnabled(ctx.root().to_path_buf()).into())
    }
}

/// The subspace named on the command line, or one picked interactively.
fn resolve_subspace(ctx: &RepoContext, given: Option<String>, allow_new: bool) -> Result<String> {
    match given {
        Some(name) => {
            if name != DEFAULT_SUBSPACE {
                validate_subspace_name(&name)?;
            }
            Ok(name)
        }
        None => Ok(select_subspace(ctx, allow_new)?),
    }
}
