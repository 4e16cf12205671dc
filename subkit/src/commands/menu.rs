//! Interactive menu shown when no command is given.

use std::fmt;

use anyhow::Result;
use inquire::Select;
use subkit_core::{RepoContext, RushRegistry};

use crate::formatting::{print_error, print_section_header, print_warning, SectionStyle};
use crate::prompts::{is_cancelled, select_project};

use super::{cmd_analyze, cmd_clean, cmd_move, cmd_sync, resolve_subspace};

#[derive(Debug, Clone, Copy)]
enum MenuAction {
    Move,
    Sync,
    Analyze,
    Clean,
    Exit,
}

impl MenuAction {
    const ALL: [MenuAction; 5] = [
        MenuAction::Move,
        MenuAction::Sync,
        MenuAction::Analyze,
        MenuAction::Clean,
        MenuAction::Exit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::Move => "Move projects into a subspace",
            MenuAction::Sync => "Sync dependency versions",
            MenuAction::Analyze => "Analyze a project's version conflicts",
            MenuAction::Clean => "Clean up allowed alternative versions",
            MenuAction::Exit => "Exit",
        };
        f.write_str(label)
    }
}

fn run_action(ctx: &RepoContext, action: MenuAction) -> Result<()> {
    match action {
        MenuAction::Move => cmd_move(ctx, None, None, Vec::new(), false),
        MenuAction::Sync => cmd_sync(ctx, None, None, false),
        MenuAction::Analyze => {
            let project = select_project(RushRegistry::load(ctx)?.project_names())?;
            cmd_analyze(ctx, project, None, None, false)
        }
        MenuAction::Clean => {
            let subspace = resolve_subspace(ctx, None, false)?;
            cmd_clean(ctx, Some(subspace), false)
        }
        MenuAction::Exit => Ok(()),
    }
}

/// Loops until the user picks Exit or dismisses the menu. A failed action is
/// reported and the menu shown again.
pub fn cmd_menu(ctx: &RepoContext) -> Result<()> {
    print_section_header("subkit", SectionStyle::Primary);

    loop {
        let choice = Select::new("What do you want to do?", MenuAction::ALL.to_vec()).prompt();
        let action = match choice {
            Ok(MenuAction::Exit) | Err(_) => break,
            Ok(action) => action,
        };

        if let Err(e) = run_action(ctx, action) {
            if is_cancelled(&e) {
                print_warning("Cancelled");
            } else {
                print_error(&format!("{:#}", e));
            }
        }
        println!();
    }

    Ok(())
}
