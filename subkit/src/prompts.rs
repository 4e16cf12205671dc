//! Terminal prompts backed by inquire.

use std::fmt;

use inquire::{Confirm, InquireError, Select, Text};
use owo_colors::OwoColorize;
use subkit_core::decision::VersionOption;
use subkit_core::subspace::{list_subspaces, validate_subspace_name};
use subkit_core::{
    DecisionProvider, Error, Question, RepoContext, ResolutionChoice, ResolutionPrompt, Result,
};

use crate::formatting::{print_key_value, print_section_header, SectionStyle};

const NEW_SUBSPACE: &str = "(create a new subspace)";

fn prompt_error(e: InquireError) -> Error {
    match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            Error::Cancelled("prompt dismissed".to_string())
        }
        other => Error::Decision(other.to_string()),
    }
}

/// Whether `e` (or anything it wraps) is a dismissed prompt.
pub fn is_cancelled(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<Error>(), Some(Error::Cancelled(_)))
}

pub fn confirm(message: &str, default: bool) -> Result<bool> {
    Confirm::new(message)
        .with_default(default)
        .prompt()
        .map_err(prompt_error)
}

pub fn select_project(projects: Vec<String>) -> Result<String> {
    Select::new("Which project?", projects)
        .with_page_size(15)
        .prompt()
        .map_err(prompt_error)
}

/// Picks a registered subspace, or asks for a new name when `allow_new`.
pub fn select_subspace(ctx: &RepoContext, allow_new: bool) -> Result<String> {
    let mut options = list_subspaces(ctx)?;
    if allow_new {
        options.push(NEW_SUBSPACE.to_string());
    }
    let choice = Select::new("Which subspace?", options)
        .prompt()
        .map_err(prompt_error)?;
    if choice != NEW_SUBSPACE {
        return Ok(choice);
    }

    loop {
        let name = Text::new("Name of the new subspace:")
            .with_help_message("lowercase letters and underscores")
            .prompt()
            .map_err(prompt_error)?;
        let name = name.trim().to_string();
        match validate_subspace_name(&name) {
            Ok(()) => return Ok(name),
            Err(e) => println!("  {}", e.to_string().red()),
        }
    }
}

struct ChoiceItem {
    label: String,
    choice: ResolutionChoice,
}

impl fmt::Display for ChoiceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

fn adopt_item(option: &VersionOption, recommended: Option<&str>) -> ChoiceItem {
    let mut label = option.label();
    if recommended == Some(option.version.as_str()) {
        label.push_str(" [recommended]");
    }
    ChoiceItem {
        label,
        choice: ResolutionChoice::Adopt(option.version.clone()),
    }
}

/// Answers decisions by asking on the terminal.
#[derive(Debug, Default)]
pub struct TerminalDecisions;

impl DecisionProvider for TerminalDecisions {
    fn select_dependency(&mut self, pending: &[String]) -> Result<String> {
        Select::new("Which dependency do you want to resolve?", pending.to_vec())
            .with_page_size(15)
            .prompt()
            .map_err(prompt_error)
    }

    fn choose_resolution(&mut self, prompt: &ResolutionPrompt) -> Result<ResolutionChoice> {
        println!();
        print_section_header(&prompt.dependency, SectionStyle::Secondary);
        if let (Some(project), Some(current)) = (&prompt.project, &prompt.current_version) {
            print_key_value(&format!("{} uses", project), current);
        }

        let recommended = prompt.recommended.as_deref();
        let mut items: Vec<ChoiceItem> = prompt
            .options
            .iter()
            .map(|option| adopt_item(option, recommended))
            .collect();
        let cursor = recommended
            .and_then(|r| prompt.options.iter().position(|o| o.version == r))
            .unwrap_or(0);
        items.push(ChoiceItem {
            label: "Enter a version manually".to_string(),
            choice: ResolutionChoice::EnterManually,
        });
        items.push(ChoiceItem {
            label: "Keep the current versions as allowed alternatives".to_string(),
            choice: ResolutionChoice::AcceptAlternative,
        });
        items.push(ChoiceItem {
            label: "Skip".to_string(),
            choice: ResolutionChoice::Skip,
        });

        Select::new("How should it be resolved?", items)
            .with_starting_cursor(cursor)
            .prompt()
            .map(|item| item.choice)
            .map_err(prompt_error)
    }

    fn enter_version(&mut self, prompt: &ResolutionPrompt) -> Result<String> {
        let message = format!("Version of {}:", prompt.dependency);
        let mut text = Text::new(&message);
        if let Some(recommended) = prompt.recommended.as_deref() {
            text = text.with_placeholder(recommended);
        }
        text.prompt().map_err(prompt_error)
    }

    fn confirm(&mut self, question: &Question) -> Result<bool> {
        match question {
            Question::NextDependency { remaining } => confirm(
                &format!("Resolve the next dependency? ({} left)", remaining),
                true,
            ),
            Question::RelocateProject { project, subspace } => confirm(
                &format!("Move the {} folder under the {} subspace?", project, subspace),
                false,
            ),
        }
    }

    fn enter_project_folder(&mut self, project: &str, suggested: &str) -> Result<String> {
        Text::new(&format!("New folder for {}:", project))
            .with_default(suggested)
            .prompt()
            .map_err(prompt_error)
    }
}
