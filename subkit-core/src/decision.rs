//! Human decisions requested by the resolver and the migration orchestrator.
//!
//! Prompt contents are built by pure functions here; answering them is the
//! job of a [`DecisionProvider`]. The CLI supplies a terminal implementation,
//! tests use [`ScriptedDecisions`].

use std::collections::VecDeque;

use crate::census::VersionUsageMap;
use crate::error::{Error, Result};
use crate::version::{recommended_version, sort_versions, VersionSpec};

/// Where a version offered in a prompt comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// Declared today by these projects.
    InUse(Vec<String>),
    /// Listed as an allowed alternative for the subspace.
    AllowedAlternative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOption {
    pub version: String,
    pub source: VersionSource,
}

impl VersionOption {
    pub fn label(&self) -> String {
        match &self.source {
            VersionSource::InUse(projects) => {
                format!("{} (used by {})", self.version, projects.join(", "))
            }
            VersionSource::AllowedAlternative => {
                format!("{} (allowed alternative)", self.version)
            }
        }
    }
}

/// Everything needed to ask how one mismatched dependency should be settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPrompt {
    pub dependency: String,
    /// Set when resolving for a single project.
    pub project: Option<String>,
    /// The project's own specifier, in project scope.
    pub current_version: Option<String>,
    pub recommended: Option<String>,
    /// Adoptable versions in comparator order, in-use ones first.
    pub options: Vec<VersionOption>,
}

impl ResolutionPrompt {
    /// Builds the prompt for `dependency`.
    ///
    /// Only versions some project already uses are recommended. In project
    /// scope the project's own usage is not offered back to it, and the
    /// recommendation is the lowest version its current specifier fits
    /// inside. In subspace scope the recommendation is the lowest
    /// version every in-use specifier fits inside.
    pub fn build(
        dependency: &str,
        usage: &VersionUsageMap,
        alternatives: &[String],
        project: Option<&str>,
    ) -> Self {
        let current_version = project
            .and_then(|p| usage.version_of(p))
            .map(str::to_string);
        let others = match project {
            Some(p) => usage.without_project(p),
            None => usage.clone(),
        };

        let mut options: Vec<VersionOption> = others
            .sorted_versions()
            .into_iter()
            .map(|version| {
                let projects = others
                    .projects(&version)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                VersionOption {
                    version,
                    source: VersionSource::InUse(projects),
                }
            })
            .collect();

        let extra: Vec<&String> = alternatives
            .iter()
            .filter(|alt| !others.contains_version(alt))
            .filter(|alt| current_version.as_deref() != Some(alt.as_str()))
            .collect();
        options.extend(sort_versions(extra).into_iter().map(|version| VersionOption {
            version,
            source: VersionSource::AllowedAlternative,
        }));

        let candidates: Vec<&str> = options
            .iter()
            .filter(|o| matches!(o.source, VersionSource::InUse(_)))
            .map(|o| o.version.as_str())
            .collect();
        let recommended = match &current_version {
            Some(current) => recommended_version(current, &candidates),
            None => {
                let in_use: Vec<VersionSpec> = usage.versions().map(VersionSpec::parse).collect();
                sort_versions(&candidates).into_iter().find(|candidate| {
                    let candidate = VersionSpec::parse(candidate);
                    in_use.iter().all(|spec| spec.is_subset_of(&candidate))
                })
            }
        };

        Self {
            dependency: dependency.to_string(),
            project: project.map(str::to_string),
            current_version,
            recommended,
            options,
        }
    }

    fn projects_using(&self, version: &str) -> usize {
        self.options
            .iter()
            .find(|o| o.version == version)
            .map(|o| match &o.source {
                VersionSource::InUse(projects) => projects.len(),
                VersionSource::AllowedAlternative => 0,
            })
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionChoice {
    /// Adopt one of the offered versions.
    Adopt(String),
    /// Type a version that is not on offer.
    EnterManually,
    /// Keep the versions as they are and record them as allowed alternatives.
    AcceptAlternative,
    Skip,
}

/// Yes/no questions asked along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// Continue with the next pending dependency?
    NextDependency { remaining: usize },
    /// Move the project's folder under the target subspace?
    RelocateProject { project: String, subspace: String },
}

/// Source of human decisions.
pub trait DecisionProvider {
    /// Picks which pending dependency to handle next.
    fn select_dependency(&mut self, pending: &[String]) -> Result<String>;

    fn choose_resolution(&mut self, prompt: &ResolutionPrompt) -> Result<ResolutionChoice>;

    /// Asks for a free-form version after [`ResolutionChoice::EnterManually`].
    fn enter_version(&mut self, prompt: &ResolutionPrompt) -> Result<String>;

    fn confirm(&mut self, question: &Question) -> Result<bool>;

    /// Asks for a project's new folder, relative to the repository root.
    fn enter_project_folder(&mut self, project: &str, suggested: &str) -> Result<String>;
}

/// The choice [`AutoDecisions`] makes for a prompt.
///
/// Adopts the recommendation; without one, the in-use version with the most
/// projects, preferring the later one in comparator order on ties.
pub fn auto_choice(prompt: &ResolutionPrompt) -> ResolutionChoice {
    if let Some(recommended) = &prompt.recommended {
        return ResolutionChoice::Adopt(recommended.clone());
    }

    let mut best: Option<(&str, usize)> = None;
    for option in &prompt.options {
        let count = prompt.projects_using(&option.version);
        if count == 0 {
            continue;
        }
        if best.map_or(true, |(_, top)| count >= top) {
            best = Some((option.version.as_str(), count));
        }
    }

    match best {
        Some((version, _)) => ResolutionChoice::Adopt(version.to_string()),
        None => ResolutionChoice::Skip,
    }
}

/// Answers every question without a human.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecisions {
    /// Whether projects are moved under the target subspace's folder.
    pub relocate: bool,
}

impl DecisionProvider for AutoDecisions {
    fn select_dependency(&mut self, pending: &[String]) -> Result<String> {
        pending
            .first()
            .cloned()
            .ok_or_else(|| Error::Cancelled("no pending dependencies".to_string()))
    }

    fn choose_resolution(&mut self, prompt: &ResolutionPrompt) -> Result<ResolutionChoice> {
        Ok(auto_choice(prompt))
    }

    fn enter_version(&mut self, prompt: &ResolutionPrompt) -> Result<String> {
        prompt
            .recommended
            .clone()
            .ok_or_else(|| Error::EmptyVersion(prompt.dependency.clone()))
    }

    fn confirm(&mut self, question: &Question) -> Result<bool> {
        Ok(match question {
            Question::NextDependency { .. } => true,
            Question::RelocateProject { .. } => self.relocate,
        })
    }

    fn enter_project_folder(&mut self, _project: &str, suggested: &str) -> Result<String> {
        Ok(suggested.to_string())
    }
}

/// A pre-recorded answer for [`ScriptedDecisions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    Dependency(String),
    Resolution(ResolutionChoice),
    Version(String),
    Confirm(bool),
    Folder(String),
}

/// Replays answers in order. Running out of answers cancels the operation;
/// an answer of the wrong kind is an error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisions {
    answers: VecDeque<ScriptedAnswer>,
    /// Resolution prompts seen so far.
    pub prompts: Vec<ResolutionPrompt>,
}

impl ScriptedDecisions {
    pub fn new(answers: impl IntoIterator<Item = ScriptedAnswer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, expected: &str) -> Result<ScriptedAnswer> {
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Cancelled(format!("no scripted answer left for {}", expected)))
    }

    fn mismatch(expected: &str, got: ScriptedAnswer) -> Error {
        Error::Decision(format!("expected {} answer, got {:?}", expected, got))
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn select_dependency(&mut self, _pending: &[String]) -> Result<String> {
        match self.next("dependency")? {
            ScriptedAnswer::Dependency(name) => Ok(name),
            other => Err(Self::mismatch("dependency", other)),
        }
    }

    fn choose_resolution(&mut self, prompt: &ResolutionPrompt) -> Result<ResolutionChoice> {
        self.prompts.push(prompt.clone());
        match self.next("resolution")? {
            ScriptedAnswer::Resolution(choice) => Ok(choice),
            other => Err(Self::mismatch("resolution", other)),
        }
    }

    fn enter_version(&mut self, _prompt: &ResolutionPrompt) -> Result<String> {
        match self.next("version")? {
            ScriptedAnswer::Version(version) => Ok(version),
            other => Err(Self::mismatch("version", other)),
        }
    }

    fn confirm(&mut self, _question: &Question) -> Result<bool> {
        match self.next("confirm")? {
            ScriptedAnswer::Confirm(answer) => Ok(answer),
            other => Err(Self::mismatch("confirm", other)),
        }
    }

    fn enter_project_folder(&mut self, _project: &str, _suggested: &str) -> Result<String> {
        match self.next("folder")? {
            ScriptedAnswer::Folder(folder) => Ok(folder),
            other => Err(Self::mismatch("folder", other)),
        }
    }
}
