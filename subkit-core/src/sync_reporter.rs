//! Trait for reporting version synchronization progress.

/// Receives the user-visible effects of resolving mismatches.
///
/// Keeps the core library free of terminal output; the CLI prints, tests
/// usually pass [`SilentReporter`].
pub trait SyncReporter: Send + Sync {
    /// A project's manifest was rewritten from `old` to `new`.
    fn report_update(&self, project: &str, dependency: &str, old: &str, new: &str);

    /// `versions` were recorded as allowed alternatives.
    fn report_alternatives(&self, subspace: &str, dependency: &str, versions: &[String]);

    /// A project was left untouched.
    fn report_skipped(&self, project: &str, dependency: &str, reason: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl SyncReporter for SilentReporter {
    fn report_update(&self, _project: &str, _dependency: &str, _old: &str, _new: &str) {}

    fn report_alternatives(&self, _subspace: &str, _dependency: &str, _versions: &[String]) {}

    fn report_skipped(&self, _project: &str, _dependency: &str, _reason: &str) {}
}
