//! Lifecycle hooks around parsing and execution
//!
//! Hooks are registered once per [`crate::cli::Cli`] and run synchronously,
//! in a fixed order: pre-parse, post-parse, pre-execute, post-execute.

use crate::cli::error::{CliError, CliResult};
use crate::cli::invocation::Invocation;

/// Rewrites the raw command line before parsing
pub type PreParseHook = Box<dyn Fn(&mut Vec<String>) -> anyhow::Result<()> + Send + Sync>;

/// Observes a parsed invocation
pub type InvocationHook = Box<dyn Fn(&Invocation) -> anyhow::Result<()> + Send + Sync>;

/// Observes the execution result and may replace or clear its error
pub type PostExecuteHook =
    Box<dyn Fn(&Invocation, &mut Option<anyhow::Error>) -> anyhow::Result<()> + Send + Sync>;

/// The four optional extension points
#[derive(Default)]
pub struct Hooks {
    pre_parse: Option<PreParseHook>,
    post_parse: Option<InvocationHook>,
    pre_execute: Option<InvocationHook>,
    post_execute: Option<PostExecuteHook>,
}

impl Hooks {
    /// No hooks
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pre-parse hook
    pub fn pre_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Vec<String>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_parse = Some(Box::new(hook));
        self
    }

    /// Set the post-parse hook
    pub fn post_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Invocation) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_parse = Some(Box::new(hook));
        self
    }

    /// Set the pre-execute hook
    pub fn pre_execute<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Invocation) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_execute = Some(Box::new(hook));
        self
    }

    /// Set the post-execute hook
    pub fn post_execute<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Invocation, &mut Option<anyhow::Error>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_execute = Some(Box::new(hook));
        self
    }

    pub(crate) fn run_pre_parse(&self, cmd_line: &mut Vec<String>) -> CliResult<()> {
        match &self.pre_parse {
            Some(hook) => hook(cmd_line).map_err(CliError::PreParse),
            None => Ok(()),
        }
    }

    pub(crate) fn run_post_parse(&self, invocation: &Invocation) -> CliResult<()> {
        match &self.post_parse {
            Some(hook) => hook(invocation).map_err(CliError::PostParse),
            None => Ok(()),
        }
    }

    pub(crate) fn run_pre_execute(&self, invocation: &Invocation) -> CliResult<()> {
        match &self.pre_execute {
            Some(hook) => hook(invocation).map_err(CliError::PreExecute),
            None => Ok(()),
        }
    }

    pub(crate) fn run_post_execute(
        &self,
        invocation: &Invocation,
        error: &mut Option<anyhow::Error>,
    ) -> CliResult<()> {
        let Some(hook) = &self.post_execute else {
            return Ok(());
        };
        let had_error = error.is_some();
        hook(invocation, error).map_err(CliError::PostExecute)?;
        if had_error && error.is_none() {
            tracing::warn!(command = %invocation.name(), "post-execute hook cleared execution error");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("pre_parse", &self.pre_parse.is_some())
            .field("post_parse", &self.post_parse.is_some())
            .field("pre_execute", &self.pre_execute.is_some())
            .field("post_execute", &self.post_execute.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::command::command_fn;
    use crate::cli::options::OptionsSet;
    use std::sync::Arc;

    fn invocation() -> Invocation {
        Invocation::new(
            vec!["cmd".into(), "list".into()],
            Arc::new(command_fn(|_, _| async { anyhow::Ok(()) })),
            Vec::new(),
            OptionsSet::new(),
        )
    }

    #[test]
    fn test_absent_hooks_pass() {
        let hooks = Hooks::new();
        let mut line = vec!["cmd".to_string()];
        assert!(hooks.run_pre_parse(&mut line).is_ok());
        assert!(hooks.run_post_parse(&invocation()).is_ok());
        assert!(hooks.run_pre_execute(&invocation()).is_ok());

        let mut error = Some(anyhow::anyhow!("kept"));
        assert!(hooks.run_post_execute(&invocation(), &mut error).is_ok());
        assert!(error.is_some());
    }

    #[test]
    fn test_pre_parse_rewrites_line() {
        let hooks = Hooks::new().pre_parse(|line| {
            line.push("list".to_string());
            Ok(())
        });
        let mut line = vec!["cmd".to_string()];
        hooks.run_pre_parse(&mut line).unwrap();
        assert_eq!(line, vec!["cmd", "list"]);
    }

    #[test]
    fn test_errors_carry_stage() {
        let hooks = Hooks::new()
            .post_parse(|_| Err(anyhow::anyhow!("nope")))
            .pre_execute(|_| Err(anyhow::anyhow!("not now")));

        let err = hooks.run_post_parse(&invocation()).unwrap_err();
        assert_eq!(err.to_string(), "running post-parse hook: nope");
        let err = hooks.run_pre_execute(&invocation()).unwrap_err();
        assert_eq!(err.to_string(), "running pre-execute hook: not now");
    }

    #[test]
    fn test_post_execute_can_clear_error() {
        let hooks = Hooks::new().post_execute(|_, error| {
            error.take();
            Ok(())
        });
        let mut error = Some(anyhow::anyhow!("ignored"));
        hooks.run_post_execute(&invocation(), &mut error).unwrap();
        assert!(error.is_none());
    }
}
