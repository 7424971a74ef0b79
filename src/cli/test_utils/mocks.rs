//! Mock commands and option groups for testing

use crate::cli::command::{CommandNode, Execute};
use crate::cli::invocation::Context;
use crate::cli::options::{Field, FieldDoc, FieldSet, OptionGroup, OptionsSet};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Options of the scenario root: `-debug` and `-configfile`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootOptions {
    /// `-debug`
    pub debug: bool,
    /// `-configfile`
    pub config_file: String,
}

impl FieldSet for RootOptions {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::value("debug", |o: &mut Self| &mut o.debug),
            Field::value("config_file", |o: &mut Self| &mut o.config_file),
        ]
    }
}

impl OptionGroup for RootOptions {
    fn describe(field: &str) -> FieldDoc {
        match field {
            "debug" => FieldDoc::new("turn on debug logging"),
            "config_file" => {
                FieldDoc::new("configuration file path").default_value("~/.config/cmd/config.toml")
            }
            _ => FieldDoc::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Behaviour {
    Succeed,
    Fail(&'static str),
    Sleep(Duration),
    WaitForCancel,
}

#[derive(Default)]
struct State {
    calls: Vec<Vec<String>>,
    options: Option<OptionsSet>,
    finished: bool,
}

/// Mock command recording its calls
#[derive(Clone)]
pub struct MockCommand {
    behaviour: Behaviour,
    state: Arc<Mutex<State>>,
}

impl MockCommand {
    /// Succeeds immediately
    pub fn new() -> Self {
        Self::with_behaviour(Behaviour::Succeed)
    }

    /// Fails with `message`
    pub fn failing(message: &'static str) -> Self {
        Self::with_behaviour(Behaviour::Fail(message))
    }

    /// Sleeps for `duration`, then succeeds
    pub fn sleeping(duration: Duration) -> Self {
        Self::with_behaviour(Behaviour::Sleep(duration))
    }

    /// Returns only once its context is cancelled
    pub fn waiting_for_cancel() -> Self {
        Self::with_behaviour(Behaviour::WaitForCancel)
    }

    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Arguments of every call, in order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Whether a call ran to completion
    pub fn finished(&self) -> bool {
        self.state.lock().unwrap().finished
    }

    /// Option group seen by the latest call
    pub fn last_options<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        let state = self.state.lock().unwrap();
        state.options.as_ref()?.get::<T>().cloned()
    }
}

impl Default for MockCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Execute for MockCommand {
    async fn execute(&self, ctx: Context, args: Vec<String>) -> anyhow::Result<()> {
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(args);
            state.options = Some(ctx.options().clone());
        }

        match self.behaviour {
            Behaviour::Succeed => {}
            Behaviour::Fail(message) => return Err(anyhow::anyhow!(message)),
            Behaviour::Sleep(duration) => tokio::time::sleep(duration).await,
            Behaviour::WaitForCancel => ctx.token().cancelled().await,
        }

        self.state.lock().unwrap().finished = true;
        Ok(())
    }
}

/// Root with `list` and `run` subcommands and a [`RootOptions`] group
pub fn scenario_tree(list: MockCommand, run: MockCommand) -> CommandNode {
    CommandNode::branch("cmd runs things")
        .with_options(RootOptions::default())
        .expect("root options compile")
        .subcommand("list", CommandNode::terminal("list things", list))
        .subcommand("run", CommandNode::terminal("run a thing", run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::cancel::Budget;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let mock = MockCommand::new();
        let mut options = OptionsSet::new();
        options.insert(RootOptions {
            debug: true,
            config_file: String::new(),
        });
        let ctx = Context::new(Budget::default(), Arc::new(options));

        mock.execute(ctx, vec!["a".into()]).await.unwrap();
        assert_eq!(mock.calls(), vec![vec!["a".to_string()]]);
        assert!(mock.finished());
        assert!(mock.last_options::<RootOptions>().unwrap().debug);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockCommand::failing("boom");
        let ctx = Context::new(Budget::default(), Arc::new(OptionsSet::new()));
        let err = mock.execute(ctx, Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(!mock.finished());
    }
}
