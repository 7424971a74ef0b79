//! End-to-end tests driving a small command tree through `Cli`

use async_trait::async_trait;
use cmdkit::cli::{
    Budget, Cli, CliConfig, CliError, CommandNode, Context, Execute, Field, FieldDoc, FieldSet,
    Hooks, Interrupt, OptionGroup, ParseError, Sources,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default, PartialEq)]
struct RootOptions {
    debug: bool,
    config_file: String,
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
            "config_file" => FieldDoc::new("configuration file").default_value("cmd.toml"),
            _ => FieldDoc::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Retry {
    attempts: u32,
    backoff: Duration,
}

impl FieldSet for Retry {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::value("attempts", |r: &mut Self| &mut r.attempts),
            Field::value("backoff", |r: &mut Self| &mut r.backoff),
        ]
    }
}

impl OptionGroup for Retry {
    fn describe(field: &str) -> FieldDoc {
        match field {
            "attempts" => FieldDoc::new("attempts before giving up").default_value(3u32),
            "backoff" => FieldDoc::new("delay between attempts").default_value(Duration::from_secs(1)),
            _ => FieldDoc::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct RunOptions {
    workers: u32,
    token: String,
    retry: Retry,
}

impl FieldSet for RunOptions {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::value("workers", |o: &mut Self| &mut o.workers).rename("j"),
            Field::value("token", |o: &mut Self| &mut o.token).flag_only(),
            Field::group("retry", |o: &Self| &o.retry, |o: &mut Self| &mut o.retry),
        ]
    }
}

impl OptionGroup for RunOptions {
    fn describe(field: &str) -> FieldDoc {
        match field {
            "workers" => FieldDoc::new("parallel workers").default_value(1u32),
            "token" => FieldDoc::new("access token"),
            _ => FieldDoc::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Call {
    args: Vec<String>,
    root: Option<RootOptions>,
    run: Option<RunOptions>,
    retry: Option<Retry>,
}

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    fn last(&self) -> Call {
        self.calls.lock().unwrap().last().cloned().expect("command was called")
    }

    fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Execute for Recorder {
    async fn execute(&self, ctx: Context, args: Vec<String>) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(Call {
            args,
            root: ctx.get::<RootOptions>().cloned(),
            run: ctx.get::<RunOptions>().cloned(),
            retry: ctx.get::<Retry>().cloned(),
        });
        Ok(())
    }
}

struct Fixture {
    list: Recorder,
    run: Recorder,
}

impl Fixture {
    fn new() -> Self {
        Self {
            list: Recorder::default(),
            run: Recorder::default(),
        }
    }

    fn tree(&self) -> CommandNode {
        CommandNode::branch("cmd runs things")
            .with_options(RootOptions::default())
            .unwrap()
            .subcommand("list", CommandNode::terminal("list things", self.list.clone()))
            .subcommand(
                "run",
                CommandNode::terminal("run a job", self.run.clone())
                    .with_options(RunOptions::default())
                    .unwrap(),
            )
    }

    fn cli(&self) -> Cli {
        Cli::new("cmd", self.tree()).unwrap()
    }
}

fn line(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn invoke(cli: &Cli, items: &[&str]) -> Result<(), CliError> {
    cli.invoke(&CancellationToken::new(), line(items)).await
}

#[tokio::test]
async fn test_root_alone_reports_usage() {
    let fixture = Fixture::new();
    let err = invoke(&fixture.cli(), &["cmd"]).await.unwrap_err();
    assert_eq!(err.to_string(), "parsing command line: usage: cmd <command>");
    match err.parse_error() {
        Some(ParseError::Usage { command, help }) => {
            assert_eq!(command, "cmd");
            assert_eq!(help, "cmd runs things");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_list_without_args() {
    let fixture = Fixture::new();
    invoke(&fixture.cli(), &["cmd", "list"]).await.unwrap();

    let call = fixture.list.last();
    assert!(call.args.is_empty());
    assert_eq!(
        call.root,
        Some(RootOptions {
            debug: false,
            config_file: "cmd.toml".into(),
        })
    );
    assert_eq!(fixture.run.count(), 0);
}

#[tokio::test]
async fn test_root_flag_then_list() {
    let fixture = Fixture::new();
    invoke(&fixture.cli(), &["cmd", "-debug", "list"]).await.unwrap();

    let call = fixture.list.last();
    assert!(call.args.is_empty());
    assert!(call.root.unwrap().debug);
}

#[tokio::test]
async fn test_list_keeps_trailing_args() {
    let fixture = Fixture::new();
    invoke(&fixture.cli(), &["cmd", "list", "blah", "blah", "blah"])
        .await
        .unwrap();
    assert_eq!(fixture.list.last().args, vec!["blah", "blah", "blah"]);
}

#[tokio::test]
async fn test_unknown_command() {
    let fixture = Fixture::new();
    let err = invoke(&fixture.cli(), &["cmd", "bogus"]).await.unwrap_err();
    assert_eq!(
        err.parse_error().map(ToString::to_string),
        Some("command \"bogus\" not recognised".to_string())
    );
}

#[tokio::test]
async fn test_flags_at_every_level_and_nested_group() {
    let fixture = Fixture::new();
    invoke(
        &fixture.cli(),
        &[
            "cmd", "-configfile", "other.toml", "run", "-j", "4", "-attempts=5", "-token", "t0k",
            "build", "-j", "9",
        ],
    )
    .await
    .unwrap();

    let call = fixture.run.last();
    assert_eq!(call.args, vec!["build", "-j", "9"]);
    assert_eq!(call.root.unwrap().config_file, "other.toml");

    let run = call.run.unwrap();
    assert_eq!(run.workers, 4);
    assert_eq!(run.token, "t0k");
    assert_eq!(run.retry.attempts, 5);

    // the nested group is registered on its own as well
    assert_eq!(
        call.retry,
        Some(Retry {
            attempts: 5,
            backoff: Duration::from_secs(1),
        })
    );
}

#[tokio::test]
async fn test_config_file_environment_and_flags() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cmd.toml");
    std::fs::write(
        &path,
        r#"
env_prefix = "cmdkit_it"

[options]
j = 6
attempts = 7
backoff = "250ms"
token = "from-config"
"#,
    )
    .unwrap();

    std::env::set_var("CMDKIT_IT_ATTEMPTS", "8");
    std::env::set_var("CMDKIT_IT_TOKEN", "from-env");

    let fixture = Fixture::new();
    let config = CliConfig::from_toml_file(&path).unwrap();
    let cli = fixture.cli().with_config(&config).unwrap();

    invoke(&cli, &["cmd", "run", "-backoff", "2s"]).await.unwrap();
    std::env::remove_var("CMDKIT_IT_ATTEMPTS");
    std::env::remove_var("CMDKIT_IT_TOKEN");

    let run = fixture.run.last().run.unwrap();
    // configuration beats the default
    assert_eq!(run.workers, 6);
    // environment beats configuration
    assert_eq!(run.retry.attempts, 8);
    // the command line beats everything
    assert_eq!(run.retry.backoff, Duration::from_secs(2));
    // flag-only fields ignore both
    assert_eq!(run.token, "");
}

#[tokio::test]
async fn test_bad_configured_value() {
    let fixture = Fixture::new();
    let cli = fixture
        .cli()
        .with_sources(Sources::new().with_text("backoff", "soon"));

    let err = invoke(&cli, &["cmd", "run"]).await.unwrap_err();
    assert!(matches!(err.parse_error(), Some(ParseError::Source { .. })));
    assert!(err.to_string().contains("-backoff from configuration"));
}

#[tokio::test]
async fn test_hooks_run_in_order_once() {
    let fixture = Fixture::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let (a, b, c, d) = (log.clone(), log.clone(), log.clone(), log.clone());
    let cli = fixture.cli().with_hooks(
        Hooks::new()
            .pre_parse(move |_| {
                a.lock().unwrap().push("pre-parse");
                Ok(())
            })
            .post_parse(move |_| {
                b.lock().unwrap().push("post-parse");
                Ok(())
            })
            .pre_execute(move |_| {
                c.lock().unwrap().push("pre-execute");
                Ok(())
            })
            .post_execute(move |_, _| {
                d.lock().unwrap().push("post-execute");
                Ok(())
            }),
    );

    invoke(&cli, &["cmd", "list"]).await.unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["pre-parse", "post-parse", "pre-execute", "post-execute"]
    );
}

#[tokio::test]
async fn test_cancel_before_parse_completes() {
    let fixture = Fixture::new();
    let token = CancellationToken::new();
    let trigger = token.clone();
    let cli = fixture.cli().with_hooks(Hooks::new().pre_parse(move |_| {
        trigger.cancel();
        Ok(())
    }));

    let err = cli.invoke(&token, line(&["cmd", "list"])).await.unwrap_err();
    assert_eq!(err.interrupt(), Some(Interrupt::Cancelled));
    assert_eq!(fixture.list.count(), 0);
}

#[tokio::test]
async fn test_expired_budget() {
    let fixture = Fixture::new();
    let budget = Budget::default().with_deadline(tokio::time::Instant::now());
    let err = fixture
        .cli()
        .invoke_with(&budget, line(&["cmd", "list"]))
        .await
        .unwrap_err();
    assert_eq!(err.interrupt(), Some(Interrupt::DeadlineExceeded));
}

#[tokio::test]
async fn test_help_request() {
    let fixture = Fixture::new();
    let err = invoke(&fixture.cli(), &["cmd", "run", "-help"]).await.unwrap_err();
    match err.parse_error() {
        Some(ParseError::Help { usage }) => {
            assert!(usage.starts_with("usage: cmd run [flags] [args...]"));
            assert!(usage.contains("-j int"));
            assert!(usage.contains("(default 3)"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_parse_directly() {
    let fixture = Fixture::new();
    let cli = fixture.cli();
    let invocation = cli
        .parse(&line(&["cmd", "run", "x"]), &Budget::default())
        .unwrap();
    assert_eq!(invocation.path(), &["cmd", "run"]);
    assert_eq!(invocation.args(), &["x"]);
    assert_eq!(invocation.get::<RunOptions>().unwrap().workers, 1);
}
