use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};

use assess_core::model::{AnswerCopyId, QuestionId, RubricItem, ScoreSheet, StudentId, TestId, TopicId};
use services::{
    ClientConfig, Clock, GradingService, HttpApi, ResultSink, ResultSource, TestSource,
};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    InvalidMark { raw: String },
    MissingStudent,
    MissingAnswerCopy,
    NoMarks,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw:?}"),
            ArgsError::InvalidMark { raw } => {
                write!(f, "invalid --mark value: {raw} (expected <question>=<score>/<max>[@<topic>])")
            }
            ArgsError::MissingStudent => {
                write!(f, "a student is required (--student-id or ASSESS_STUDENT_ID)")
            }
            ArgsError::MissingAnswerCopy => write!(f, "grade requires --answer-copy"),
            ArgsError::NoMarks => write!(f, "grade requires at least one --mark"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui    [--api-url <url>] --student-id <id> [--test-id <id>]");
    eprintln!("  cargo run -p app -- grade [--api-url <url>] --answer-copy <id> --mark <q>=<score>/<max>[@<topic>]... [--feedback <text>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url {}", ClientConfig::DEFAULT_BASE_URL);
    eprintln!();
    eprintln!("Environment (.env is read when present):");
    eprintln!("  ASSESS_API_URL, ASSESS_API_TOKEN, ASSESS_TIMEOUT_SECS, ASSESS_TICK_MS,");
    eprintln!("  ASSESS_STUDENT_ID, ASSESS_TEST_ID, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Grade,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "grade" => Some(Self::Grade),
            _ => None,
        }
    }
}

struct UiArgs {
    config: ClientConfig,
    student_id: StudentId,
    test_id: Option<TestId>,
}

struct GradeArgs {
    config: ClientConfig,
    answer_copy_id: AnswerCopyId,
    marks: Vec<Mark>,
    feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Mark {
    question_id: QuestionId,
    score: i64,
    max_score: u32,
    topic_id: Option<TopicId>,
}

fn parse_id<T>(
    flag: &'static str,
    raw: String,
    parse: impl FnOnce(String) -> Result<T, assess_core::model::ParseIdError>,
) -> Result<T, ArgsError> {
    parse(raw.clone()).map_err(|_| ArgsError::InvalidId { flag, raw })
}

/// `q1=7/10` or `q1=7/10@algebra`.
fn parse_mark(raw: &str) -> Result<Mark, ArgsError> {
    let invalid = || ArgsError::InvalidMark { raw: raw.to_string() };
    let (question, rest) = raw.split_once('=').ok_or_else(invalid)?;
    let (marks, topic) = match rest.split_once('@') {
        Some((marks, topic)) => (marks, Some(topic)),
        None => (rest, None),
    };
    let (score, max) = marks.split_once('/').ok_or_else(invalid)?;

    Ok(Mark {
        question_id: QuestionId::new(question).map_err(|_| invalid())?,
        score: score.trim().parse().map_err(|_| invalid())?,
        max_score: max.trim().parse().map_err(|_| invalid())?,
        topic_id: topic
            .map(TopicId::new)
            .transpose()
            .map_err(|_| invalid())?,
    })
}

fn parse_api_flag(
    arg: &str,
    args: &mut impl Iterator<Item = String>,
    config: &mut ClientConfig,
) -> Result<bool, ArgsError> {
    match arg {
        "--api-url" => {
            let value = require_value(args, "--api-url")?;
            if value.trim().is_empty() {
                return Err(ArgsError::InvalidId {
                    flag: "--api-url",
                    raw: value,
                });
            }
            config.base_url = value;
            Ok(true)
        }
        "--help" | "-h" => {
            print_usage();
            std::process::exit(0);
        }
        _ => Ok(false),
    }
}

impl UiArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut config = ClientConfig::from_env();
        let mut student_id = std::env::var("ASSESS_STUDENT_ID").ok();
        let mut test_id = std::env::var("ASSESS_TEST_ID").ok();

        while let Some(arg) = args.next() {
            if parse_api_flag(&arg, args, &mut config)? {
                continue;
            }
            match arg.as_str() {
                "--student-id" => student_id = Some(require_value(args, "--student-id")?),
                "--test-id" => test_id = Some(require_value(args, "--test-id")?),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let student_id = student_id
            .filter(|value| !value.trim().is_empty())
            .ok_or(ArgsError::MissingStudent)?;
        Ok(Self {
            config,
            student_id: parse_id("--student-id", student_id, StudentId::new)?,
            test_id: test_id
                .filter(|value| !value.trim().is_empty())
                .map(|raw| parse_id("--test-id", raw, TestId::new))
                .transpose()?,
        })
    }
}

impl GradeArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut config = ClientConfig::from_env();
        let mut answer_copy_id = None;
        let mut marks = Vec::new();
        let mut feedback = String::new();

        while let Some(arg) = args.next() {
            if parse_api_flag(&arg, args, &mut config)? {
                continue;
            }
            match arg.as_str() {
                "--answer-copy" => {
                    let raw = require_value(args, "--answer-copy")?;
                    answer_copy_id = Some(parse_id("--answer-copy", raw, AnswerCopyId::new)?);
                }
                "--mark" => marks.push(parse_mark(&require_value(args, "--mark")?)?),
                "--feedback" => feedback = require_value(args, "--feedback")?,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if marks.is_empty() {
            return Err(ArgsError::NoMarks);
        }
        Ok(Self {
            config,
            answer_copy_id: answer_copy_id.ok_or(ArgsError::MissingAnswerCopy)?,
            marks,
            feedback,
        })
    }
}

struct DesktopApp {
    student_id: StudentId,
    launch_test_id: Option<TestId>,
    tick_interval: Duration,
    api: Arc<HttpApi>,
}

impl UiApp for DesktopApp {
    fn student_id(&self) -> StudentId {
        self.student_id.clone()
    }

    fn launch_test_id(&self) -> Option<TestId> {
        self.launch_test_id.clone()
    }

    fn clock(&self) -> Clock {
        Clock::default_clock()
    }

    fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    fn tests(&self) -> Arc<dyn TestSource> {
        self.api.clone()
    }

    fn results(&self) -> Arc<dyn ResultSink> {
        self.api.clone()
    }

    fn result_source(&self) -> Arc<dyn ResultSource> {
        self.api.clone()
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn launch_ui(args: UiArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tick_interval = args.config.tick_interval;
    info!(api = %args.config.api_root(), student = %args.student_id, "launching desktop client");
    let api = Arc::new(HttpApi::new(args.config)?);

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        student_id: args.student_id,
        launch_test_id: args.test_id,
        tick_interval,
        api,
    });
    let context = build_app_context(&app);

    // Some dev setups default the window to always-on-top.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Assessments")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

async fn grade(args: GradeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut items = Vec::with_capacity(args.marks.len());
    for mark in &args.marks {
        items.push(RubricItem {
            question_id: mark.question_id.clone(),
            topic_id: mark.topic_id.clone(),
            max_score: mark.max_score,
        });
    }
    let mut sheet = ScoreSheet::new(items)?;
    for mark in &args.marks {
        sheet.set_score(&mark.question_id, mark.score)?;
    }

    let api = Arc::new(HttpApi::new(args.config)?);
    let grading = GradingService::new(api);
    let sent = grading
        .submit(args.answer_copy_id, &sheet, &args.feedback)
        .await?;

    println!(
        "graded {}: {}/{} ({}), {} recommendation(s)",
        sent.answer_copy_id,
        sent.score,
        sheet.total_possible(),
        sent.grade,
        sent.recommendations.len()
    );
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let report = |e: ArgsError| {
        eprintln!("{e}");
        print_usage();
        e
    };
    let mut iter = argv.into_iter();
    match cmd {
        Command::Ui => launch_ui(UiArgs::parse(&mut iter).map_err(report)?),
        Command::Grade => grade(GradeArgs::parse(&mut iter).map_err(report)?).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
