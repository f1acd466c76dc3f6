use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use services::prep::{self, ChatCompletionsClient};
use services::{
    AnswerGenerator, GenerationConfig, GenerationPaths, QuizPersistence, QuizService, RandomPicker,
};
use storage::QuestionCatalog;
use storage::repository::Storage;
use tracing::info;

mod logging;
mod quiz_view;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug)]
enum RunError {
    AnswerClientDisabled,
    EmptyCatalog { path: PathBuf },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::AnswerClientDisabled => {
                write!(f, "OPENROUTER_API_KEY is not set; add it to the environment or .env")
            }
            RunError::EmptyCatalog { path } => {
                write!(f, "no questions in {}; run `prepare` first", path.display())
            }
        }
    }
}

impl std::error::Error for RunError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz     [--db <sqlite_url>] [--questions <path>] [--answers <path>]");
    eprintln!("  cargo run -p app -- prepare  [--input <path>] [--output <path>]");
    eprintln!("  cargo run -p app -- generate [--input <path>] [--output <path>] [--progress <path>]");
    eprintln!("                               [--limit <n>] [--budget <usd>] [--model <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://prep.sqlite3");
    eprintln!("  --questions data/fe-questions.json");
    eprintln!("  --answers data/fe-questions-with-answers.json");
    eprintln!("  prepare --input questions.txt --output data/fe-questions.json");
    eprintln!("  generate --budget 3.00");
    eprintln!();
    eprintln!("Environment (a .env file is loaded first):");
    eprintln!("  PREP_DB_URL, PREP_QUESTIONS, PREP_ANSWERS, PREP_LOG");
    eprintln!("  OPENROUTER_API_KEY, PREP_AI_BASE_URL, PREP_AI_MODEL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Prepare,
    Generate,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "prepare" => Some(Self::Prepare),
            "generate" => Some(Self::Generate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct QuizArgs {
    db_url: String,
    questions: PathBuf,
    answers: PathBuf,
}

impl QuizArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(env_or("PREP_DB_URL", "sqlite://prep.sqlite3"));
        let mut questions = PathBuf::from(env_or("PREP_QUESTIONS", "data/fe-questions.json"));
        let mut answers = PathBuf::from(env_or(
            "PREP_ANSWERS",
            "data/fe-questions-with-answers.json",
        ));

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--questions" => questions = require_value(args, "--questions")?.into(),
                "--answers" => answers = require_value(args, "--answers")?.into(),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            questions,
            answers,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PrepareArgs {
    input: PathBuf,
    output: PathBuf,
}

impl PrepareArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut input = PathBuf::from("questions.txt");
        let mut output = PathBuf::from("data/fe-questions.json");

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--input" => input = require_value(args, "--input")?.into(),
                "--output" => output = require_value(args, "--output")?.into(),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { input, output })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct GenerateArgs {
    paths: GenerationPaths,
    limit: Option<usize>,
    budget_usd: Option<f64>,
    model: Option<String>,
}

impl GenerateArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            paths: GenerationPaths::default(),
            limit: None,
            budget_usd: None,
            model: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--input" => parsed.paths.input = require_value(args, "--input")?.into(),
                "--output" => parsed.paths.output = require_value(args, "--output")?.into(),
                "--progress" => parsed.paths.progress = require_value(args, "--progress")?.into(),
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    parsed.limit = Some(parse_number(value, "--limit")?);
                }
                "--budget" => {
                    let value = require_value(args, "--budget")?;
                    parsed.budget_usd = Some(parse_number(value, "--budget")?);
                }
                "--model" => parsed.model = Some(require_value(args, "--model")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn config(&self) -> GenerationConfig {
        let config = GenerationConfig::default().with_limit(self.limit);
        match self.budget_usd {
            Some(usd) => config.with_budget_usd(usd),
            None => config,
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run_quiz(args: QuizArgs) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = QuestionCatalog::load(&args.questions, Some(args.answers.as_path()))?;
    if catalog.is_empty() {
        return Err(RunError::EmptyCatalog {
            path: args.questions,
        }
        .into());
    }

    // Open + migrate SQLite here so core/services stay storage-agnostic.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    info!(db = %args.db_url, questions = catalog.len(), "starting quiz");

    let mut quiz = QuizService::start(
        Arc::new(catalog),
        QuizPersistence::new(storage),
        RandomPicker::new(),
    )
    .await;
    quiz_view::run(&mut quiz).await?;
    Ok(())
}

async fn run_prepare(args: PrepareArgs) -> Result<(), Box<dyn std::error::Error>> {
    let stats = prep::prepare_file(&args.input, &args.output).await?;
    println!("Total questions: {}", stats.total);
    println!("  Easy:   {} ({}%)", stats.easy, stats.percent(stats.easy));
    println!("  Medium: {} ({}%)", stats.medium, stats.percent(stats.medium));
    println!("  Hard:   {} ({}%)", stats.hard, stats.percent(stats.hard));
    println!("  With companies: {}", stats.with_companies);
    println!("Saved to {}", args.output.display());
    Ok(())
}

async fn run_generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ChatCompletionsClient::from_env();
    if let Some(model) = args.model.clone() {
        client = client.with_model(model);
    }
    if !client.enabled() {
        return Err(RunError::AnswerClientDisabled.into());
    }
    info!(model = client.model().unwrap_or_default(), "generating answers");

    let generator = AnswerGenerator::new(Arc::new(client), args.config());
    let report = generator.run(&args.paths).await?;

    println!("Succeeded: {}", report.succeeded);
    println!("Failed:    {}", report.failed);
    println!("Total:     {}", report.total);
    println!("Cost:      ${:.4}", report.cost_usd());
    if report.budget_reached {
        println!("Budget reached; re-run to resume from {}.", args.paths.progress.display());
    } else if report.failed > 0 {
        println!("Re-run to retry the {} failed questions.", report.failed);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means the quiz.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let usage_error = |e: ArgsError| {
        eprintln!("{e}");
        print_usage();
        e
    };

    match cmd {
        Command::Quiz => run_quiz(QuizArgs::parse(&mut iter).map_err(usage_error)?).await,
        Command::Prepare => run_prepare(PrepareArgs::parse(&mut iter).map_err(usage_error)?).await,
        Command::Generate => {
            run_generate(GenerateArgs::parse(&mut iter).map_err(usage_error)?).await
        }
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    logging::init_tracing();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
