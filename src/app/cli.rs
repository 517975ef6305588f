use super::config::ReporterConfig;
use super::reporter::Reporter;
use crate::domain::{
    SessionRequest, TestcaseRequest, TestcaseStatus, parse_baggage, parse_label_args,
};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "greener-reporter", version, about = "CLI tool for Greener reporting", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: ReporterConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create results
    Create {
        #[command(subcommand)]
        command: CreateCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CreateCommands {
    /// Create session
    Session(SessionArgs),
    /// Create test case
    Testcase(TestcaseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// ID for the session
    #[arg(long)]
    pub id: Option<String>,

    /// Description of the session
    #[arg(long)]
    pub description: Option<String>,

    /// Additional metadata as JSON
    #[arg(long)]
    pub baggage: Option<String>,

    /// Labels in `key` or `key=value` format
    #[arg(long = "label", value_name = "LABEL")]
    pub labels: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TestcaseArgs {
    /// Session ID for the test case
    #[arg(long)]
    pub session_id: String,

    /// Name of the test case
    #[arg(long)]
    pub name: String,

    /// Output from the test case
    #[arg(long)]
    pub output: Option<String>,

    /// Class name of the test case
    #[arg(long)]
    pub classname: Option<String>,

    /// File path of the test case
    #[arg(long)]
    pub file: Option<String>,

    /// Test suite name
    #[arg(long)]
    pub testsuite: Option<String>,

    /// Test case status (pass, fail, error, skip)
    #[arg(long, default_value = "pass")]
    pub status: String,

    /// Additional metadata as JSON
    #[arg(long)]
    pub baggage: Option<String>,
}

impl SessionArgs {
    pub fn to_request(&self) -> Result<SessionRequest> {
        let baggage = self.baggage.as_deref().map(parse_baggage).transpose()?;
        let labels = parse_label_args(&self.labels)?;

        Ok(SessionRequest {
            id: self.id.clone(),
            description: self.description.clone(),
            baggage,
            labels: (!labels.is_empty()).then_some(labels),
        })
    }
}

impl TestcaseArgs {
    pub fn to_request(&self) -> Result<TestcaseRequest> {
        let status: TestcaseStatus = self.status.parse()?;
        let baggage = self.baggage.as_deref().map(parse_baggage).transpose()?;

        Ok(TestcaseRequest {
            session_id: self.session_id.clone(),
            testcase_name: self.name.clone(),
            testcase_classname: self.classname.clone(),
            testcase_file: self.file.clone(),
            testsuite: self.testsuite.clone(),
            status,
            output: self.output.clone(),
            baggage,
        })
    }
}

impl Cli {
    /// Config from `--config-file` when given, otherwise from flags and environment.
    pub fn resolve_config(&self) -> Result<ReporterConfig> {
        match &self.config.config_file {
            Some(path) => ReporterConfig::from_file(path)
                .with_context(|| format!("loading configuration from {}", path.display())),
            None => Ok(self.config.clone()),
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;

    match &cli.command {
        Commands::Create { command } => match command {
            CreateCommands::Session(args) => create_session(&config, args),
            CreateCommands::Testcase(args) => create_testcase(&config, args),
        },
    }
}

fn create_session(config: &ReporterConfig, args: &SessionArgs) -> Result<()> {
    let request = args.to_request()?;
    let reporter = Reporter::from_config(config)?;

    let result = reporter.create_session(request);
    reporter.shutdown()?;
    let session = result.context("creating session")?;

    info!("Created session {}", session.id);
    println!("Created session ID: {}", session.id);
    Ok(())
}

fn create_testcase(config: &ReporterConfig, args: &TestcaseArgs) -> Result<()> {
    let testcase = args.to_request()?;
    let reporter = Reporter::from_config(config)?;

    reporter.add_testcase(testcase)?;
    reporter.shutdown()?;

    let mut failures = Vec::new();
    while let Some(err) = reporter.pop_error() {
        warn!("Delivery failed: {}", err);
        failures.push(err);
    }

    match failures.first() {
        None => Ok(()),
        Some(first) => bail!("failed to deliver testcase: {first}"),
    }
}
