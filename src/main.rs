//! deep-research CLI entry point
//!
//! - `deep-research run <QUERY>` - research a question and print the report
//! - `deep-research init` - write a default configuration file
//! - `deep-research config` - show or validate the configuration

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use deep_research::cli::{
    init::{self, InitConfig, InitResult},
    output::Output,
    report_markdown, Cli, Commands, RunStatus, CANCELLED_EXIT_CODE,
};
use deep_research::utils::toml_config::LoggingConfig;
use deep_research::workflows::ResearchWorkflowBuilder;
use deep_research::{AppError, DeepResearchConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    let colored = !cli.no_color;
    let output = Output { colored };

    match cli.command {
        Commands::Run {
            query,
            output: save_to,
        } => run_research(&cli.config, &query, save_to.as_deref(), cli.verbose, colored)
            .await
            .map(ExitCode::from),

        Commands::Init {
            path,
            force,
            provider,
        } => match init::run(
            InitConfig {
                path,
                force,
                provider,
            },
            &output,
        ) {
            InitResult::Success | InitResult::AlreadyExists => Ok(ExitCode::SUCCESS),
            InitResult::Error(e) => Err(anyhow::anyhow!(e)),
        },

        Commands::Config { validate } => {
            show_config(&cli.config, validate, &output).map(|_| ExitCode::SUCCESS)
        }
    }
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose {
        "deep_research=debug".to_string()
    } else {
        logging.level.clone()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_research(
    config_path: &Path,
    query: &str,
    save_to: Option<&Path>,
    verbose: bool,
    colored: bool,
) -> Result<RunStatus> {
    let config = DeepResearchConfig::load_or_default(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    init_logging(&config.logging, verbose);

    let output = Output { colored };
    output.banner();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let workflow = ResearchWorkflowBuilder::from_config(&config)
        .await?
        .progress(tx)
        .build()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        // First Ctrl-C cancels the run, a second one exits immediately.
        while tokio::signal::ctrl_c().await.is_ok() {
            if on_interrupt.is_cancelled() {
                std::process::exit(i32::from(CANCELLED_EXIT_CODE));
            }
            on_interrupt.cancel();
        }
    });

    let printer = tokio::spawn(async move {
        let output = Output { colored };
        while let Some(event) = rx.recv().await {
            output.progress(&event);
        }
    });

    let result = workflow.run_detailed(query, &cancel).await;
    drop(workflow);
    let _ = printer.await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(AppError::Cancelled) => {
            output.warning("Research cancelled, no report produced");
            return Ok(RunStatus::Cancelled);
        }
        Err(e) => return Err(e.into()),
    };

    if verbose {
        output.header("Run");
        output.kv("run id", &outcome.run_id.to_string());
        for step in &outcome.steps {
            output.kv(
                &step.stage.to_string(),
                &format!("{} ({} ms)", step.detail, step.duration_ms),
            );
        }
        output.kv(
            "scores",
            &format!("{:?} -> report {}", outcome.selection.aggregates, outcome.selection.index),
        );
    }
    if outcome.selection.fell_back {
        output.warning("Evaluation failed, showing the first draft");
    }

    output.report(outcome.report());

    if let Some(path) = save_to {
        std::fs::write(path, report_markdown(query, outcome.report()))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        output.success(&format!("Report saved to {}", path.display()));
    }

    Ok(RunStatus::Completed)
}

fn show_config(path: &Path, validate_only: bool, output: &Output) -> Result<()> {
    if validate_only {
        return match DeepResearchConfig::load(path) {
            Ok(_) => {
                output.success(&format!("{} is valid", path.display()));
                Ok(())
            }
            Err(e) => {
                output.error(&e.to_string());
                Err(e.into())
            }
        };
    }

    let config = DeepResearchConfig::load_or_default(path)?;
    output.header(&format!("Configuration ({})", path.display()));
    eprintln!();
    println!("{}", config.to_toml_string()?);
    Ok(())
}
