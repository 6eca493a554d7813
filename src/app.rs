//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - reads settings and installs logging
//! - parses CLI arguments
//! - loads artifacts and runs predictions
//! - prints reports and writes optional outputs

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Cli, Command, EngineerArgs, PredictArgs, SampleArgs, StatusArgs};
use crate::config::{APP_VERSION, DEFAULT_LOG_FILTER, Settings};
use crate::data::{SampleConfig, generate_listings, write_sample_csv};
use crate::error::AppError;
use crate::features::{current_year, engineer};
use crate::predict::{BatchOptions, RowErrorPolicy};

pub mod pipeline;

/// Entry point for the `advisor` binary.
pub fn run() -> Result<(), AppError> {
    let settings = Settings::from_env();
    init_tracing(&settings);

    let cli = Cli::parse();
    tracing::debug!(version = APP_VERSION, "advisor starting");

    let models_dir = cli.models_dir;
    match cli.command {
        Command::Predict(args) => handle_predict(args, models_dir.as_deref()),
        Command::Batch(args) => handle_batch(args, models_dir.as_deref()),
        Command::Engineer(args) => handle_engineer(args),
        Command::Status(args) => handle_status(args, models_dir.as_deref()),
        Command::Sample(args) => handle_sample(args),
    }
}

/// `RUST_LOG` wins; otherwise the configured filter. Logs go to stderr.
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn handle_predict(args: PredictArgs, models_dir: Option<&std::path::Path>) -> Result<(), AppError> {
    let record = args.listing.to_record()?;
    let bundle = pipeline::open_bundle(models_dir);
    let orchestrator = pipeline::orchestrator(bundle, args.models.enabled_models(), args.year);

    let run = pipeline::run_single(&orchestrator, &record, args.show_encoded)?;

    println!("{}", crate::report::format_prediction(&run.result, args.show_engineered));
    if let Some((names, values)) = &run.encoded {
        println!("{}", crate::report::format_encoded(names, values));
    }

    if let Some(path) = &args.json {
        crate::io::write_result_json(path, &run.result)?;
        tracing::info!(path = %path.display(), "wrote prediction JSON");
    }

    Ok(())
}

fn handle_batch(args: BatchArgs, models_dir: Option<&std::path::Path>) -> Result<(), AppError> {
    let bundle = pipeline::open_bundle(models_dir);
    let orchestrator = pipeline::orchestrator(bundle, args.models.enabled_models(), args.year);
    let options = BatchOptions {
        policy: if args.abort_on_error {
            RowErrorPolicy::Abort
        } else {
            RowErrorPolicy::Skip
        },
        parallel: args.parallel,
    };

    let output = pipeline::run_batch(&orchestrator, &args.input, options)?;

    match &args.output {
        Some(path) => {
            crate::io::write_predictions_csv(path, &output)?;
            tracing::info!(path = %path.display(), rows = output.rows.len(), "wrote predictions CSV");
            println!("{}", crate::report::format_batch_summary(&output));
        }
        None => {
            // CSV on stdout, summary on stderr.
            crate::io::write_predictions(std::io::stdout().lock(), &output)?;
            eprintln!("{}", crate::report::format_batch_summary(&output));
        }
    }

    Ok(())
}

fn handle_engineer(args: EngineerArgs) -> Result<(), AppError> {
    let record = args.listing.to_record()?;
    let engineered = engineer(&record, args.year.unwrap_or_else(current_year))?;

    if args.json {
        let text = serde_json::to_string_pretty(&engineered)
            .map_err(|e| AppError::new(4, format!("Failed to serialize engineered record: {e}")))?;
        println!("{text}");
    } else {
        println!("{}", crate::report::format_engineered(&engineered));
    }
    Ok(())
}

fn handle_status(args: StatusArgs, models_dir: Option<&std::path::Path>) -> Result<(), AppError> {
    let bundle = pipeline::open_bundle(models_dir);

    if args.json {
        let value = serde_json::json!({
            "version": bundle.version(),
            "source": bundle.source().map(|p| p.display().to_string()),
            "status": bundle.status(),
            "issues": bundle.issues(),
        });
        let text = serde_json::to_string_pretty(&value)
            .map_err(|e| AppError::new(4, format!("Failed to serialize status: {e}")))?;
        println!("{text}");
    } else {
        println!("{}", crate::report::format_status(&bundle));
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        count: args.count,
        seed: args.seed,
        missing_rate: args.missing_rate,
        max_year: args.max_year.unwrap_or_else(current_year),
    };
    let sample = generate_listings(&config)?;
    write_sample_csv(&args.output, &sample)?;
    tracing::info!(path = %args.output.display(), rows = sample.rows.len(), "wrote sample listings");
    Ok(())
}
