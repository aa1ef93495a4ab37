//! reddit-media-dl - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use reddit_media_dl::{
    cli::Args,
    config::{validate_config, Config},
    download::{BatchDownloader, BatchSummary},
    error::{exit_codes, Error, Result},
    ledger::{ledger_path, load_as_post_sequence, FailureLedger},
    media::HostType,
    output::{
        print_banner, print_batch_summary, print_config_summary, print_error, print_info,
        print_success, print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(summary) if summary.aborted.is_some() => ExitCode::from(exit_codes::ABORTED as u8),
        Ok(_) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Ledger(_) => ExitCode::from(exit_codes::INPUT_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<BatchSummary> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    // Print banner
    print_banner();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            args.config.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);
    let run_config = config.run_config();

    // Load the posts to download
    let posts = load_as_post_sequence(&args.log)?;
    let needs_imgur = posts
        .iter()
        .any(|p| p.effective_host_type() == HostType::Imgur);

    // Validate configuration
    validate_config(&run_config, needs_imgur)?;

    print_config_summary(
        &args.log,
        &run_config.download_directory,
        posts.len(),
        run_config.workers,
    );

    if posts.is_empty() {
        print_warning("No posts to download");
    }

    // Every run gets its own failure log
    let log_path = ledger_path(&run_config.download_directory, chrono::Utc::now());
    let ledger = FailureLedger::create(&log_path, args.describe()).await?;

    let downloader = Arc::new(BatchDownloader::from_config(&run_config, ledger)?);

    // Ctrl-C stops new posts from starting; finished work is already on disk
    let stopper = downloader.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            print_warning("Interrupted, finishing current posts...");
            stopper.stop();
        }
    });

    let summary = downloader.run_batch(posts).await?;

    print_batch_summary(&summary);

    if summary.aborted.is_none() && summary.failed == 0 {
        print_success("All posts processed");
    }

    Ok(summary)
}
