// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_source::{
    CliSettings, CommandLineInput, DataSource, NotionHttpClient, NotionSource, SourceMetrics,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;

/// Sets up logging configuration.
///
/// Console output goes to stderr; stdout carries the JSON lines.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("notion_source.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Cancels `cancel` on Ctrl-C.
fn cancel_on_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling read");
            cancel.cancel();
        }
    });
}

async fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn AsyncWrite + Unpin + Send>> {
    Ok(match path {
        Some(path) => Box::new(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdout()),
    })
}

/// Reads the workspace and writes every item as one JSON line.
async fn execute_read(settings: &CliSettings) -> anyhow::Result<SourceMetrics> {
    let client =
        NotionHttpClient::new(&settings.client).context("Failed to create the Notion client")?;
    let source = NotionSource::new(Arc::new(client), settings.source.clone());

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let mut items = source.read(cancel, settings.request.clone())?;
    let mut writer = BufWriter::new(open_output(settings.output.as_deref()).await?);

    while let Some(item) = items.recv().await {
        let line = serde_json::to_string(&item)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;

    source.close()?;
    Ok(source.metrics())
}

fn report_completion(settings: &CliSettings, metrics: &SourceMetrics) {
    eprintln!("📄 Read {}", metrics);
    if metrics.errors_encountered > 0 {
        eprintln!(
            "⚠️  {} errors were skipped; run with --verbose for details.",
            metrics.errors_encountered
        );
    }
    if let Some(path) = &settings.output {
        eprintln!("✓ Items saved to {}", path.display());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let settings = CliSettings::resolve(cli)?;
    let metrics = execute_read(&settings).await?;
    report_completion(&settings, &metrics);

    Ok(())
}
