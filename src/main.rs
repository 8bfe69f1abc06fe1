use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_summarizer::cli::{Cli, Commands, OutputFormat};
use video_summarizer::config::Config;
use video_summarizer::pipeline::{MediaInput, SummaryPipeline};
use video_summarizer::storage::{JsonDirStore, SummaryStore};
use video_summarizer::summarize::SummaryOptions;
use video_summarizer::{output, utils};

fn init_tracing(verbose: bool, json_logs: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("video_summarizer=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "video_summarizer=info".into())
    };

    let (plain, json) = if json_logs {
        (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
    } else {
        (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();
}

fn spinner(quiet: bool, message: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}

fn open_store(config: &Config) -> Result<Arc<dyn SummaryStore>> {
    Ok(Arc::new(JsonDirStore::new(config.data_dir()?)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Summarize {
            input,
            format,
            length,
            language,
            sentiment,
            output,
            output_format,
        } => {
            // Reject bad input before touching configuration or the network
            let input = MediaInput::from_arg(&input);
            input.precheck()?;

            let config = Config::load().await?;

            let missing_deps = utils::check_dependencies(&config).await;
            if !missing_deps.is_empty() {
                eprintln!("{}", style("Dependency check warnings:").yellow());
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            let options = SummaryOptions::from_raw(&format, &length, &language, sentiment);

            // One spinner for the whole run; transcription polling reuses it
            let progress = spinner(cli.quiet, "Summarizing video...");
            let result = match SummaryPipeline::from_config(&config, progress.clone()).await {
                Ok(pipeline) => pipeline.produce_summary(input, options).await.map_err(|e| {
                    tracing::error!("Summary failed at the {} stage", e.stage());
                    anyhow::Error::from(e)
                }),
                Err(e) => Err(e),
            };
            progress.finish_and_clear();

            let record = result?;

            let format = output_format
                .unwrap_or_else(|| OutputFormat::from_config(&config.app.default_output_format));
            match output {
                Some(path) => {
                    output::save_to_file(&record, &path, &format).await?;
                    println!("Summary saved to: {}", path.display());
                }
                None => output::print_to_console(&record, &format)?,
            }
            eprintln!("{} {}", style("Summary id:").dim(), record.id);
        }
        Commands::List => {
            let config = Config::load().await?;
            let records = open_store(&config)?.list().await?;
            output::print_record_list(&records);
        }
        Commands::Show { id, output_format } => {
            let config = Config::load().await?;
            let record = open_store(&config)?
                .get(&id)
                .await?
                .with_context(|| format!("No summary with id {}", id))?;

            let format = output_format
                .unwrap_or_else(|| OutputFormat::from_config(&config.app.default_output_format));
            output::print_to_console(&record, &format)?;
        }
        Commands::Delete { id } => {
            let config = Config::load().await?;
            if open_store(&config)?.delete(&id).await? {
                println!("Deleted summary {}", id);
            } else {
                anyhow::bail!("No summary with id {}", id);
            }
        }
        Commands::Export {
            id,
            output,
            output_format,
        } => {
            let config = Config::load().await?;
            let record = open_store(&config)?
                .get(&id)
                .await?
                .with_context(|| format!("No summary with id {}", id))?;

            let path = output.unwrap_or_else(|| {
                PathBuf::from(utils::export_filename(
                    record.title(),
                    &record.id,
                    output_format.extension(),
                ))
            });
            output::save_to_file(&record, &path, &output_format).await?;
            println!("Summary exported to: {}", path.display());
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!("Configuration file:");
                println!("  {}", Config::config_path()?.display());
                println!("Edit it to set the S3 bucket, API key and tool paths.");
            }
        }
        Commands::Formats => {
            println!("{}", style("Supported inputs:").bold());
            println!("  • YouTube URLs (youtube.com/watch?v=, youtu.be/, embed links)");
            println!("  • Local video files (mp4, avi, mov, mkv)");
            println!();
            println!("{}", style("Summary formats:").bold());
            println!("  • bullet_points (default)");
            println!("  • narrative");
            println!("  • markdown");
            println!();
            println!("{}", style("Summary lengths:").bold());
            println!("  • short (100-150 words)");
            println!("  • medium (200-300 words, default)");
            println!("  • long (400-500 words)");
            println!();
            println!("{}", style("Output formats:").bold());
            println!("  • text, json, markdown");
        }
    }

    Ok(())
}
