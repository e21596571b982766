mod cli;

use avifbatch::{
    codec::AvifCodec,
    config::{self, BatchConfig, Settings},
    conversion, scanner,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, Overrides};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "avifbatch=debug,avifbatch_common=debug".to_string()
        } else {
            "avifbatch=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            overrides,
            dry_run,
            json,
        } => {
            let config = resolve_config(cli.config.as_deref(), overrides)?;
            if dry_run {
                return plan_only(&config);
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert(config, json))
        }
        Commands::Scan { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => config::load_config_or_default(cli.config.as_deref())?.input_dir,
            };
            scan_dir(&dir)
        }
        Commands::Validate { overrides } => validate(cli.config.as_deref(), overrides),
        Commands::Version => {
            println!("avifbatch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Layer defaults, the config file and command-line overrides, then validate.
fn resolve_config(config_path: Option<&Path>, overrides: Overrides) -> Result<BatchConfig> {
    let settings = apply_overrides(config::load_config_or_default(config_path)?, overrides);
    let config = settings
        .into_batch_config()
        .context("Configuration rejected")?;
    Ok(config)
}

fn apply_overrides(mut settings: Settings, overrides: Overrides) -> Settings {
    if let Some(input) = overrides.input {
        settings.input_dir = input;
    }
    if let Some(output) = overrides.output {
        settings.output_dir = output;
    }
    if let Some(jobs) = overrides.jobs {
        settings.concurrency_limit = Some(jobs);
    }
    if let Some(quality) = overrides.quality {
        settings.quality = quality;
    }
    if let Some(speed) = overrides.speed {
        settings.speed = speed;
    }
    settings
}

async fn convert(config: BatchConfig, json: bool) -> Result<()> {
    let codec = Arc::new(AvifCodec::new(config.speed()));
    let report = conversion::convert_directory(&config, codec)
        .await
        .context("Image conversion aborted")?;

    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    if report.total() == 0 {
        println!("No valid images found in the input directory.");
        return Ok(());
    }

    for outcome in report.outcomes() {
        let task = outcome.task();
        match outcome.error_detail() {
            None => println!(
                "✔ Converted: {} -> {}",
                task.input_path().display(),
                task.output_path().display()
            ),
            Some(detail) => println!(
                "✖ Failed to convert {}: {}",
                task.input_path().display(),
                detail
            ),
        }
    }

    println!(
        "\nImage conversion complete: {} of {} succeeded, {} failed ({} waves, {:.1}s)",
        report.succeeded(),
        report.total(),
        report.failed(),
        report.waves(),
        report.elapsed_ms() as f64 / 1000.0
    );

    Ok(())
}

fn plan_only(config: &BatchConfig) -> Result<()> {
    let files = scanner::scan_images(config.input_dir())?;
    if files.is_empty() {
        println!("No valid images found in the input directory.");
        return Ok(());
    }

    let plan = conversion::plan_tasks(files, config);
    let scheduler = conversion::BatchScheduler::new(config.clone(), Arc::new(AvifCodec::default()));

    println!(
        "[DRY RUN] {} images, {} waves of up to {}",
        plan.len(),
        scheduler.wave_count(plan.tasks.len()),
        config.concurrency_limit()
    );
    for task in &plan.tasks {
        println!(
            "  {} -> {}",
            task.input_path().display(),
            task.output_path().display()
        );
    }
    for rejected in &plan.rejected {
        println!(
            "  {} skipped: {}",
            rejected.task.input_path().display(),
            rejected.reason
        );
    }

    Ok(())
}

fn scan_dir(dir: &Path) -> Result<()> {
    let files = scanner::scan_images(dir)?;
    if files.is_empty() {
        println!("No valid images found in {}", dir.display());
        return Ok(());
    }

    for file in &files {
        println!("{}", file.display());
    }
    println!("\n{} images", files.len());

    Ok(())
}

fn validate(config_path: Option<&Path>, overrides: Overrides) -> Result<()> {
    match config_path {
        Some(p) => println!("Validating config: {:?}", p),
        None => println!("No config file specified, checking defaults"),
    }

    let config = resolve_config(config_path, overrides)?;
    println!("✓ Configuration is valid");
    println!("  Input directory: {}", config.input_dir().display());
    println!("  Output directory: {}", config.output_dir().display());
    println!("  Concurrency limit: {}", config.concurrency_limit());
    println!("  Quality: {}", config.quality());
    println!("  Speed: {}", config.speed());

    Ok(())
}
