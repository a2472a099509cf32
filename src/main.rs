//! Candidate matcher: score and rank candidates against a job specification

mod aggregator;
mod analyzers;
mod catalog;
mod cli;
mod config;
mod enrichment;
mod error;
mod extract;
mod input;
mod output;
mod profile;
mod similarity;

use aggregator::{AnalysisAggregator, Candidate};
use catalog::SkillsCatalog;
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use config::{AppConfig, JobSpec, OutputFormat};
use enrichment::KeywordNarrative;
use error::{MatcherError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use input::DocumentLoader;
use log::{error, info};
use output::ReportGenerator;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let loaded = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: AppConfig) -> Result<()> {
    match command {
        Commands::Match {
            candidate,
            job,
            detailed,
            output,
            save,
            catalog,
        } => {
            run_match(&config, &candidate, &job, detailed, &output, save, catalog).await
        }
        Commands::Compare {
            candidates,
            job,
            detailed,
            output,
            save,
            catalog,
        } => {
            run_compare(&config, &candidates, &job, detailed, &output, save, catalog).await
        }
        Commands::Config { action } => run_config(&config, action),
    }
}

async fn run_match(
    config: &AppConfig,
    candidate_path: &Path,
    job_path: &Path,
    detailed: bool,
    output: &str,
    save: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
) -> Result<()> {
    let format = parse_format(output)?;
    validate_candidate_path(candidate_path)?;
    let job = load_job(job_path)?;

    info!("Analyzing {} against '{}'", candidate_path.display(), job_title(&job));

    let mut loader = DocumentLoader::new();
    let today = chrono::Local::now().date_naive();
    let candidate = load_candidate(&mut loader, candidate_path, today).await?;

    let aggregator = build_aggregator(config, catalog_path)?;
    let report = aggregator.analyze_candidate(&candidate, &job, today).await?;

    let generator = ReportGenerator::new(use_colors(config, &format), detailed || config.output.detailed);
    let rendered = generator.render_report(&report, &format)?;
    emit(&rendered, save)
}

async fn run_compare(
    config: &AppConfig,
    candidate_paths: &[PathBuf],
    job_path: &Path,
    detailed: bool,
    output: &str,
    save: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
) -> Result<()> {
    let format = parse_format(output)?;
    let job = Arc::new(load_job(job_path)?);

    let progress = ProgressBar::new(candidate_paths.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut loader = DocumentLoader::new();
    let today = chrono::Local::now().date_naive();
    let mut candidates = Vec::new();
    for path in candidate_paths {
        validate_candidate_path(path)?;
        progress.set_message(path.display().to_string());
        candidates.push(load_candidate(&mut loader, path, today).await?);
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!("Comparing {} candidates for '{}'", candidates.len(), job_title(&job));

    let aggregator = Arc::new(build_aggregator(config, catalog_path)?);
    let outcome = aggregator.analyze_multiple(candidates, job, today).await;

    let generator = ReportGenerator::new(use_colors(config, &format), detailed || config.output.detailed);
    let rendered = generator.render_batch(&outcome, &format)?;
    emit(&rendered, save)
}

fn run_config(config: &AppConfig, action: Option<ConfigAction>) -> Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            println!("Configuration file: {}", AppConfig::config_path().display());
            let rendered = toml::to_string_pretty(config)
                .map_err(|e| MatcherError::Configuration(e.to_string()))?;
            println!("{}", rendered);
        }
        ConfigAction::Reset => {
            AppConfig::default().save()?;
            println!("Configuration reset to defaults");
        }
    }
    Ok(())
}

fn build_aggregator(
    config: &AppConfig,
    catalog_path: Option<PathBuf>,
) -> Result<AnalysisAggregator> {
    let catalog = match catalog_path {
        Some(path) => SkillsCatalog::load(&path)?,
        None => SkillsCatalog::new(),
    };
    Ok(AnalysisAggregator::new(
        config,
        Arc::new(catalog),
        Some(Box::new(KeywordNarrative)),
    ))
}

async fn load_candidate(
    loader: &mut DocumentLoader,
    path: &Path,
    today: chrono::NaiveDate,
) -> Result<Candidate> {
    let text = loader.load_text(path).await?;
    let profile = extract::extract_profile(&text, today);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "candidate".to_string());
    let name = profile.name.clone().unwrap_or_else(|| stem.clone());

    Ok(Candidate {
        id: stem,
        name,
        text,
        profile,
    })
}

fn load_job(path: &Path) -> Result<JobSpec> {
    let job = JobSpec::from_file(path)?;
    job.validate()?;
    Ok(job)
}

fn job_title(job: &JobSpec) -> String {
    job.title.clone().unwrap_or_else(|| "untitled position".to_string())
}

fn parse_format(output: &str) -> Result<OutputFormat> {
    cli::parse_output_format(output).map_err(MatcherError::InvalidInput)
}

fn validate_candidate_path(path: &Path) -> Result<()> {
    cli::validate_file_extension(&path.to_path_buf(), &["pdf", "txt", "md", "markdown"])
        .map_err(|e| MatcherError::InvalidInput(format!("Candidate file: {}", e)))
}

fn use_colors(config: &AppConfig, format: &OutputFormat) -> bool {
    matches!(format, OutputFormat::Console) && config.output.color_output
}

fn emit(rendered: &str, save: Option<PathBuf>) -> Result<()> {
    match save {
        Some(path) => {
            output::save_report_to_file(rendered, &path)?;
            println!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
