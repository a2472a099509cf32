//! CLI interface for the candidate matcher

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "candidate-matcher")]
#[command(about = "Score and rank candidates against a job specification")]
#[command(
    long_about = "Analyze candidate documents against a structured job specification: skills, experience, education, location, custom criteria and red flags, aggregated into a ranked report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a single candidate against a job spec
    Match {
        /// Path to the candidate document (PDF, TXT, MD)
        #[arg(short = 'r', long)]
        candidate: PathBuf,

        /// Path to the job spec file (TOML, JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Output detailed analysis
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long, default_value = "console")]
        output: String,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Skills catalog file (TOML), replacing the built-in catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Analyze and rank several candidates against one job spec
    Compare {
        /// Candidate documents (PDF, TXT, MD)
        #[arg(short = 'r', long, num_args = 1.., required = true)]
        candidates: Vec<PathBuf>,

        /// Path to the job spec file (TOML, JSON)
        #[arg(short, long)]
        job: PathBuf,

        /// Output detailed per-candidate reports after the ranking
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long, default_value = "console")]
        output: String,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Skills catalog file (TOML), replacing the built-in catalog
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        "markdown" | "md" => Ok(crate::config::OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &PathBuf, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_parse_output_format() {
        assert!(matches!(parse_output_format("console"), Ok(OutputFormat::Console)));
        assert!(matches!(parse_output_format("MD"), Ok(OutputFormat::Markdown)));
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(&PathBuf::from("resume.pdf"), &["pdf", "txt"]).is_ok());
        assert!(validate_file_extension(&PathBuf::from("resume.docx"), &["pdf", "txt"]).is_err());
        assert!(validate_file_extension(&PathBuf::from("resume"), &["pdf"]).is_err());
    }

    #[test]
    fn test_cli_parses_match_command() {
        let cli = Cli::try_parse_from([
            "candidate-matcher",
            "match",
            "--candidate",
            "resume.txt",
            "--job",
            "job.toml",
        ])
        .unwrap();
        match cli.command {
            Commands::Match { candidate, job, .. } => {
                assert_eq!(candidate, PathBuf::from("resume.txt"));
                assert_eq!(job, PathBuf::from("job.toml"));
            }
            _ => panic!("expected match command"),
        }
    }
}
