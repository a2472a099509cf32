//! Configuration: application settings and per-job requirement specs

use crate::analyzers::criteria::CustomCriterion;
use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application-level settings, persisted as TOML under the user config dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scoring: ScoringWeights,
    pub batch: BatchConfig,
    pub output: OutputConfig,
}

/// Component weights for the aggregated overall score. Weights of absent
/// components are excluded and the remainder renormalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f32,
    pub experience: f32,
    pub education: f32,
    pub location: f32,
    pub criteria: f32,
    pub risk: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Upper bound on concurrently analyzed candidates in compare mode.
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringWeights::default(),
            batch: BatchConfig { max_concurrency: 4 },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.3,
            experience: 0.3,
            education: 0.2,
            location: 0.1,
            criteria: 0.1,
            risk: 0.1,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Read settings from an explicit path; missing files are an error here,
    /// unlike `load`, which writes out the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| MatcherError::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("candidate-matcher")
            .join("config.toml")
    }
}

/// Everything the pipeline needs to know about one job opening.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSpec {
    pub title: Option<String>,
    /// Free-text job description, passed to the narrative analyzer.
    pub description: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub experience: ExperienceRequirements,
    #[serde(default)]
    pub education: EducationRequirements,
    pub location: Option<JobLocationSpec>,
    #[serde(default)]
    pub custom_criteria: Vec<CustomCriterion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceRequirements {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub min_years_total: f32,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_industries: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationRequirements {
    #[serde(default)]
    pub degrees: Vec<DegreeRequirement>,
    #[serde(default)]
    pub required_certifications: Vec<String>,
    /// Candidate entries below this degree level are skipped entirely.
    pub minimum_degree_level: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DegreeRequirement {
    pub degree: String,
    pub field: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobLocationSpec {
    pub city: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<(f64, f64)>,
    #[serde(default)]
    pub remote_allowed: bool,
    #[serde(default)]
    pub hybrid_allowed: bool,
    pub max_commute_km: Option<f32>,
}

impl JobSpec {
    /// Load a job spec from a TOML or JSON file, chosen by extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let spec = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| MatcherError::Configuration(format!("Failed to parse job spec: {}", e)))?,
            Some("json") => serde_json::from_str(&content)?,
            other => {
                return Err(MatcherError::UnsupportedFormat(format!(
                    "job spec must be .toml or .json, got {:?}",
                    other.unwrap_or("none")
                )))
            }
        };
        Ok(spec)
    }

    /// A spec with no requirements at all is a caller mistake; analyzers
    /// would score everything 0 and the report would be meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.required_skills.is_empty()
            && self.experience.roles.is_empty()
            && self.education.degrees.is_empty()
            && self.custom_criteria.is_empty()
        {
            return Err(MatcherError::InvalidInput(
                "job spec defines no requirements (skills, roles, degrees or criteria)".to_string(),
            ));
        }
        for criterion in &self.custom_criteria {
            if !(0.0..=1.0).contains(&criterion.weight) {
                return Err(MatcherError::InvalidInput(format!(
                    "criterion '{}' has weight {} outside [0, 1]",
                    criterion.name, criterion.weight
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one_without_risk() {
        let w = ScoringWeights::default();
        let sum = w.skills + w.experience + w.education + w.location + w.criteria;
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_job_spec_toml_round_trip() {
        let spec = JobSpec {
            title: Some("Backend Engineer".to_string()),
            required_skills: vec!["rust".to_string(), "postgresql".to_string()],
            ..Default::default()
        };
        let toml = toml::to_string(&spec).unwrap();
        let parsed: JobSpec = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.required_skills, spec.required_skills);
        assert_eq!(parsed.title, spec.title);
    }

    #[test]
    fn test_empty_spec_rejected() {
        assert!(JobSpec::default().validate().is_err());
    }

    #[test]
    fn test_spec_with_skills_validates() {
        let spec = JobSpec {
            required_skills: vec!["rust".to_string()],
            ..Default::default()
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_load_from_explicit_path() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[scoring]\nskills = 0.5\nexperience = 0.2\neducation = 0.1\nlocation = 0.1\ncriteria = 0.1\nrisk = 0.1\n\n[batch]\nmax_concurrency = 2\n\n[output]\nformat = \"Json\"\ndetailed = true\ncolor_output = false\n"
        )
        .unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.batch.max_concurrency, 2);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!((config.scoring.skills - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_load_from_missing_path_is_error() {
        assert!(AppConfig::load_from(Path::new("/nonexistent/config.toml")).is_err());
    }

    #[test]
    fn test_job_spec_from_file() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "required_skills = [\"rust\"]").unwrap();
        let spec = JobSpec::from_file(file.path()).unwrap();
        assert_eq!(spec.required_skills, vec!["rust".to_string()]);
    }

    #[test]
    fn test_job_spec_unknown_extension() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "required_skills: [rust]").unwrap();
        assert!(JobSpec::from_file(file.path()).is_err());
    }
}
