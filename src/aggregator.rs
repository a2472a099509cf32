//! Analysis fan-out and report aggregation
//!
//! The aggregator owns one instance of each analyzer and is handed its
//! narrative backend at construction, so tests can swap any piece. A report
//! is immutable once built; comparison over a batch only reads.

use crate::analyzers::criteria::CustomCriteriaAnalysis;
use crate::analyzers::education::EducationAnalysis;
use crate::analyzers::experience::ExperienceAnalysis;
use crate::analyzers::location::LocationAnalysis;
use crate::analyzers::red_flags::RedFlagAnalysis;
use crate::analyzers::skills::SkillsAnalysis;
use crate::analyzers::{
    CustomCriteriaAnalyzer, EducationAnalyzer, ExperienceAnalyzer, LocationAnalyzer,
    RedFlagAnalyzer, SkillsAnalyzer,
};
use crate::catalog::SkillsCatalog;
use crate::config::{AppConfig, JobSpec, ScoringWeights};
use crate::enrichment::{NarrativeAnalyzer, NarrativeReport};
use crate::error::Result;
use crate::profile::CandidateProfile;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const MAX_SUMMARY_RECOMMENDATIONS: usize = 5;
const STRENGTH_CATEGORY_THRESHOLD: f32 = 80.0;
const HIGH_RISK_THRESHOLD: f32 = 60.0;
const STANDOUT_OVERALL: f32 = 80.0;
const STANDOUT_EXPERIENCE: f32 = 85.0;

/// One candidate as fed into the pipeline.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Full plain text of the candidate's documents.
    pub text: String,
    pub profile: CandidateProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Strong,
    Good,
    Moderate,
    Weak,
}

impl Verdict {
    fn from_band(band: f32) -> Self {
        if band >= 80.0 {
            Verdict::Strong
        } else if band >= 70.0 {
            Verdict::Good
        } else if band >= 60.0 {
            Verdict::Moderate
        } else {
            Verdict::Weak
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReport {
    pub candidate_id: String,
    pub candidate_name: String,
    /// Weighted blend of the component scores, renormalized over the
    /// dimensions the job actually constrains.
    pub overall_score: f32,
    pub verdict: Verdict,
    pub summary: Summary,
    pub skills: SkillsAnalysis,
    pub experience: ExperienceAnalysis,
    pub education: EducationAnalysis,
    pub location: Option<LocationAnalysis>,
    pub criteria: Option<CustomCriteriaAnalysis>,
    pub red_flags: RedFlagAnalysis,
    pub narrative: Option<NarrativeReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub candidate_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub candidate_id: String,
    pub candidate_name: String,
    pub overall_score: f32,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub ranking: Vec<RankingEntry>,
    /// Required skills matched by exactly one candidate, keyed by candidate id.
    pub unique_strengths: HashMap<String, Vec<String>>,
    pub strength_notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Sorted by overall score descending, candidate id as tiebreaker.
    pub reports: Vec<CandidateReport>,
    pub failures: Vec<BatchFailure>,
    pub comparison: Comparison,
}

pub struct AnalysisAggregator {
    weights: ScoringWeights,
    max_concurrency: usize,
    skills: SkillsAnalyzer,
    experience: ExperienceAnalyzer,
    education: EducationAnalyzer,
    location: LocationAnalyzer,
    red_flags: RedFlagAnalyzer,
    criteria: CustomCriteriaAnalyzer,
    narrative: Option<Box<dyn NarrativeAnalyzer>>,
}

impl AnalysisAggregator {
    pub fn new(
        config: &AppConfig,
        catalog: Arc<SkillsCatalog>,
        narrative: Option<Box<dyn NarrativeAnalyzer>>,
    ) -> Self {
        Self {
            weights: config.scoring.clone(),
            max_concurrency: config.batch.max_concurrency.max(1),
            skills: SkillsAnalyzer::new(catalog.clone()),
            experience: ExperienceAnalyzer::new(catalog),
            education: EducationAnalyzer::new(),
            location: LocationAnalyzer::new(),
            red_flags: RedFlagAnalyzer::new(),
            criteria: CustomCriteriaAnalyzer::new(),
            narrative,
        }
    }

    pub async fn analyze_candidate(
        &self,
        candidate: &Candidate,
        job: &JobSpec,
        today: NaiveDate,
    ) -> Result<CandidateReport> {
        let profile = &candidate.profile;

        let skills = self.skills.analyze(&candidate.text, &job.required_skills);
        let experience = self.experience.analyze(&profile.experiences, &job.experience);
        let education = self.education.analyze(
            &profile.education,
            &profile.certifications,
            &job.education,
            today,
        );
        let red_flags =
            self.red_flags
                .analyze(&profile.experiences, &profile.education, &profile.certifications);

        let mobility = profile.mobility.clone().unwrap_or_default();
        let location = match (&job.location, &profile.location) {
            (Some(job_location), Some(candidate_location)) => {
                Some(self.location.analyze(candidate_location, &mobility, job_location))
            }
            _ => None,
        };

        let criteria = if job.custom_criteria.is_empty() {
            None
        } else {
            Some(self.criteria.analyze(&candidate.text, &job.custom_criteria))
        };

        let narrative = self.narrate(candidate, job).await;

        let parts = self.score_parts(job, &skills, &experience, &education, &location, &criteria);
        let overall_score = weighted_blend(&parts);

        let mut band_parts = parts;
        band_parts.push((self.weights.risk, 100.0 - red_flags.overall_risk));
        let verdict = Verdict::from_band(weighted_blend(&band_parts));

        let summary = self.summarize(
            &skills, &experience, &education, &location, &criteria, &red_flags,
        );

        Ok(CandidateReport {
            candidate_id: candidate.id.clone(),
            candidate_name: candidate.name.clone(),
            overall_score,
            verdict,
            summary,
            skills,
            experience,
            education,
            location,
            criteria,
            red_flags,
            narrative,
        })
    }

    /// Analyze a batch with bounded concurrency, then rank and compare.
    pub async fn analyze_multiple(
        self: Arc<Self>,
        candidates: Vec<Candidate>,
        job: Arc<JobSpec>,
        today: NaiveDate,
    ) -> BatchOutcome {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            let aggregator = self.clone();
            let job = job.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = aggregator.analyze_candidate(&candidate, &job, today).await;
                (candidate.id, outcome)
            });
        }

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(report))) => reports.push(report),
                Ok((id, Err(e))) => {
                    log::warn!("Analysis failed for candidate '{}': {}", id, e);
                    failures.push(BatchFailure {
                        candidate_id: id,
                        error: e.to_string(),
                    });
                }
                Err(e) => log::warn!("Analysis task aborted: {}", e),
            }
        }

        reports.sort_by(|a, b| {
            b.overall_score
                .total_cmp(&a.overall_score)
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });

        let comparison = compare(&reports);
        BatchOutcome {
            reports,
            failures,
            comparison,
        }
    }

    async fn narrate(&self, candidate: &Candidate, job: &JobSpec) -> Option<NarrativeReport> {
        let backend = self.narrative.as_ref()?;
        let job_text = job.description.as_deref()?;
        match backend.narrate(&candidate.text, job_text).await {
            Ok(report) => Some(report),
            Err(e) => {
                // Enrichment is best effort; heuristic scores stand on their own.
                log::warn!(
                    "Narrative backend '{}' failed for candidate '{}': {}",
                    backend.name(),
                    candidate.id,
                    e
                );
                None
            }
        }
    }

    /// (weight, score) pairs for the dimensions this job constrains.
    fn score_parts(
        &self,
        job: &JobSpec,
        skills: &SkillsAnalysis,
        experience: &ExperienceAnalysis,
        education: &EducationAnalysis,
        location: &Option<LocationAnalysis>,
        criteria: &Option<CustomCriteriaAnalysis>,
    ) -> Vec<(f32, f32)> {
        let mut parts = Vec::new();
        if !job.required_skills.is_empty() {
            parts.push((self.weights.skills, skills.score));
        }
        if !job.experience.roles.is_empty()
            || job.experience.min_years_total > 0.0
            || !job.experience.required_skills.is_empty()
        {
            parts.push((self.weights.experience, experience.score));
        }
        if !job.education.degrees.is_empty()
            || !job.education.required_certifications.is_empty()
            || job.education.minimum_degree_level.is_some()
        {
            parts.push((self.weights.education, education.score));
        }
        if let Some(location) = location {
            parts.push((self.weights.location, location.score));
        }
        if let Some(criteria) = criteria {
            parts.push((self.weights.criteria, criteria.score));
        }
        parts
    }

    fn summarize(
        &self,
        skills: &SkillsAnalysis,
        experience: &ExperienceAnalysis,
        education: &EducationAnalysis,
        location: &Option<LocationAnalysis>,
        criteria: &Option<CustomCriteriaAnalysis>,
        red_flags: &RedFlagAnalysis,
    ) -> Summary {
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        let categories: &[(&str, Option<f32>)] = &[
            ("skills coverage", Some(skills.score)),
            ("relevant experience", Some(experience.score)),
            ("education background", Some(education.score)),
            ("location fit", location.as_ref().map(|l| l.score)),
            ("custom criteria", criteria.as_ref().map(|c| c.score)),
        ];
        for (label, score) in categories {
            if let Some(score) = score {
                if *score >= STRENGTH_CATEGORY_THRESHOLD {
                    strengths.push(format!("Strong {} ({:.0}%)", label, score));
                }
            }
        }

        if !skills.missing.is_empty() {
            weaknesses.push(format!("Missing required skills: {}", skills.missing.join(", ")));
        }
        if experience.duration_gap {
            weaknesses.push(format!(
                "Relevant experience below requirement ({} of {} months)",
                experience.total_relevant_months, experience.required_months
            ));
        }
        if red_flags.overall_risk > HIGH_RISK_THRESHOLD {
            weaknesses.push(format!(
                "Elevated risk profile ({:.0}, {} flags)",
                red_flags.overall_risk,
                red_flags.flags.len()
            ));
        }

        let mut recommendations = Vec::new();
        let mut seen = HashSet::new();
        let sources = skills
            .recommendations
            .iter()
            .chain(&experience.recommendations)
            .chain(&education.recommendations)
            .chain(location.iter().flat_map(|l| &l.recommendations))
            .chain(criteria.iter().flat_map(|c| &c.recommendations));
        for rec in sources {
            if seen.insert(rec.clone()) {
                recommendations.push(rec.clone());
            }
            if recommendations.len() == MAX_SUMMARY_RECOMMENDATIONS {
                break;
            }
        }

        Summary {
            strengths,
            weaknesses,
            recommendations,
        }
    }
}

/// Weight-renormalized blend; empty input scores 0.
fn weighted_blend(parts: &[(f32, f32)]) -> f32 {
    let weight_total: f32 = parts.iter().map(|(w, _)| w).sum();
    if weight_total <= 0.0 {
        return 0.0;
    }
    let weighted: f32 = parts.iter().map(|(w, s)| w * s).sum();
    (weighted / weight_total).round()
}

fn compare(reports: &[CandidateReport]) -> Comparison {
    let ranking = reports
        .iter()
        .enumerate()
        .map(|(i, r)| RankingEntry {
            rank: i + 1,
            candidate_id: r.candidate_id.clone(),
            candidate_name: r.candidate_name.clone(),
            overall_score: r.overall_score,
            verdict: r.verdict,
        })
        .collect();

    let mut unique_strengths = HashMap::new();
    for report in reports {
        let mut unique = Vec::new();
        for m in &report.skills.matches {
            let elsewhere = reports.iter().any(|other| {
                other.candidate_id != report.candidate_id
                    && other
                        .skills
                        .matches
                        .iter()
                        .any(|om| om.required_skill == m.required_skill)
            });
            if !elsewhere {
                unique.push(m.required_skill.clone());
            }
        }
        if !unique.is_empty() {
            unique_strengths.insert(report.candidate_id.clone(), unique);
        }
    }

    let mut strength_notes = Vec::new();
    for report in reports {
        if report.overall_score >= STANDOUT_OVERALL {
            strength_notes.push(format!(
                "{} is a strong overall match ({:.0}%)",
                report.candidate_name, report.overall_score
            ));
        } else if report.experience.score >= STANDOUT_EXPERIENCE {
            strength_notes.push(format!(
                "{} brings standout experience depth ({:.0}%)",
                report.candidate_name, report.experience.score
            ));
        }
    }

    Comparison {
        ranking,
        unique_strengths,
        strength_notes,
    }
}
