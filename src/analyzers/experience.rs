//! Work-history matching: role relevance, duration coverage, progression

use crate::catalog::SkillsCatalog;
use crate::config::ExperienceRequirements;
use crate::profile::{months_between, Experience};
use crate::similarity::{similarity, token_overlap};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// A role requirement is only matched when the blended relevance reaches this.
const RELEVANCE_THRESHOLD: f32 = 0.6;
const ROLE_SIMILARITY_WEIGHT: f32 = 0.6;
const KEYWORD_OVERLAP_WEIGHT: f32 = 0.4;
/// Tenures shorter than this count as short stints for progression analysis.
const SHORT_TENURE_MONTHS: u32 = 12;

const SENIORITY_KEYWORDS: &[&str] = &[
    "senior", "lead", "principal", "staff", "head", "director", "manager", "chief",
];

pub struct ExperienceAnalyzer {
    catalog: Arc<SkillsCatalog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceMatch {
    pub required_role: String,
    pub matched_role: String,
    pub matched_company: Option<String>,
    pub relevance: f32,
    pub duration_match: f32,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceAnalysis {
    /// 0 to 100 blend of duration coverage, role coverage and skill coverage.
    pub score: f32,
    pub matches: Vec<ExperienceMatch>,
    /// Required roles with no sufficiently relevant experience.
    pub role_gaps: Vec<String>,
    /// Required skills not evidenced by any matched experience.
    pub missing_skills: Vec<String>,
    pub total_relevant_months: u32,
    pub required_months: u32,
    pub duration_gap: bool,
    pub progression: CareerProgression,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerProgression {
    pub trend: ProgressionTrend,
    pub short_tenures: usize,
    pub promotions: usize,
    pub role_changes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressionTrend {
    Positive,
    Stable,
    Irregular,
}

impl ExperienceAnalyzer {
    pub fn new(catalog: Arc<SkillsCatalog>) -> Self {
        Self { catalog }
    }

    pub fn analyze(
        &self,
        experiences: &[Experience],
        requirements: &ExperienceRequirements,
    ) -> ExperienceAnalysis {
        // Newest first; ties in relevance then resolve toward recent work.
        let mut ordered: Vec<&Experience> = experiences.iter().collect();
        ordered.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        let mut matches = Vec::new();
        let mut role_gaps = Vec::new();

        for role in &requirements.roles {
            match self.best_match(role, &ordered, requirements) {
                Some(m) => matches.push(m),
                None => role_gaps.push(role.clone()),
            }
        }

        // Sum of matched durations. Overlapping date ranges are not
        // deduplicated; concurrent roles both count.
        let matched_roles: HashSet<&str> = matches.iter().map(|m| m.matched_role.as_str()).collect();
        let total_relevant_months: u32 = ordered
            .iter()
            .filter(|e| matched_roles.contains(e.role.as_str()))
            .map(|e| e.duration_months)
            .sum();

        let required_months = (requirements.min_years_total * 12.0).round() as u32;
        let duration_gap = total_relevant_months < required_months;

        let covered: HashSet<String> = matches
            .iter()
            .flat_map(|m| m.matching_skills.iter().map(|s| s.to_lowercase()))
            .collect();
        let missing_skills: Vec<String> = requirements
            .required_skills
            .iter()
            .filter(|s| !covered.contains(&s.to_lowercase()))
            .cloned()
            .collect();

        let score = self.overall_score(
            total_relevant_months,
            required_months,
            matches.len(),
            requirements.roles.len(),
            missing_skills.len(),
            requirements.required_skills.len(),
        );

        let progression = self.career_progression(experiences);
        let recommendations =
            self.recommendations(&role_gaps, &missing_skills, duration_gap, required_months);

        ExperienceAnalysis {
            score,
            matches,
            role_gaps,
            missing_skills,
            total_relevant_months,
            required_months,
            duration_gap,
            progression,
            recommendations,
        }
    }

    /// Highest-relevance experience for a required role, if it clears the
    /// acceptance threshold.
    fn best_match(
        &self,
        role: &str,
        ordered: &[&Experience],
        requirements: &ExperienceRequirements,
    ) -> Option<ExperienceMatch> {
        let mut best: Option<(f32, &Experience)> = None;

        for exp in ordered {
            let role_sim = similarity(role, &exp.role);
            let keyword_sim = token_overlap(role, &exp.description);
            let relevance = ROLE_SIMILARITY_WEIGHT * role_sim + KEYWORD_OVERLAP_WEIGHT * keyword_sim;

            if best.map_or(true, |(r, _)| relevance > r) {
                best = Some((relevance, exp));
            }
        }

        let (relevance, exp) = best?;
        if relevance < RELEVANCE_THRESHOLD {
            return None;
        }

        let (matching_skills, missing_skills) = self.resolve_skills(exp, requirements);
        let required_months = (requirements.min_years_total * 12.0).round() as u32;
        let duration_match = if required_months == 0 {
            1.0
        } else {
            (exp.duration_months as f32 / required_months as f32).min(1.0)
        };

        Some(ExperienceMatch {
            required_role: role.to_string(),
            matched_role: exp.role.clone(),
            matched_company: exp.company.clone(),
            relevance,
            duration_match,
            matching_skills,
            missing_skills,
        })
    }

    /// Which required skills this experience evidences, via its skill list or
    /// its description, with synonyms resolved through the catalog.
    fn resolve_skills(
        &self,
        exp: &Experience,
        requirements: &ExperienceRequirements,
    ) -> (Vec<String>, Vec<String>) {
        let haystack = format!("{} {}", exp.description, exp.skills.join(" ")).to_lowercase();
        let mut matching = Vec::new();
        let mut missing = Vec::new();

        for skill in &requirements.required_skills {
            let found = self
                .catalog
                .variants(skill)
                .iter()
                .any(|v| haystack.contains(v.as_str()))
                || exp
                    .skills
                    .iter()
                    .any(|s| self.catalog.is_equivalent(s, skill));
            if found {
                matching.push(skill.clone());
            } else {
                missing.push(skill.clone());
            }
        }
        (matching, missing)
    }

    fn overall_score(
        &self,
        total_months: u32,
        required_months: u32,
        matched_roles: usize,
        required_roles: usize,
        missing_skills: usize,
        required_skills: usize,
    ) -> f32 {
        let duration = if required_months == 0 {
            1.0
        } else {
            (total_months as f32 / required_months as f32).min(1.0)
        };
        let roles = if required_roles == 0 {
            1.0
        } else {
            matched_roles as f32 / required_roles as f32
        };
        let skills = if required_skills == 0 {
            1.0
        } else {
            1.0 - missing_skills as f32 / required_skills as f32
        };
        (100.0 * (0.3 * duration + 0.4 * roles + 0.3 * skills)).round()
    }

    /// Classify the career trend from tenure lengths, promotion transitions
    /// and unrelated role changes.
    pub fn career_progression(&self, experiences: &[Experience]) -> CareerProgression {
        let mut ordered: Vec<&Experience> = experiences.iter().collect();
        ordered.sort_by(|a, b| a.start_date.cmp(&b.start_date));

        let short_tenures = ordered
            .iter()
            .filter(|e| e.duration_months > 0 && e.duration_months < SHORT_TENURE_MONTHS)
            .count();

        let mut promotions = 0;
        let mut role_changes = 0;

        for pair in ordered.windows(2) {
            let (prev, next) = (pair[0], pair[1]);

            if is_promotion(&prev.role, &next.role) && within_months(prev, next, 24) {
                promotions += 1;
            }

            let a = prev.role.to_lowercase();
            let b = next.role.to_lowercase();
            if !a.contains(&b) && !b.contains(&a) && !shares_core_title(&a, &b) {
                role_changes += 1;
            }
        }

        let trend = if promotions >= 1 && short_tenures <= 1 {
            ProgressionTrend::Positive
        } else if !ordered.is_empty() && role_changes > ordered.len() / 2 {
            ProgressionTrend::Irregular
        } else {
            ProgressionTrend::Stable
        };

        CareerProgression {
            trend,
            short_tenures,
            promotions,
            role_changes,
        }
    }

    fn recommendations(
        &self,
        role_gaps: &[String],
        missing_skills: &[String],
        duration_gap: bool,
        required_months: u32,
    ) -> Vec<String> {
        let mut out = Vec::new();
        if !role_gaps.is_empty() {
            out.push(format!("No comparable experience found for: {}", role_gaps.join(", ")));
        }
        if duration_gap && required_months > 0 {
            out.push(format!(
                "Relevant experience falls short of the required {:.1} years",
                required_months as f32 / 12.0
            ));
        }
        if !missing_skills.is_empty() {
            out.push(format!(
                "Required skills not evidenced in work history: {}",
                missing_skills.join(", ")
            ));
        }
        out
    }
}

fn is_promotion(prev_role: &str, next_role: &str) -> bool {
    let prev = prev_role.to_lowercase();
    let next = next_role.to_lowercase();
    SENIORITY_KEYWORDS
        .iter()
        .any(|k| next.contains(k) && !prev.contains(k))
}

fn within_months(prev: &Experience, next: &Experience, months: u32) -> bool {
    match (prev.start_date, next.start_date) {
        (Some(a), Some(b)) => months_between(a, b) <= months,
        _ => false,
    }
}

/// True when two titles share a meaningful word once seniority prefixes are
/// ignored ("Developer" -> "Senior Developer" is not a role change).
fn shares_core_title(a: &str, b: &str) -> bool {
    let core = |title: &str| -> HashSet<String> {
        title
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .filter(|w| !SENIORITY_KEYWORDS.contains(&w.as_str()))
            .collect()
    };
    !core(a).is_disjoint(&core(b))
}
