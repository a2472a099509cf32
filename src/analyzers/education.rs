//! Education and certification matching
//!
//! Degree levels come from a fixed hierarchy table (case-insensitive
//! substring lookup); institutions get a prestige weighting from a curated
//! table with a neutral default.

use crate::config::EducationRequirements;
use crate::profile::{Certification, Education};
use crate::similarity::{similarity, token_overlap};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DEGREE_ACCEPT_THRESHOLD: f32 = 0.6;
const CERT_ACCEPT_THRESHOLD: f32 = 0.7;
const FIELD_FUZZY_THRESHOLD: f32 = 0.85;
const DEFAULT_INSTITUTION_RANK: f32 = 0.7;
const EXPIRED_CERT_PENALTY: f32 = 0.5;
const HIGH_CERT_SCORE_BONUS: f32 = 0.2;

/// Degree hierarchy, highest first. Lookup is a case-insensitive substring
/// scan in table order so "PhD in Physics" resolves before "diploma" ever
/// gets a chance to.
const DEGREE_LEVELS: &[(&str, u8)] = &[
    ("phd", 5),
    ("doctorate", 5),
    ("doctoral", 5),
    ("master", 4),
    ("msc", 4),
    ("mba", 4),
    ("m.s.", 4),
    ("bachelor", 3),
    ("bsc", 3),
    ("b.s.", 3),
    ("b.a.", 3),
    ("undergraduate", 3),
    ("associate", 2),
    ("diploma", 1),
    ("high school", 1),
    ("ged", 1),
];

/// Curated institution prestige table. Anything not listed ranks 0.7.
const INSTITUTION_RANKS: &[(&str, f32)] = &[
    ("mit", 1.0),
    ("stanford", 1.0),
    ("harvard", 1.0),
    ("oxford", 1.0),
    ("cambridge", 1.0),
    ("caltech", 1.0),
    ("eth zurich", 0.95),
    ("berkeley", 0.95),
    ("carnegie mellon", 0.95),
    ("princeton", 0.95),
    ("imperial college", 0.9),
    ("cornell", 0.9),
    ("georgia tech", 0.85),
    ("university of toronto", 0.85),
    ("tu munich", 0.85),
];

pub struct EducationAnalyzer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationMatch {
    pub required_degree: String,
    pub required_field: String,
    pub matched_degree: String,
    pub matched_field: String,
    pub matched_institution: String,
    pub relevance: f32,
    pub level_match: f32,
    pub field_match: f32,
    pub institution_ranking: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationMatch {
    pub required: String,
    pub matched: String,
    pub relevance: f32,
    pub expired: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EducationGaps {
    pub degrees: Vec<String>,
    pub fields: Vec<String>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationAnalysis {
    /// 0 to 100: 70% degree matching, 30% certification coverage.
    pub score: f32,
    pub matches: Vec<EducationMatch>,
    pub certification_matches: Vec<CertificationMatch>,
    pub gaps: EducationGaps,
    pub education_score: f32,
    pub certification_score: f32,
    pub recommendations: Vec<String>,
}

/// Degree level from the hierarchy table; 0 when unrecognized.
pub fn degree_level(degree: &str) -> u8 {
    let lower = degree.to_lowercase();
    DEGREE_LEVELS
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, level)| *level)
        .unwrap_or(0)
}

/// Prestige lookup with the neutral default for unknown institutions.
pub fn institution_ranking(institution: &str) -> f32 {
    let lower = institution.to_lowercase();
    INSTITUTION_RANKS
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, rank)| *rank)
        .unwrap_or(DEFAULT_INSTITUTION_RANK)
}

impl EducationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        education: &[Education],
        certifications: &[Certification],
        requirements: &EducationRequirements,
        today: NaiveDate,
    ) -> EducationAnalysis {
        let mut matches = Vec::new();
        let mut gaps = EducationGaps::default();

        for req in &requirements.degrees {
            match self.best_degree_match(education, &req.degree, &req.field, requirements) {
                Some(m) if m.relevance >= DEGREE_ACCEPT_THRESHOLD => matches.push(m),
                _ => {
                    gaps.degrees.push(req.degree.clone());
                    gaps.fields.push(req.field.clone());
                }
            }
        }

        let mut certification_matches = Vec::new();
        for required in &requirements.required_certifications {
            match self.best_certification_match(certifications, required, today) {
                Some(m) if m.relevance >= CERT_ACCEPT_THRESHOLD && !m.expired => {
                    certification_matches.push(m)
                }
                _ => gaps.certifications.push(required.clone()),
            }
        }

        let education_score = if requirements.degrees.is_empty() {
            1.0
        } else {
            matches.iter().map(|m| m.relevance).sum::<f32>() / requirements.degrees.len() as f32
        };
        let certification_score = if requirements.required_certifications.is_empty() {
            1.0
        } else {
            certification_matches.len() as f32 / requirements.required_certifications.len() as f32
        };

        let score = (100.0 * (0.7 * education_score + 0.3 * certification_score)).round();
        let recommendations = self.recommendations(&gaps);

        EducationAnalysis {
            score,
            matches,
            certification_matches,
            gaps,
            education_score,
            certification_score,
            recommendations,
        }
    }

    fn best_degree_match(
        &self,
        education: &[Education],
        required_degree: &str,
        required_field: &str,
        requirements: &EducationRequirements,
    ) -> Option<EducationMatch> {
        let required_level = degree_level(required_degree);
        let mut best: Option<EducationMatch> = None;

        for entry in education {
            let level = degree_level(&entry.degree);
            if let Some(minimum) = requirements.minimum_degree_level {
                if level < minimum {
                    continue;
                }
            }

            let level_match = if required_level == 0 || level >= required_level {
                1.0
            } else {
                level as f32 / required_level as f32
            };
            let field_match = field_similarity(required_field, &entry.field);
            let ranking = institution_ranking(&entry.institution);
            let relevance = 0.4 * level_match + 0.4 * field_match + 0.2 * ranking;

            if best.as_ref().map_or(true, |b| relevance > b.relevance) {
                best = Some(EducationMatch {
                    required_degree: required_degree.to_string(),
                    required_field: required_field.to_string(),
                    matched_degree: entry.degree.clone(),
                    matched_field: entry.field.clone(),
                    matched_institution: entry.institution.clone(),
                    relevance,
                    level_match,
                    field_match,
                    institution_ranking: ranking,
                });
            }
        }
        best
    }

    fn best_certification_match(
        &self,
        certifications: &[Certification],
        required: &str,
        today: NaiveDate,
    ) -> Option<CertificationMatch> {
        let mut best: Option<CertificationMatch> = None;

        for cert in certifications {
            let expired = cert.is_expired(today);
            let mut relevance = similarity(required, &cert.name);
            if expired {
                relevance *= EXPIRED_CERT_PENALTY;
            }
            if matches!(cert.score, Some(s) if s >= 100.0) {
                relevance = (relevance + HIGH_CERT_SCORE_BONUS).min(1.0);
            }

            if best.as_ref().map_or(true, |b| relevance > b.relevance) {
                best = Some(CertificationMatch {
                    required: required.to_string(),
                    matched: cert.name.clone(),
                    relevance,
                    expired,
                });
            }
        }
        best
    }

    fn recommendations(&self, gaps: &EducationGaps) -> Vec<String> {
        let mut out = Vec::new();
        if !gaps.degrees.is_empty() {
            out.push(format!(
                "No matching degree found for: {}",
                gaps.degrees.join(", ")
            ));
        }
        if !gaps.certifications.is_empty() {
            out.push(format!(
                "Missing or expired certifications: {}",
                gaps.certifications.join(", ")
            ));
        }
        out
    }
}

impl Default for EducationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Token-overlap field comparison with a whole-string fuzzy fallback for
/// spelling variants ("Informatics" vs "Informatik").
fn field_similarity(required: &str, candidate: &str) -> f32 {
    let overlap = token_overlap(required, candidate);
    if overlap > 0.0 {
        return overlap;
    }
    let fuzzy = similarity(required, candidate);
    if fuzzy > FIELD_FUZZY_THRESHOLD {
        fuzzy
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DegreeRequirement;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 1, 1)
    }

    fn cs_bachelor() -> Education {
        Education {
            degree: "Bachelor of Science".to_string(),
            field: "Computer Science".to_string(),
            institution: "State University".to_string(),
            ..Default::default()
        }
    }

    fn degree_requirements(degree: &str, field: &str) -> EducationRequirements {
        EducationRequirements {
            degrees: vec![DegreeRequirement {
                degree: degree.to_string(),
                field: field.to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_degree_level_lookup() {
        assert_eq!(degree_level("PhD in Physics"), 5);
        assert_eq!(degree_level("Master of Engineering"), 4);
        assert_eq!(degree_level("bachelor of arts"), 3);
        assert_eq!(degree_level("Associate Degree"), 2);
        assert_eq!(degree_level("High School Diploma"), 1);
        assert_eq!(degree_level("Certificate of Attendance"), 0);
    }

    #[test]
    fn test_institution_ranking_default() {
        assert_eq!(institution_ranking("MIT"), 1.0);
        assert_eq!(institution_ranking("Some Local College"), DEFAULT_INSTITUTION_RANK);
    }

    #[test]
    fn test_matching_degree_accepted() {
        let analysis = EducationAnalyzer::new().analyze(
            &[cs_bachelor()],
            &[],
            &degree_requirements("Bachelor", "Computer Science"),
            today(),
        );
        assert_eq!(analysis.matches.len(), 1);
        let m = &analysis.matches[0];
        assert_eq!(m.level_match, 1.0);
        assert_eq!(m.field_match, 1.0);
        assert_eq!(m.institution_ranking, DEFAULT_INSTITUTION_RANK);
        // 0.4 + 0.4 + 0.2 * 0.7 = 0.94
        assert!((m.relevance - 0.94).abs() < 1e-6);
        assert!(analysis.gaps.degrees.is_empty());
    }

    #[test]
    fn test_higher_degree_satisfies_level() {
        let phd = Education {
            degree: "PhD".to_string(),
            field: "Computer Science".to_string(),
            institution: "MIT".to_string(),
            ..Default::default()
        };
        let analysis = EducationAnalyzer::new().analyze(
            &[phd],
            &[],
            &degree_requirements("Bachelor", "Computer Science"),
            today(),
        );
        assert_eq!(analysis.matches[0].level_match, 1.0);
        assert_eq!(analysis.matches[0].institution_ranking, 1.0);
    }

    #[test]
    fn test_unrelated_field_is_gap() {
        let arts = Education {
            degree: "Bachelor of Arts".to_string(),
            field: "Medieval Literature".to_string(),
            institution: "State University".to_string(),
            ..Default::default()
        };
        let analysis = EducationAnalyzer::new().analyze(
            &[arts],
            &[],
            &degree_requirements("Bachelor", "Computer Science"),
            today(),
        );
        // level 1.0 but field 0: relevance 0.4 + 0.14 = 0.54 < 0.6
        assert!(analysis.matches.is_empty());
        assert_eq!(analysis.gaps.degrees, vec!["Bachelor".to_string()]);
        assert_eq!(analysis.gaps.fields, vec!["Computer Science".to_string()]);
    }

    #[test]
    fn test_minimum_degree_level_skips_entries() {
        let mut requirements = degree_requirements("Master", "Computer Science");
        requirements.minimum_degree_level = Some(4);
        let analysis =
            EducationAnalyzer::new().analyze(&[cs_bachelor()], &[], &requirements, today());
        assert!(analysis.matches.is_empty());
    }

    #[test]
    fn test_no_education_no_cert_requirements() {
        let analysis = EducationAnalyzer::new().analyze(
            &[],
            &[],
            &EducationRequirements::default(),
            today(),
        );
        assert!(analysis.gaps.certifications.is_empty());
        assert_eq!(analysis.certification_score, 1.0);
        assert_eq!(analysis.education_score, 1.0);
        assert_eq!(analysis.score, 100.0);
    }

    #[test]
    fn test_certification_matched() {
        let cert = Certification {
            name: "AWS Certified Solutions Architect".to_string(),
            ..Default::default()
        };
        let requirements = EducationRequirements {
            required_certifications: vec!["AWS Certified Solutions Architect".to_string()],
            ..Default::default()
        };
        let analysis = EducationAnalyzer::new().analyze(&[], &[cert], &requirements, today());
        assert_eq!(analysis.certification_matches.len(), 1);
        assert_eq!(analysis.certification_score, 1.0);
    }

    #[test]
    fn test_expired_certification_is_gap() {
        let cert = Certification {
            name: "AWS Certified Solutions Architect".to_string(),
            expiry_date: Some(date(2020, 1, 1)),
            ..Default::default()
        };
        let requirements = EducationRequirements {
            required_certifications: vec!["AWS Certified Solutions Architect".to_string()],
            ..Default::default()
        };
        let analysis = EducationAnalyzer::new().analyze(&[], &[cert], &requirements, today());
        assert!(analysis.certification_matches.is_empty());
        assert_eq!(
            analysis.gaps.certifications,
            vec!["AWS Certified Solutions Architect".to_string()]
        );
        assert_eq!(analysis.certification_score, 0.0);
    }

    #[test]
    fn test_unmatched_degree_contributes_zero() {
        let requirements = EducationRequirements {
            degrees: vec![
                DegreeRequirement {
                    degree: "Bachelor".to_string(),
                    field: "Computer Science".to_string(),
                },
                DegreeRequirement {
                    degree: "Master".to_string(),
                    field: "Machine Learning".to_string(),
                },
            ],
            ..Default::default()
        };
        let analysis =
            EducationAnalyzer::new().analyze(&[cs_bachelor()], &[], &requirements, today());
        assert_eq!(analysis.matches.len(), 1);
        // one accepted relevance divided by two required degrees
        assert!(analysis.education_score < 0.5);
    }
}
