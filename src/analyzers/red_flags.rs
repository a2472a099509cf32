//! Risk detection: timeline gaps and profile consistency checks

use crate::profile::{months_between, Certification, Education, Experience};
use crate::similarity::{similarity, tokens};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Employment gaps up to this many months are normal and never flagged.
const GAP_IGNORE_MONTHS: u32 = 3;
const GAP_WARNING_MONTHS: u32 = 6;
const GAP_CRITICAL_MONTHS: u32 = 12;

const SHORT_TENURE_MONTHS: u32 = 12;
const RAPID_PROMOTION_WINDOW_MONTHS: u32 = 24;
const SINGLE_MENTION_SKILL_LIMIT: usize = 3;
const CERT_PRIOR_EXPERIENCE_MONTHS: u32 = 6;
const OVERLAP_HOURS_LIMIT: f32 = 1000.0;
/// Full-time month at 40 h/week.
const HOURS_PER_MONTH: f32 = 40.0 * 52.0 / 12.0;

const SENIORITY_KEYWORDS: &[&str] = &[
    "senior", "lead", "principal", "staff", "head", "director", "manager", "chief",
];

/// Cert-name words that say nothing about the underlying skill.
const CERT_FILLER_WORDS: &[&str] = &[
    "certified", "certificate", "certification", "professional", "associate", "foundation",
];

pub struct RedFlagAnalyzer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagCategory {
    Experience,
    Education,
    Skills,
    General,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedFlag {
    pub severity: Severity,
    pub category: FlagCategory,
    pub description: String,
    pub details: Option<String>,
    /// 0 to 100 contribution to overall risk.
    pub impact: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeGap {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueSeverity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyIssue {
    pub severity: IssueSeverity,
    pub category: FlagCategory,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedFlagAnalysis {
    /// Mean impact across all flags, 0 when there are none.
    pub overall_risk: f32,
    pub flags: Vec<RedFlag>,
    pub time_gaps: Vec<TimeGap>,
}

impl RedFlagAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        experiences: &[Experience],
        education: &[Education],
        certifications: &[Certification],
    ) -> RedFlagAnalysis {
        let time_gaps = self.detect_time_gaps(experiences);

        let mut flags: Vec<RedFlag> = time_gaps.iter().map(gap_to_flag).collect();

        let mut issues = Vec::new();
        issues.extend(self.experience_consistency(experiences));
        issues.extend(self.skill_consistency(experiences, certifications));
        issues.extend(self.education_consistency(experiences, education));
        flags.extend(issues.iter().map(issue_to_flag));

        let overall_risk = if flags.is_empty() {
            0.0
        } else {
            (flags.iter().map(|f| f.impact).sum::<f32>() / flags.len() as f32)
                .round()
                .min(100.0)
        };

        RedFlagAnalysis {
            overall_risk,
            flags,
            time_gaps,
        }
    }

    /// Gaps between consecutive positions, sorted by start date. A gap must
    /// exceed three months to register at all.
    fn detect_time_gaps(&self, experiences: &[Experience]) -> Vec<TimeGap> {
        let mut dated: Vec<&Experience> = experiences
            .iter()
            .filter(|e| e.start_date.is_some() && e.end_date.is_some())
            .collect();
        dated.sort_by_key(|e| e.start_date);

        let mut gaps = Vec::new();
        for pair in dated.windows(2) {
            let prev_end = pair[0].end_date.unwrap();
            let next_start = pair[1].start_date.unwrap();
            if next_start <= prev_end {
                continue;
            }
            let duration_months = calendar_months(prev_end, next_start);
            if duration_months > GAP_IGNORE_MONTHS {
                gaps.push(TimeGap {
                    start_date: prev_end,
                    end_date: next_start,
                    duration_months,
                });
            }
        }
        gaps
    }

    fn experience_consistency(&self, experiences: &[Experience]) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        let short: Vec<&Experience> = experiences
            .iter()
            .filter(|e| e.duration_months > 0 && e.duration_months < SHORT_TENURE_MONTHS)
            .collect();
        if short.len() >= 2 {
            let severity = if short.len() >= 3 {
                IssueSeverity::High
            } else {
                IssueSeverity::Medium
            };
            issues.push(ConsistencyIssue {
                severity,
                category: FlagCategory::Experience,
                description: format!(
                    "{} positions held for less than a year",
                    short.len()
                ),
            });
        }

        let mut ordered: Vec<&Experience> = experiences.iter().collect();
        ordered.sort_by_key(|e| e.start_date);
        for pair in ordered.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let prev_role = prev.role.to_lowercase();
            let next_role = next.role.to_lowercase();
            let promoted = SENIORITY_KEYWORDS
                .iter()
                .any(|k| next_role.contains(k) && !prev_role.contains(k));
            let rapid = match (prev.start_date, next.start_date) {
                (Some(a), Some(b)) => months_between(a, b) <= RAPID_PROMOTION_WINDOW_MONTHS,
                _ => false,
            };
            if promoted && rapid {
                issues.push(ConsistencyIssue {
                    severity: IssueSeverity::Medium,
                    category: FlagCategory::Experience,
                    description: format!(
                        "Rapid transition from '{}' to '{}'",
                        prev.role, next.role
                    ),
                });
            }
        }

        issues
    }

    fn skill_consistency(
        &self,
        experiences: &[Experience],
        certifications: &[Certification],
    ) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        // Skills that show up in exactly one position.
        let mut mention_counts: HashMap<String, usize> = HashMap::new();
        for exp in experiences {
            for skill in &exp.skills {
                *mention_counts.entry(skill.to_lowercase()).or_insert(0) += 1;
            }
        }
        let single_mentions = mention_counts.values().filter(|c| **c == 1).count();
        if single_mentions > SINGLE_MENTION_SKILL_LIMIT {
            issues.push(ConsistencyIssue {
                severity: IssueSeverity::Low,
                category: FlagCategory::Skills,
                description: format!(
                    "{} skills are mentioned in only a single position",
                    single_mentions
                ),
            });
        }

        // Certifications without meaningful prior hands-on experience.
        for cert in certifications {
            let Some(cert_date) = cert.date else { continue };
            let prior = prior_related_months(cert, cert_date, experiences);
            if prior < CERT_PRIOR_EXPERIENCE_MONTHS {
                issues.push(ConsistencyIssue {
                    severity: IssueSeverity::Medium,
                    category: FlagCategory::Skills,
                    description: format!(
                        "Certification '{}' obtained with under {} months of related experience",
                        cert.name, CERT_PRIOR_EXPERIENCE_MONTHS
                    ),
                });
            }
        }

        issues
    }

    fn education_consistency(
        &self,
        experiences: &[Experience],
        education: &[Education],
    ) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();

        for edu in education {
            let (Some(edu_start), Some(edu_end)) = (edu.start_date, edu.end_date) else {
                continue;
            };
            let overlapping_hours: f32 = experiences
                .iter()
                .filter_map(|exp| {
                    let (Some(start), Some(end)) = (exp.start_date, exp.end_date) else {
                        return None;
                    };
                    let overlap_start = start.max(edu_start);
                    let overlap_end = end.min(edu_end);
                    if overlap_end <= overlap_start {
                        return None;
                    }
                    Some(months_between(overlap_start, overlap_end) as f32 * HOURS_PER_MONTH)
                })
                .sum();

            if overlapping_hours > OVERLAP_HOURS_LIMIT {
                issues.push(ConsistencyIssue {
                    severity: IssueSeverity::Medium,
                    category: FlagCategory::Education,
                    description: format!(
                        "Full-time work overlaps the study period at {}",
                        edu.institution
                    ),
                });
            }
        }

        issues
    }
}

impl Default for RedFlagAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Gap length in whole months, rounded to the nearest. Rounding (rather than
/// the ceiling used for tenure durations) keeps an exact 13-calendar-month
/// gap from counting as 14.
fn calendar_months(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let days = (end - start).num_days() as f64;
    (days / 30.44).round() as u32
}

fn gap_to_flag(gap: &TimeGap) -> RedFlag {
    let (severity, impact) = if gap.duration_months > GAP_CRITICAL_MONTHS {
        (Severity::Critical, 80.0)
    } else if gap.duration_months > GAP_WARNING_MONTHS {
        (Severity::Warning, 50.0)
    } else {
        (Severity::Warning, 30.0)
    };
    RedFlag {
        severity,
        category: FlagCategory::Experience,
        description: format!("{}-month employment gap", gap.duration_months),
        details: Some(format!("{} to {}", gap.start_date, gap.end_date)),
        impact,
    }
}

fn issue_to_flag(issue: &ConsistencyIssue) -> RedFlag {
    let (severity, impact) = match issue.severity {
        IssueSeverity::High => (Severity::Critical, 70.0),
        IssueSeverity::Medium => (Severity::Warning, 40.0),
        IssueSeverity::Low => (Severity::Info, 20.0),
    };
    RedFlag {
        severity,
        category: issue.category,
        description: issue.description.clone(),
        details: None,
        impact,
    }
}

/// Months of related hands-on experience accumulated before a certification
/// date. Related means an experience skill resembling a content word of the
/// certification name.
fn prior_related_months(
    cert: &Certification,
    cert_date: NaiveDate,
    experiences: &[Experience],
) -> u32 {
    let cert_tokens: Vec<String> = tokens(&cert.name)
        .into_iter()
        .filter(|t| !CERT_FILLER_WORDS.contains(&t.as_str()))
        .collect();
    if cert_tokens.is_empty() {
        return u32::MAX;
    }

    experiences
        .iter()
        .filter_map(|exp| {
            let start = exp.start_date?;
            if start >= cert_date {
                return None;
            }
            let related = cert_tokens.iter().any(|t| {
                exp.skills.iter().any(|s| similarity(s, t) > 0.7)
                    || exp.description.to_lowercase().contains(t.as_str())
            });
            if !related {
                return None;
            }
            let end = exp.end_date.unwrap_or(cert_date).min(cert_date);
            Some(months_between(start, end))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stint(role: &str, start: NaiveDate, end: NaiveDate) -> Experience {
        Experience::new(role, "").with_dates(start, end)
    }

    fn gap_after(months_gap_days: i64) -> Vec<Experience> {
        let first_end = date(2020, 1, 1);
        let next_start = first_end + chrono::Duration::days(months_gap_days);
        vec![
            stint("Developer", date(2018, 1, 1), first_end),
            stint("Developer", next_start, date(2023, 1, 1)),
        ]
    }

    fn flags_for_gap_days(days: i64) -> RedFlagAnalysis {
        RedFlagAnalyzer::new().analyze(&gap_after(days), &[], &[])
    }

    #[test]
    fn test_three_month_gap_not_flagged() {
        let analysis = flags_for_gap_days(90);
        assert!(analysis.time_gaps.is_empty());
        assert!(analysis.flags.is_empty());
        assert_eq!(analysis.overall_risk, 0.0);
    }

    #[test]
    fn test_four_month_gap_flagged_as_warning() {
        let analysis = flags_for_gap_days(120);
        assert_eq!(analysis.time_gaps.len(), 1);
        assert_eq!(analysis.time_gaps[0].duration_months, 4);
        assert_eq!(analysis.flags[0].severity, Severity::Warning);
        assert_eq!(analysis.flags[0].impact, 30.0);
    }

    #[test]
    fn test_six_month_boundary() {
        let analysis = flags_for_gap_days(181);
        assert_eq!(analysis.time_gaps[0].duration_months, 6);
        assert_eq!(analysis.flags[0].severity, Severity::Warning);
        assert_eq!(analysis.flags[0].impact, 30.0);
    }

    #[test]
    fn test_seven_month_gap_full_warning() {
        let analysis = flags_for_gap_days(212);
        assert_eq!(analysis.time_gaps[0].duration_months, 7);
        assert_eq!(analysis.flags[0].severity, Severity::Warning);
        assert_eq!(analysis.flags[0].impact, 50.0);
    }

    #[test]
    fn test_twelve_month_boundary_still_warning() {
        let analysis = flags_for_gap_days(365);
        assert_eq!(analysis.time_gaps[0].duration_months, 12);
        assert_eq!(analysis.flags[0].severity, Severity::Warning);
        assert_eq!(analysis.flags[0].impact, 50.0);
    }

    #[test]
    fn test_thirteen_month_gap_critical() {
        let analysis = flags_for_gap_days(396);
        assert_eq!(analysis.time_gaps[0].duration_months, 13);
        assert_eq!(analysis.flags[0].severity, Severity::Critical);
        assert_eq!(analysis.flags[0].impact, 80.0);
    }

    #[test]
    fn test_single_short_tenure_no_roles_issue() {
        // 11-month stint followed after a 13-month gap by a long stint:
        // exactly one short tenure, so only the gap is flagged
        let exps = vec![
            stint("Developer", date(2019, 1, 1), date(2019, 12, 1)),
            stint("Senior Developer", date(2021, 1, 1), date(2022, 12, 1)),
        ];
        let analysis = RedFlagAnalyzer::new().analyze(&exps, &[], &[]);
        assert_eq!(analysis.time_gaps.len(), 1);
        assert_eq!(analysis.time_gaps[0].duration_months, 13);
        assert_eq!(analysis.flags.len(), 1);
        assert_eq!(analysis.flags[0].severity, Severity::Critical);
        assert_eq!(analysis.flags[0].impact, 80.0);
    }

    #[test]
    fn test_two_short_tenures_flagged_medium() {
        let exps = vec![
            stint("Developer", date(2019, 1, 1), date(2019, 10, 1)),
            stint("Developer", date(2019, 10, 1), date(2020, 6, 1)),
            stint("Developer", date(2020, 6, 1), date(2023, 6, 1)),
        ];
        let analysis = RedFlagAnalyzer::new().analyze(&exps, &[], &[]);
        let roles_flag = analysis
            .flags
            .iter()
            .find(|f| f.description.contains("positions held"))
            .unwrap();
        assert_eq!(roles_flag.severity, Severity::Warning);
        assert_eq!(roles_flag.impact, 40.0);
    }

    #[test]
    fn test_three_short_tenures_flagged_high() {
        let exps = vec![
            stint("Developer", date(2019, 1, 1), date(2019, 8, 1)),
            stint("Developer", date(2019, 8, 1), date(2020, 2, 1)),
            stint("Developer", date(2020, 2, 1), date(2020, 9, 1)),
        ];
        let analysis = RedFlagAnalyzer::new().analyze(&exps, &[], &[]);
        let roles_flag = analysis
            .flags
            .iter()
            .find(|f| f.description.contains("positions held"))
            .unwrap();
        assert_eq!(roles_flag.severity, Severity::Critical);
        assert_eq!(roles_flag.impact, 70.0);
    }

    #[test]
    fn test_rapid_promotion_flagged() {
        let exps = vec![
            stint("Developer", date(2020, 1, 1), date(2021, 1, 1)),
            stint("Senior Developer", date(2021, 1, 1), date(2023, 1, 1)),
        ];
        let analysis = RedFlagAnalyzer::new().analyze(&exps, &[], &[]);
        assert!(analysis
            .flags
            .iter()
            .any(|f| f.description.contains("Rapid transition")));
    }

    #[test]
    fn test_single_mention_skills_flagged() {
        let mut exps = vec![
            stint("Developer", date(2018, 1, 1), date(2020, 1, 1)),
            stint("Developer", date(2020, 1, 1), date(2023, 1, 1)),
        ];
        exps[0].skills = vec![
            "haskell".to_string(),
            "prolog".to_string(),
            "erlang".to_string(),
            "fortran".to_string(),
        ];
        exps[1].skills = vec!["java".to_string()];
        let analysis = RedFlagAnalyzer::new().analyze(&exps, &[], &[]);
        let flag = analysis
            .flags
            .iter()
            .find(|f| f.description.contains("single position"))
            .unwrap();
        assert_eq!(flag.severity, Severity::Info);
        assert_eq!(flag.impact, 20.0);
    }

    #[test]
    fn test_certification_without_prior_experience() {
        let mut exp = stint("Developer", date(2022, 1, 1), date(2023, 1, 1));
        exp.skills = vec!["kubernetes".to_string()];
        let cert = Certification {
            name: "Kubernetes Administrator".to_string(),
            date: Some(date(2022, 3, 1)),
            ..Default::default()
        };
        let analysis = RedFlagAnalyzer::new().analyze(&[exp], &[], &[cert]);
        assert!(analysis
            .flags
            .iter()
            .any(|f| f.description.contains("Kubernetes Administrator")));
    }

    #[test]
    fn test_certification_with_prior_experience_not_flagged() {
        let mut exp = stint("Developer", date(2018, 1, 1), date(2023, 1, 1));
        exp.skills = vec!["kubernetes".to_string()];
        let cert = Certification {
            name: "Kubernetes Administrator".to_string(),
            date: Some(date(2022, 3, 1)),
            ..Default::default()
        };
        let analysis = RedFlagAnalyzer::new().analyze(&[exp], &[], &[cert]);
        assert!(analysis.flags.is_empty());
    }

    #[test]
    fn test_study_work_overlap_flagged() {
        let exp = stint("Developer", date(2019, 1, 1), date(2021, 1, 1));
        let edu = Education {
            degree: "Bachelor".to_string(),
            field: "Computer Science".to_string(),
            institution: "State University".to_string(),
            start_date: Some(date(2018, 9, 1)),
            end_date: Some(date(2021, 6, 1)),
            ..Default::default()
        };
        let analysis = RedFlagAnalyzer::new().analyze(&[exp], &[edu], &[]);
        assert!(analysis
            .flags
            .iter()
            .any(|f| f.category == FlagCategory::Education));
    }

    #[test]
    fn test_no_flags_means_zero_risk() {
        let exps = vec![stint("Developer", date(2018, 1, 1), date(2023, 1, 1))];
        let analysis = RedFlagAnalyzer::new().analyze(&exps, &[], &[]);
        assert!(analysis.flags.is_empty());
        assert_eq!(analysis.overall_risk, 0.0);
    }

    #[test]
    fn test_overall_risk_is_mean_impact() {
        let analysis = flags_for_gap_days(396); // one critical gap, impact 80
        assert_eq!(analysis.overall_risk, 80.0);
    }
}
