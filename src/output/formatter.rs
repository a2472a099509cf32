//! Output formatters: colored console, JSON, markdown

use crate::aggregator::{BatchOutcome, CandidateReport, Verdict};
use crate::config::OutputFormat;
use crate::error::Result;
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &CandidateReport) -> Result<String>;
    fn format_batch(&self, outcome: &BatchOutcome) -> Result<String>;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

/// Routes a report to the formatter for the configured output format.
pub struct ReportGenerator {
    console: ConsoleFormatter,
    json: JsonFormatter,
    markdown: MarkdownFormatter,
}

fn verdict_label(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Strong => "STRONG MATCH",
        Verdict::Good => "GOOD MATCH",
        Verdict::Moderate => "MODERATE MATCH",
        Verdict::Weak => "WEAK MATCH",
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{}\n", title.blue().bold())
        } else {
            format!("\n{}\n", title)
        }
    }

    fn score_color(score: f32) -> Color {
        if score >= 80.0 {
            Color::Green
        } else if score >= 60.0 {
            Color::Yellow
        } else {
            Color::Red
        }
    }

    fn score_line(&self, label: &str, score: f32) -> String {
        let value = format!("{:.0}%", score);
        format!("  {:<22} {}\n", label, self.colorize(&value, Self::score_color(score)))
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &CandidateReport) -> Result<String> {
        let mut out = String::new();

        out.push_str(&self.header(&format!("CANDIDATE ANALYSIS: {}", report.candidate_name)));
        let overall = format!("{:.0}%", report.overall_score);
        out.push_str(&format!(
            "Overall: {} [{}]\n",
            self.colorize(&overall, Self::score_color(report.overall_score)),
            self.colorize(verdict_label(report.verdict), Color::Cyan)
        ));

        out.push_str(&self.header("Score Breakdown"));
        out.push_str(&self.score_line("Skills", report.skills.score));
        out.push_str(&self.score_line("Experience", report.experience.score));
        out.push_str(&self.score_line("Education", report.education.score));
        if let Some(location) = &report.location {
            out.push_str(&self.score_line("Location", location.score));
        }
        if let Some(criteria) = &report.criteria {
            out.push_str(&self.score_line("Custom criteria", criteria.score));
        }
        out.push_str(&self.score_line("Risk", report.red_flags.overall_risk));

        if !report.summary.strengths.is_empty() {
            out.push_str(&self.header("Strengths"));
            for s in &report.summary.strengths {
                out.push_str(&format!("  + {}\n", self.colorize(s, Color::Green)));
            }
        }
        if !report.summary.weaknesses.is_empty() {
            out.push_str(&self.header("Weaknesses"));
            for w in &report.summary.weaknesses {
                out.push_str(&format!("  - {}\n", self.colorize(w, Color::Red)));
            }
        }
        if !report.summary.recommendations.is_empty() {
            out.push_str(&self.header("Recommendations"));
            for r in &report.summary.recommendations {
                out.push_str(&format!("  * {}\n", r));
            }
        }

        if self.detailed {
            if !report.red_flags.flags.is_empty() {
                out.push_str(&self.header("Red Flags"));
                for flag in &report.red_flags.flags {
                    out.push_str(&format!(
                        "  ! {} (impact {:.0})\n",
                        self.colorize(&flag.description, Color::Yellow),
                        flag.impact
                    ));
                }
            }
            if let Some(narrative) = &report.narrative {
                out.push_str(&self.header("Narrative"));
                for finding in &narrative.findings {
                    out.push_str(&format!("  {}\n", finding));
                }
                for improvement in &narrative.improvements {
                    out.push_str(&format!("  > {}\n", improvement));
                }
            }
        }

        Ok(out)
    }

    fn format_batch(&self, outcome: &BatchOutcome) -> Result<String> {
        let mut out = String::new();

        out.push_str(&self.header("CANDIDATE RANKING"));
        for entry in &outcome.comparison.ranking {
            let score = format!("{:.0}%", entry.overall_score);
            out.push_str(&format!(
                "  {}. {:<24} {} [{}]\n",
                entry.rank,
                entry.candidate_name,
                self.colorize(&score, Self::score_color(entry.overall_score)),
                verdict_label(entry.verdict)
            ));
        }

        if !outcome.comparison.strength_notes.is_empty() {
            out.push_str(&self.header("Highlights"));
            for note in &outcome.comparison.strength_notes {
                out.push_str(&format!("  * {}\n", note));
            }
        }
        if !outcome.comparison.unique_strengths.is_empty() {
            out.push_str(&self.header("Unique Strengths"));
            for entry in &outcome.comparison.ranking {
                if let Some(skills) = outcome.comparison.unique_strengths.get(&entry.candidate_id) {
                    out.push_str(&format!(
                        "  {} only: {}\n",
                        entry.candidate_name,
                        self.colorize(&skills.join(", "), Color::Green)
                    ));
                }
            }
        }
        if !outcome.failures.is_empty() {
            out.push_str(&self.header("Failures"));
            for failure in &outcome.failures {
                out.push_str(&format!(
                    "  {} failed: {}\n",
                    failure.candidate_id,
                    self.colorize(&failure.error, Color::Red)
                ));
            }
        }

        if self.detailed {
            for report in &outcome.reports {
                out.push_str(&self.format_report(report)?);
            }
        }
        Ok(out)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &CandidateReport) -> Result<String> {
        Ok(if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        })
    }

    fn format_batch(&self, outcome: &BatchOutcome) -> Result<String> {
        Ok(if self.pretty {
            serde_json::to_string_pretty(outcome)?
        } else {
            serde_json::to_string(outcome)?
        })
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &CandidateReport) -> Result<String> {
        let mut out = String::new();
        out.push_str(&format!("# Candidate Analysis: {}\n\n", report.candidate_name));
        out.push_str(&format!(
            "**Overall: {:.0}% — {}**\n\n",
            report.overall_score,
            verdict_label(report.verdict)
        ));

        out.push_str("## Score Breakdown\n\n");
        out.push_str("| Dimension | Score |\n|---|---|\n");
        out.push_str(&format!("| Skills | {:.0}% |\n", report.skills.score));
        out.push_str(&format!("| Experience | {:.0}% |\n", report.experience.score));
        out.push_str(&format!("| Education | {:.0}% |\n", report.education.score));
        if let Some(location) = &report.location {
            out.push_str(&format!("| Location | {:.0}% |\n", location.score));
        }
        if let Some(criteria) = &report.criteria {
            out.push_str(&format!("| Custom criteria | {:.0}% |\n", criteria.score));
        }
        out.push_str(&format!("| Risk | {:.0} |\n\n", report.red_flags.overall_risk));

        for (title, items) in [
            ("Strengths", &report.summary.strengths),
            ("Weaknesses", &report.summary.weaknesses),
            ("Recommendations", &report.summary.recommendations),
        ] {
            if !items.is_empty() {
                out.push_str(&format!("## {}\n\n", title));
                for item in items {
                    out.push_str(&format!("- {}\n", item));
                }
                out.push('\n');
            }
        }

        if !report.red_flags.flags.is_empty() {
            out.push_str("## Red Flags\n\n");
            for flag in &report.red_flags.flags {
                out.push_str(&format!("- {} (impact {:.0})\n", flag.description, flag.impact));
            }
            out.push('\n');
        }
        Ok(out)
    }

    fn format_batch(&self, outcome: &BatchOutcome) -> Result<String> {
        let mut out = String::new();
        out.push_str("# Candidate Comparison\n\n");
        out.push_str("| Rank | Candidate | Score | Verdict |\n|---|---|---|---|\n");
        for entry in &outcome.comparison.ranking {
            out.push_str(&format!(
                "| {} | {} | {:.0}% | {} |\n",
                entry.rank,
                entry.candidate_name,
                entry.overall_score,
                verdict_label(entry.verdict)
            ));
        }
        out.push('\n');

        if !outcome.comparison.strength_notes.is_empty() {
            out.push_str("## Highlights\n\n");
            for note in &outcome.comparison.strength_notes {
                out.push_str(&format!("- {}\n", note));
            }
            out.push('\n');
        }
        for report in &outcome.reports {
            out.push_str(&self.format_report(report)?);
        }
        Ok(out)
    }
}

impl ReportGenerator {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self {
            console: ConsoleFormatter::new(use_colors, detailed),
            json: JsonFormatter::new(true),
            markdown: MarkdownFormatter,
        }
    }

    pub fn render_report(&self, report: &CandidateReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console.format_report(report),
            OutputFormat::Json => self.json.format_report(report),
            OutputFormat::Markdown => self.markdown.format_report(report),
        }
    }

    pub fn render_batch(&self, outcome: &BatchOutcome, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console.format_batch(outcome),
            OutputFormat::Json => self.json.format_batch(outcome),
            OutputFormat::Markdown => self.markdown.format_batch(outcome),
        }
    }
}

pub fn save_report_to_file(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Summary;
    use crate::analyzers::education::{EducationAnalysis, EducationGaps};
    use crate::analyzers::experience::{CareerProgression, ExperienceAnalysis, ProgressionTrend};
    use crate::analyzers::red_flags::RedFlagAnalysis;
    use crate::analyzers::skills::SkillsAnalysis;
    use std::collections::HashMap;

    fn sample_report() -> CandidateReport {
        CandidateReport {
            candidate_id: "a".to_string(),
            candidate_name: "Jane Doe".to_string(),
            overall_score: 82.0,
            verdict: Verdict::Strong,
            summary: Summary {
                strengths: vec!["Strong skills coverage (90%)".to_string()],
                weaknesses: vec![],
                recommendations: vec!["Probe for Kubernetes depth".to_string()],
            },
            skills: SkillsAnalysis {
                score: 90.0,
                matches: vec![],
                missing: vec![],
                category_scores: HashMap::new(),
                recommendations: vec![],
            },
            experience: ExperienceAnalysis {
                score: 75.0,
                matches: vec![],
                role_gaps: vec![],
                missing_skills: vec![],
                total_relevant_months: 48,
                required_months: 36,
                duration_gap: false,
                progression: CareerProgression {
                    trend: ProgressionTrend::Positive,
                    short_tenures: 0,
                    promotions: 1,
                    role_changes: 0,
                },
                recommendations: vec![],
            },
            education: EducationAnalysis {
                score: 100.0,
                matches: vec![],
                certification_matches: vec![],
                gaps: EducationGaps::default(),
                education_score: 1.0,
                certification_score: 1.0,
                recommendations: vec![],
            },
            location: None,
            criteria: None,
            red_flags: RedFlagAnalysis {
                overall_risk: 0.0,
                flags: vec![],
                time_gaps: vec![],
            },
            narrative: None,
        }
    }

    #[test]
    fn test_console_plain_output() {
        let text = ConsoleFormatter::new(false, false)
            .format_report(&sample_report())
            .unwrap();
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("82%"));
        assert!(text.contains("STRONG MATCH"));
        // No ANSI escapes without colors
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_json_output_parses_back() {
        let text = JsonFormatter::new(false).format_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["candidate_name"], "Jane Doe");
        assert_eq!(value["overall_score"], 82.0);
    }

    #[test]
    fn test_markdown_output() {
        let text = MarkdownFormatter.format_report(&sample_report()).unwrap();
        assert!(text.starts_with("# Candidate Analysis: Jane Doe"));
        assert!(text.contains("| Skills | 90% |"));
    }
}
