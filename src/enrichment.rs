//! Optional narrative enrichment
//!
//! A narrative analyzer produces a prose-oriented second opinion on top of
//! the deterministic analyzers. The trait is object safe so the aggregator
//! can hold any backend behind a `Box`; the built-in `KeywordNarrative` is
//! purely lexical and needs no external service.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

pub type NarrativeFuture<'a> = Pin<Box<dyn Future<Output = Result<NarrativeReport>> + Send + 'a>>;

/// Prose-level findings about how well a candidate text covers a job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeReport {
    /// Coverage score, 0 to 100.
    pub score: f32,
    pub missing_keywords: Vec<String>,
    pub strong_keywords: Vec<String>,
    pub findings: Vec<String>,
    pub improvements: Vec<String>,
}

pub trait NarrativeAnalyzer: Send + Sync {
    /// Backend identifier used in logs and reports.
    fn name(&self) -> &str;

    fn narrate<'a>(&'a self, candidate_text: &'a str, job_text: &'a str) -> NarrativeFuture<'a>;
}

/// Lexical fallback backend: compares the job posting's salient words
/// against the candidate text.
pub struct KeywordNarrative;

const MIN_KEYWORD_LEN: usize = 4;
const MAX_LISTED_KEYWORDS: usize = 10;

const STOPWORDS: &[&str] = &[
    "with", "have", "this", "that", "will", "from", "your", "their", "about",
    "into", "must", "should", "would", "they", "them", "been", "were", "when",
    "what", "where", "which", "while", "than", "then", "over", "also", "able",
    "more", "most", "some", "such", "very", "work", "working", "years", "year",
    "team", "role", "experience", "candidate", "position", "required",
    "preferred", "strong", "skills", "knowledge", "plus", "including",
];

impl KeywordNarrative {
    fn salient_words(text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for word in crate::similarity::tokens(text) {
            if word.len() < MIN_KEYWORD_LEN || STOPWORDS.contains(&word.as_str()) {
                continue;
            }
            if seen.insert(word.clone()) {
                out.push(word);
            }
        }
        out
    }
}

impl NarrativeAnalyzer for KeywordNarrative {
    fn name(&self) -> &str {
        "keyword"
    }

    fn narrate<'a>(&'a self, candidate_text: &'a str, job_text: &'a str) -> NarrativeFuture<'a> {
        Box::pin(async move {
            let job_words = Self::salient_words(job_text);
            let candidate_words: HashSet<String> =
                crate::similarity::tokens(candidate_text).into_iter().collect();

            let (strong, missing): (Vec<String>, Vec<String>) = job_words
                .into_iter()
                .partition(|w| candidate_words.contains(w));

            let total = strong.len() + missing.len();
            let score = if total == 0 {
                100.0
            } else {
                (strong.len() as f32 / total as f32 * 100.0).round()
            };

            let mut findings = Vec::new();
            let mut improvements = Vec::new();
            if score >= 70.0 {
                findings.push(format!(
                    "Candidate text covers {} of {} salient terms from the posting",
                    strong.len(),
                    total
                ));
            } else {
                findings.push(format!(
                    "Vocabulary overlap with the posting is thin ({} of {} terms)",
                    strong.len(),
                    total
                ));
            }
            if !missing.is_empty() {
                improvements.push(format!(
                    "Probe for unmentioned topics: {}",
                    missing
                        .iter()
                        .take(MAX_LISTED_KEYWORDS)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }

            Ok(NarrativeReport {
                score,
                missing_keywords: missing.into_iter().take(MAX_LISTED_KEYWORDS).collect(),
                strong_keywords: strong.into_iter().take(MAX_LISTED_KEYWORDS).collect(),
                findings,
                improvements,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_full_coverage_scores_high() {
        let job = "Kubernetes administration and Python automation";
        let resume = "Years of kubernetes administration, heavy python automation work.";
        let report = KeywordNarrative.narrate(resume, job).await.unwrap();
        assert_eq!(report.score, 100.0);
        assert!(report.missing_keywords.is_empty());
    }

    #[tokio::test]
    async fn test_missing_terms_reported() {
        let job = "Kubernetes administration with Terraform provisioning";
        let resume = "Kubernetes administration only.";
        let report = KeywordNarrative.narrate(resume, job).await.unwrap();
        assert!(report.score < 100.0);
        assert!(report.missing_keywords.contains(&"terraform".to_string()));
        assert!(report.strong_keywords.contains(&"kubernetes".to_string()));
        assert!(!report.improvements.is_empty());
    }

    #[tokio::test]
    async fn test_empty_job_text() {
        let report = KeywordNarrative.narrate("anything", "").await.unwrap();
        assert_eq!(report.score, 100.0);
    }

    #[test]
    fn test_stopwords_filtered() {
        let words = KeywordNarrative::salient_words("required experience with strong teams");
        assert!(words.contains(&"teams".to_string()));
        assert!(!words.contains(&"required".to_string()));
        assert!(!words.contains(&"with".to_string()));
    }
}
