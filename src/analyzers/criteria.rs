//! User-defined criteria evaluation
//!
//! The criterion value is a tagged union keyed by the criterion type, so a
//! numeric criterion cannot carry a regex pattern and vice versa. Boolean
//! criteria are evaluated as keyword presence, a documented simplification.

use crate::similarity::{similarity, tokens};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const FUZZY_TOKEN_THRESHOLD: f32 = 0.85;
const SEMANTIC_ACCEPT_THRESHOLD: f32 = 0.3;
const WEAK_MATCH_CONFIDENCE: f32 = 0.7;
const WEAK_MATCH_WEIGHT: f32 = 0.5;

pub struct CustomCriteriaAnalyzer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCriterion {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: CriterionKind,
    pub weight: f32,
    #[serde(default)]
    pub required: bool,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CriterionKind {
    Keyword(String),
    Regex(String),
    Semantic(String),
    Numeric(NumericTarget),
    /// Evaluated exactly like `Keyword`.
    Boolean(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericTarget {
    pub target: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionMatch {
    pub criterion_id: String,
    pub name: String,
    pub found: bool,
    pub confidence: f32,
    pub value: Option<String>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionCategoryScore {
    pub score: f32,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCriteriaAnalysis {
    /// Weight-normalized confidence across all criteria, 0 to 100.
    pub score: f32,
    pub matches: Vec<CriterionMatch>,
    pub missing_required: Vec<String>,
    pub category_scores: HashMap<String, CriterionCategoryScore>,
    pub recommendations: Vec<String>,
}

impl CustomCriteriaAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, text: &str, criteria: &[CustomCriterion]) -> CustomCriteriaAnalysis {
        let matches: Vec<CriterionMatch> =
            criteria.iter().map(|c| self.evaluate(text, c)).collect();

        let missing_required: Vec<String> = criteria
            .iter()
            .zip(&matches)
            .filter(|(c, m)| c.required && !m.found)
            .map(|(c, _)| c.name.clone())
            .collect();

        let score = weighted_score(criteria.iter().zip(&matches));
        let category_scores = self.score_categories(criteria, &matches);
        let recommendations = self.recommendations(criteria, &matches, &missing_required);

        CustomCriteriaAnalysis {
            score,
            matches,
            missing_required,
            category_scores,
            recommendations,
        }
    }

    fn evaluate(&self, text: &str, criterion: &CustomCriterion) -> CriterionMatch {
        let (found, confidence, value, context) = match &criterion.kind {
            CriterionKind::Keyword(needle) | CriterionKind::Boolean(needle) => {
                keyword_match(text, needle)
            }
            CriterionKind::Regex(pattern) => regex_match(text, pattern, &criterion.name),
            CriterionKind::Numeric(target) => numeric_match(text, target),
            CriterionKind::Semantic(phrase) => semantic_match(text, phrase),
        };

        CriterionMatch {
            criterion_id: criterion.id.clone(),
            name: criterion.name.clone(),
            found,
            confidence,
            value,
            context,
        }
    }

    fn score_categories(
        &self,
        criteria: &[CustomCriterion],
        matches: &[CriterionMatch],
    ) -> HashMap<String, CriterionCategoryScore> {
        let mut by_category: HashMap<String, Vec<(&CustomCriterion, &CriterionMatch)>> =
            HashMap::new();
        for (c, m) in criteria.iter().zip(matches) {
            let category = c.category.clone().unwrap_or_else(|| "general".to_string());
            by_category.entry(category).or_default().push((c, m));
        }

        by_category
            .into_iter()
            .map(|(category, entries)| {
                let score = weighted_score(entries.iter().map(|(c, m)| (*c, *m)));
                let matched = entries
                    .iter()
                    .filter(|(_, m)| m.found)
                    .map(|(c, _)| c.name.clone())
                    .collect();
                let missing = entries
                    .iter()
                    .filter(|(_, m)| !m.found)
                    .map(|(c, _)| c.name.clone())
                    .collect();
                (
                    category,
                    CriterionCategoryScore {
                        score,
                        matched,
                        missing,
                    },
                )
            })
            .collect()
    }

    fn recommendations(
        &self,
        criteria: &[CustomCriterion],
        matches: &[CriterionMatch],
        missing_required: &[String],
    ) -> Vec<String> {
        let mut out = Vec::new();
        for name in missing_required {
            out.push(format!("Required criterion not met: {}", name));
        }
        for (c, m) in criteria.iter().zip(matches) {
            if m.found && m.confidence < WEAK_MATCH_CONFIDENCE && c.weight > WEAK_MATCH_WEIGHT {
                out.push(format!(
                    "Weak evidence for '{}' ({:.0}% confidence)",
                    c.name,
                    m.confidence * 100.0
                ));
            }
        }
        out
    }
}

impl Default for CustomCriteriaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Weight-normalized confidence over matched and unmatched criteria alike.
fn weighted_score<'a>(
    entries: impl Iterator<Item = (&'a CustomCriterion, &'a CriterionMatch)>,
) -> f32 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (c, m) in entries {
        weighted_sum += c.weight * m.confidence;
        weight_total += c.weight;
    }
    if weight_total <= 0.0 {
        0.0
    } else {
        (weighted_sum / weight_total * 100.0).round()
    }
}

fn keyword_match(text: &str, needle: &str) -> (bool, f32, Option<String>, Option<String>) {
    let lower_text = text.to_lowercase();
    let lower_needle = needle.trim().to_lowercase();

    if lower_needle.is_empty() {
        return (false, 0.0, None, None);
    }
    if let Some(pos) = lower_text.find(&lower_needle) {
        let context = snippet(text, pos, pos + lower_needle.len());
        return (true, 1.0, Some(needle.to_string()), Some(context));
    }

    // Best fuzzy token above the similarity bar.
    let mut best: Option<(String, f32)> = None;
    for token in tokens(text) {
        let sim = similarity(&token, &lower_needle);
        if sim > FUZZY_TOKEN_THRESHOLD && best.as_ref().map_or(true, |(_, s)| sim > *s) {
            best = Some((token, sim));
        }
    }
    match best {
        Some((token, sim)) => (true, sim, Some(token), None),
        None => (false, 0.0, None, None),
    }
}

fn regex_match(text: &str, pattern: &str, name: &str) -> (bool, f32, Option<String>, Option<String>) {
    match Regex::new(pattern) {
        Ok(re) => match re.find(text) {
            Some(m) => {
                let context = snippet(text, m.start(), m.end());
                (true, 1.0, Some(m.as_str().to_string()), Some(context))
            }
            None => (false, 0.0, None, None),
        },
        Err(e) => {
            log::warn!("Invalid regex for criterion '{}': {}", name, e);
            (false, 0.0, None, None)
        }
    }
}

fn numeric_match(text: &str, target: &NumericTarget) -> (bool, f32, Option<String>, Option<String>) {
    let number_re = Regex::new(r"\d+(?:\.\d+)?").expect("static pattern");
    let mut best: Option<(f64, f32)> = None;

    for m in number_re.find_iter(text) {
        let Ok(value) = m.as_str().parse::<f64>() else {
            continue;
        };
        if matches!(target.min, Some(min) if value < min) {
            continue;
        }
        if matches!(target.max, Some(max) if value > max) {
            continue;
        }

        let range = match (target.min, target.max) {
            (Some(min), Some(max)) if max > min => max - min,
            _ => target.target.abs().max(1.0),
        };
        let confidence = (1.0 - ((value - target.target).abs() / range)).clamp(0.0, 1.0) as f32;

        if best.map_or(true, |(_, c)| confidence > c) {
            best = Some((value, confidence));
        }
    }

    match best {
        Some((value, confidence)) => (true, confidence, Some(value.to_string()), None),
        None => (false, 0.0, None, None),
    }
}

/// Length-weighted word overlap between the criterion phrase and the text.
fn semantic_match(text: &str, phrase: &str) -> (bool, f32, Option<String>, Option<String>) {
    let phrase_tokens = tokens(phrase);
    if phrase_tokens.is_empty() {
        return (false, 0.0, None, None);
    }
    let text_tokens: HashSet<String> = tokens(text).into_iter().collect();

    let total_weight: f32 = phrase_tokens.iter().map(|t| t.len() as f32).sum();
    let matched_weight: f32 = phrase_tokens
        .iter()
        .filter(|t| text_tokens.contains(*t))
        .map(|t| t.len() as f32)
        .sum();

    let confidence = matched_weight / total_weight;
    if confidence > SEMANTIC_ACCEPT_THRESHOLD {
        (true, confidence, Some(phrase.to_string()), None)
    } else {
        (false, 0.0, None, None)
    }
}

fn snippet(text: &str, start: usize, end: usize) -> String {
    let from = start.saturating_sub(40);
    let from = (0..=from).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
    let to = (end + 40).min(text.len());
    let to = (to..=text.len()).find(|i| text.is_char_boundary(*i)).unwrap_or(text.len());
    text[from..to].trim().to_string()
}
