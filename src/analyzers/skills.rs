//! Skills matching against required skill lists
//!
//! Matching ladder per required skill: exact name, known synonym, then fuzzy
//! token similarity. Exact matches score 1.0, synonyms 0.9, fuzzy matches at
//! most 0.8, and surrounding text mentioning hands-on experience adds up to
//! 0.1, capped at 1.0.

use crate::catalog::SkillsCatalog;
use crate::similarity::{similarity, tokens};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

const SYNONYM_CONFIDENCE: f32 = 0.9;
const FUZZY_CEILING: f32 = 0.8;
const FUZZY_THRESHOLD: f32 = 0.85;
const CONTEXT_BONUS: f32 = 0.1;
const CONTEXT_WINDOW: usize = 60;

/// Words near a match that suggest hands-on experience rather than a bare
/// keyword listing.
const EXPERIENCE_HINTS: &[&str] = &[
    "years", "experience", "expert", "proficient", "advanced", "production",
    "led", "built", "developed", "designed", "maintained", "shipped",
];

pub struct SkillsAnalyzer {
    catalog: Arc<SkillsCatalog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMatch {
    pub required_skill: String,
    pub found_variant: String,
    pub category: String,
    pub confidence: f32,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    /// 0 to 100, rounded to the nearest integer percent.
    pub score: f32,
    pub matches: Vec<String>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsAnalysis {
    /// 0 to 100. Unmatched required skills contribute 0.
    pub score: f32,
    pub matches: Vec<SkillMatch>,
    pub missing: Vec<String>,
    pub category_scores: HashMap<String, CategoryScore>,
    pub recommendations: Vec<String>,
}

impl SkillsAnalyzer {
    pub fn new(catalog: Arc<SkillsCatalog>) -> Self {
        Self { catalog }
    }

    pub fn analyze(&self, text: &str, required_skills: &[String]) -> SkillsAnalysis {
        if required_skills.is_empty() {
            return SkillsAnalysis {
                score: 0.0,
                matches: Vec::new(),
                missing: Vec::new(),
                category_scores: HashMap::new(),
                recommendations: Vec::new(),
            };
        }

        let mut matches = Vec::new();
        let mut missing = Vec::new();

        for skill in required_skills {
            match self.match_skill(text, skill) {
                Some(m) => matches.push(m),
                None => missing.push(skill.clone()),
            }
        }

        let category_scores = self.score_categories(&matches, &missing);
        let score = matches.iter().map(|m| m.confidence).sum::<f32>()
            / required_skills.len() as f32
            * 100.0;
        let recommendations = self.recommendations(&matches, &missing);

        SkillsAnalysis {
            score: score.round(),
            matches,
            missing,
            category_scores,
            recommendations,
        }
    }

    /// Best-confidence variant match for one required skill, or None.
    fn match_skill(&self, text: &str, skill: &str) -> Option<SkillMatch> {
        let variants = self.catalog.variants(skill);
        let category = self
            .catalog
            .category_of(skill)
            .unwrap_or("general")
            .to_string();

        // Substring pass over all variants at once. LeftmostLongest keeps
        // "spring boot" from matching as just "spring".
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(aho_corasick::MatchKind::LeftmostLongest)
            .build(&variants)
            .ok()?;

        let skill_lower = skill.trim().to_lowercase();
        let mut best: Option<SkillMatch> = None;

        for mat in automaton.find_iter(text) {
            let variant = &variants[mat.pattern().as_usize()];
            let base = if *variant == skill_lower {
                1.0
            } else {
                SYNONYM_CONFIDENCE
            };
            let context = context_window(text, mat.start(), mat.end());
            let confidence = apply_context_bonus(base, &context);

            if best.as_ref().map_or(true, |b| confidence > b.confidence) {
                best = Some(SkillMatch {
                    required_skill: skill.to_string(),
                    found_variant: variant.clone(),
                    category: category.clone(),
                    confidence,
                    context: Some(context),
                });
            }
        }

        if best.is_some() {
            return best;
        }

        // Fuzzy fallback over individual tokens, capped below synonym level.
        let mut best_token: Option<(String, f32)> = None;
        for token in tokens(text) {
            for variant in &variants {
                let sim = similarity(&token, variant);
                if sim >= FUZZY_THRESHOLD
                    && best_token.as_ref().map_or(true, |(_, s)| sim > *s)
                {
                    best_token = Some((token.clone(), sim));
                }
            }
        }

        best_token.map(|(token, sim)| SkillMatch {
            required_skill: skill.to_string(),
            found_variant: token,
            category,
            confidence: (sim * FUZZY_CEILING).min(FUZZY_CEILING),
            context: None,
        })
    }

    fn score_categories(
        &self,
        matches: &[SkillMatch],
        missing: &[String],
    ) -> HashMap<String, CategoryScore> {
        let mut grouped: HashMap<String, CategoryScore> = HashMap::new();

        for m in matches {
            let entry = grouped.entry(m.category.clone()).or_insert_with(empty_category);
            entry.score += m.confidence;
            entry.matches.push(m.required_skill.clone());
        }
        for skill in missing {
            let category = self.catalog.category_of(skill).unwrap_or("general").to_string();
            let entry = grouped.entry(category).or_insert_with(empty_category);
            entry.missing.push(skill.clone());
        }

        // score currently holds the confidence sum; divide by the full
        // matched+missing count so missing skills drag the category down.
        for entry in grouped.values_mut() {
            let total = entry.matches.len() + entry.missing.len();
            if total > 0 {
                entry.score = (entry.score / total as f32 * 100.0).round();
            }
        }
        grouped
    }

    fn recommendations(&self, matches: &[SkillMatch], missing: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        if !missing.is_empty() {
            out.push(format!(
                "Missing required skills: {}",
                missing.join(", ")
            ));
        }
        let weak: Vec<&str> = matches
            .iter()
            .filter(|m| m.confidence < 0.7)
            .map(|m| m.required_skill.as_str())
            .collect();
        if !weak.is_empty() {
            out.push(format!(
                "Verify weakly evidenced skills in interview: {}",
                weak.join(", ")
            ));
        }
        out
    }
}

fn empty_category() -> CategoryScore {
    CategoryScore {
        score: 0.0,
        matches: Vec::new(),
        missing: Vec::new(),
    }
}

fn context_window(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(CONTEXT_WINDOW)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .take(CONTEXT_WINDOW)
        .last()
        .map(|(i, c)| end + i + c.len_utf8())
        .unwrap_or(end);
    text[from..to].trim().to_string()
}

fn apply_context_bonus(base: f32, context: &str) -> f32 {
    let lower = context.to_lowercase();
    if EXPERIENCE_HINTS.iter().any(|h| lower.contains(h)) {
        (base + CONTEXT_BONUS).min(1.0)
    } else {
        base
    }
}
