//! Best-effort structured extraction from resume text
//!
//! Nothing here fails: unparseable text yields empty sections and the
//! analyzers treat those as missing evidence. Section boundaries come from
//! a header keyword scan over lines; dates from a small family of range
//! patterns (`Jan 2020 - Mar 2022`, `03/2019 - present`, `2015 - 2019`).

use crate::profile::{
    CandidateLocation, CandidateProfile, Certification, Education, Experience,
    MobilityPreferences,
};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

const SECTION_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "skills",
        &["skills", "technical skills", "core competencies", "expertise", "technologies"],
    ),
    (
        "experience",
        &[
            "experience",
            "work experience",
            "professional experience",
            "employment",
            "employment history",
            "career history",
        ],
    ),
    ("education", &["education", "academic background", "qualifications"]),
    ("certifications", &["certifications", "certificates", "licenses"]),
    ("summary", &["summary", "profile", "objective", "about"]),
];

const DEGREE_KEYWORDS: &[&str] = &[
    "phd", "ph.d", "doctorate", "master", "m.sc", "msc", "mba", "bachelor", "b.sc", "bsc",
    "associate", "diploma",
];

const ACHIEVEMENT_VERBS: &[&str] = &[
    "led", "built", "designed", "implemented", "launched", "delivered", "shipped", "migrated",
    "improved", "reduced", "increased", "scaled", "mentored", "automated", "optimized",
];

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse resume text into a structured profile. `today` closes date ranges
/// that end in "present".
pub fn extract_profile(text: &str, today: NaiveDate) -> CandidateProfile {
    let sections = split_sections(text);

    let name = extract_name(sections.get("preamble").map(String::as_str).unwrap_or(""));
    let skills = sections
        .get("skills")
        .map(|s| split_skills(s))
        .unwrap_or_default();
    let experiences = sections
        .get("experience")
        .map(|s| extract_experiences(s, today))
        .unwrap_or_default();
    let education = sections
        .get("education")
        .map(|s| extract_education(s))
        .unwrap_or_default();
    let certifications = sections
        .get("certifications")
        .map(|s| extract_certifications(s))
        .unwrap_or_default();
    let location = extract_location(text);
    let mobility = extract_mobility(text);

    CandidateProfile {
        name,
        skills,
        experiences,
        education,
        certifications,
        location,
        mobility,
    }
}

/// Split text into named sections by scanning for header lines. Everything
/// before the first header lands in "preamble".
fn split_sections(text: &str) -> HashMap<String, String> {
    let mut sections: HashMap<String, String> = HashMap::new();
    let mut current = "preamble";

    for line in text.lines() {
        if let Some(name) = header_name(line) {
            current = name;
            sections.entry(current.to_string()).or_default();
            continue;
        }
        let body = sections.entry(current.to_string()).or_default();
        body.push_str(line);
        body.push('\n');
    }
    sections
}

fn header_name(line: &str) -> Option<&'static str> {
    let stripped = line
        .trim()
        .trim_start_matches(['#', '*', '=', '-', ' '])
        .trim_end_matches([':', '=', '-', ' '])
        .trim();
    if stripped.is_empty() || stripped.len() > 40 {
        return None;
    }
    let lower = stripped.to_lowercase();
    for (name, patterns) in SECTION_KEYWORDS {
        if patterns.iter().any(|p| lower == *p) {
            return Some(name);
        }
    }
    None
}

fn extract_name(preamble: &str) -> Option<String> {
    let first = preamble.lines().map(str::trim).find(|l| !l.is_empty())?;
    let looks_like_name = first.split_whitespace().count() <= 4
        && !first.contains('@')
        && !first.chars().any(|c| c.is_ascii_digit());
    looks_like_name.then(|| first.to_string())
}

fn split_skills(section: &str) -> Vec<String> {
    section
        .split(|c: char| matches!(c, ',' | ';' | '|' | '\u{2022}' | '\u{00b7}' | '\n' | '\t'))
        .map(|s| s.trim().trim_start_matches(['-', '*', ' ']).trim())
        .filter(|s| !s.is_empty() && s.len() <= 40 && !s.ends_with(':'))
        .map(|s| s.to_string())
        .collect()
}

fn date_range_pattern() -> Regex {
    Regex::new(
        r"(?ix)
        \b(
            (?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{4}
            | \d{1,2}/\d{4}
            | \d{4}
        )
        \s* (?:-|\x{2013}|\x{2014}|to|until) \s*
        (
            (?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{4}
            | \d{1,2}/\d{4}
            | \d{4}
            | present | current | now
        )\b",
    )
    .expect("static pattern")
}

fn parse_date_token(token: &str, end_of_range: bool) -> Option<NaiveDate> {
    let lower = token.trim().to_lowercase();
    if matches!(lower.as_str(), "present" | "current" | "now") {
        return None;
    }

    if let Some((month_part, year_part)) = lower.split_once(|c: char| c.is_whitespace()) {
        let month = MONTHS.iter().position(|m| month_part.starts_with(m))? as u32 + 1;
        let year: i32 = year_part.trim().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Some((month_part, year_part)) = lower.split_once('/') {
        let month: u32 = month_part.parse().ok()?;
        let year: i32 = year_part.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }

    let year: i32 = lower.parse().ok()?;
    if end_of_range {
        NaiveDate::from_ymd_opt(year, 12, 31)
    } else {
        NaiveDate::from_ymd_opt(year, 1, 1)
    }
}

fn extract_experiences(section: &str, today: NaiveDate) -> Vec<Experience> {
    let range = date_range_pattern();
    let lines: Vec<&str> = section.lines().collect();

    let mut experiences = Vec::new();
    let mut current: Option<(Experience, Vec<String>)> = None;
    let mut previous_line = "";

    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = range.captures(line) {
            if let Some((exp, description)) = current.take() {
                experiences.push(finish_experience(exp, description, today));
            }

            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let heading = line[..whole.start].trim().trim_end_matches([',', '|', '(', '-']);
            let heading = if heading.is_empty() { previous_line } else { heading };
            let (role, company) = split_role_company(heading);

            let mut exp = Experience::new(role, String::new());
            exp.company = company;
            exp.start_date = caps.get(1).and_then(|m| parse_date_token(m.as_str(), false));
            exp.end_date = caps.get(2).and_then(|m| parse_date_token(m.as_str(), true));
            current = Some((exp, Vec::new()));
        } else if let Some((_, description)) = current.as_mut() {
            let trimmed = line.trim();
            // A line directly above a date range is the next block's heading.
            let heads_next_block = lines.get(i + 1).is_some_and(|next| range.is_match(next));
            if !trimmed.is_empty() && !heads_next_block {
                description.push(trimmed.to_string());
            }
        }
        if !line.trim().is_empty() {
            previous_line = line.trim();
        }
    }
    if let Some((exp, description)) = current.take() {
        experiences.push(finish_experience(exp, description, today));
    }
    experiences
}

fn finish_experience(mut exp: Experience, description: Vec<String>, today: NaiveDate) -> Experience {
    exp.description = description.join(" ");
    exp.achievements = achievement_sentences(&exp.description);

    let effective_end = exp.end_date.unwrap_or(today);
    if let Some(start) = exp.start_date {
        exp.duration_months = crate::profile::months_between(start, effective_end);
    }
    exp
}

fn split_role_company(heading: &str) -> (String, Option<String>) {
    let heading = heading.trim().trim_start_matches(['-', '*', ' ']).trim();
    for separator in [" at ", " @ ", " | ", ", "] {
        if let Some((role, company)) = heading.split_once(separator) {
            return (role.trim().to_string(), Some(company.trim().to_string()));
        }
    }
    (heading.to_string(), None)
}

/// Sentences whose first word is a delivery verb.
fn achievement_sentences(description: &str) -> Vec<String> {
    description
        .unicode_sentences()
        .filter_map(|sentence| {
            let cleaned = sentence.trim().trim_start_matches(['-', '*', '\u{2022}', ' ']);
            let first = cleaned.split_whitespace().next()?.to_lowercase();
            ACHIEVEMENT_VERBS
                .contains(&first.as_str())
                .then(|| cleaned.trim_end().to_string())
        })
        .collect()
}

fn extract_education(section: &str) -> Vec<Education> {
    let range = date_range_pattern();
    section
        .lines()
        .map(str::trim)
        .filter(|line| {
            let lower = line.to_lowercase();
            DEGREE_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(|line| {
            let mut entry = Education::default();
            if let Some(caps) = range.captures(line) {
                entry.start_date = caps.get(1).and_then(|m| parse_date_token(m.as_str(), false));
                entry.end_date = caps.get(2).and_then(|m| parse_date_token(m.as_str(), true));
            }
            let without_dates = range.replace(line, "");
            let mut parts = without_dates.split(',').map(str::trim);

            let head = parts.next().unwrap_or("");
            match head.split_once(" in ") {
                Some((degree, field)) => {
                    entry.degree = degree.trim().to_string();
                    entry.field = field.trim().to_string();
                }
                None => entry.degree = head.to_string(),
            }
            entry.institution = parts
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            entry
        })
        .collect()
}

fn extract_certifications(section: &str) -> Vec<Certification> {
    let year = Regex::new(r"\b(19|20)\d{2}\b").expect("static pattern");

    section
        .lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '\u{2022}', ' ']).trim())
        .filter(|l| !l.is_empty())
        .map(|line| {
            let mut cert = Certification::default();
            let lower = line.to_lowercase();

            if let Some(m) = year.find(line) {
                let parsed: i32 = m.as_str().parse().unwrap_or_default();
                let date = NaiveDate::from_ymd_opt(parsed, 1, 1);
                let before = lower[..m.start()].to_string();
                if before.contains("expires") || before.contains("valid until") {
                    cert.expiry_date = date.map(|d| d.with_month(12).unwrap_or(d));
                } else {
                    cert.date = date;
                }
            }

            let name_end = line
                .find('(')
                .or_else(|| year.find(line).map(|m| m.start()))
                .unwrap_or(line.len());
            cert.name = line[..name_end].trim().trim_end_matches([',', '-']).trim().to_string();
            cert
        })
        .filter(|c| !c.name.is_empty())
        .collect()
}

fn extract_location(text: &str) -> Option<CandidateLocation> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| l.to_lowercase().starts_with("location:"))?;
    let rest = line.splitn(2, ':').nth(1)?.trim();
    if rest.is_empty() {
        return None;
    }

    let mut parts = rest.split(',').map(|p| p.trim().to_string());
    let city = parts.next()?;
    let remaining: Vec<String> = parts.filter(|p| !p.is_empty()).collect();
    let (region, country) = match remaining.len() {
        0 => (None, None),
        1 => (None, Some(remaining[0].clone())),
        _ => (Some(remaining[0].clone()), Some(remaining[1].clone())),
    };

    Some(CandidateLocation {
        city,
        region,
        country,
        coordinates: None,
    })
}

fn extract_mobility(text: &str) -> Option<MobilityPreferences> {
    let lower = text.to_lowercase();
    let remote_only = lower.contains("remote only") || lower.contains("remote-only");
    let open_to_relocation =
        lower.contains("open to relocation") || lower.contains("willing to relocate");
    let hybrid_ok = lower.contains("hybrid");

    if !remote_only && !open_to_relocation && !hybrid_ok {
        return None;
    }
    Some(MobilityPreferences {
        remote_only,
        open_to_relocation,
        hybrid_ok,
        max_commute_km: None,
        preferred_cities: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    const SAMPLE: &str = "\
Jane Doe
Location: Berlin, Germany
Open to relocation.

Skills:
Rust, Python, Kubernetes; PostgreSQL

Experience
Senior Backend Engineer at Acme Corp
Jan 2020 - Mar 2023
Built the payments platform in Rust. Mentored four engineers.

Backend Engineer, Initech
06/2017 - 12/2019
Worked on internal tooling.

Education
Bachelor of Science in Computer Science, TU Berlin, 2013 - 2017

Certifications
- CKA (expires 2026)
- AWS Solutions Architect, 2021
";

    #[test]
    fn test_name_and_location() {
        let profile = extract_profile(SAMPLE, today());
        assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
        let location = profile.location.unwrap();
        assert_eq!(location.city, "Berlin");
        assert_eq!(location.country.as_deref(), Some("Germany"));
    }

    #[test]
    fn test_skills_split() {
        let profile = extract_profile(SAMPLE, today());
        assert_eq!(profile.skills, vec!["Rust", "Python", "Kubernetes", "PostgreSQL"]);
    }

    #[test]
    fn test_experience_blocks() {
        let profile = extract_profile(SAMPLE, today());
        assert_eq!(profile.experiences.len(), 2);

        let first = &profile.experiences[0];
        assert_eq!(first.role, "Senior Backend Engineer");
        assert_eq!(first.company.as_deref(), Some("Acme Corp"));
        assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(first.end_date, NaiveDate::from_ymd_opt(2023, 3, 1));
        assert!(first.duration_months >= 38);
        assert!(first.description.contains("payments platform"));

        let second = &profile.experiences[1];
        assert_eq!(second.role, "Backend Engineer");
        assert_eq!(second.company.as_deref(), Some("Initech"));
        assert_eq!(second.start_date, NaiveDate::from_ymd_opt(2017, 6, 1));
    }

    #[test]
    fn test_achievement_sentences() {
        let profile = extract_profile(SAMPLE, today());
        let achievements = &profile.experiences[0].achievements;
        assert_eq!(achievements.len(), 2);
        assert!(achievements[0].starts_with("Built"));
        assert!(achievements[1].starts_with("Mentored"));
    }

    #[test]
    fn test_present_range_closed_by_today() {
        let text = "Experience\nEngineer at Shop\nJan 2024 - present\nOngoing work.";
        let profile = extract_profile(text, today());
        let exp = &profile.experiences[0];
        assert_eq!(exp.end_date, None);
        // Jan 2024 to Jun 2025
        assert_eq!(exp.duration_months, 17);
    }

    #[test]
    fn test_education_line() {
        let profile = extract_profile(SAMPLE, today());
        assert_eq!(profile.education.len(), 1);
        let edu = &profile.education[0];
        assert_eq!(edu.degree, "Bachelor of Science");
        assert_eq!(edu.field, "Computer Science");
        assert_eq!(edu.institution, "TU Berlin");
        assert_eq!(edu.start_date, NaiveDate::from_ymd_opt(2013, 1, 1));
        assert_eq!(edu.end_date, NaiveDate::from_ymd_opt(2017, 12, 31));
    }

    #[test]
    fn test_certifications() {
        let profile = extract_profile(SAMPLE, today());
        assert_eq!(profile.certifications.len(), 2);

        let cka = &profile.certifications[0];
        assert_eq!(cka.name, "CKA");
        assert_eq!(cka.expiry_date, NaiveDate::from_ymd_opt(2026, 12, 1));

        let aws = &profile.certifications[1];
        assert_eq!(aws.name, "AWS Solutions Architect");
        assert_eq!(aws.date, NaiveDate::from_ymd_opt(2021, 1, 1));
    }

    #[test]
    fn test_mobility_flags() {
        let profile = extract_profile(SAMPLE, today());
        let mobility = profile.mobility.unwrap();
        assert!(mobility.open_to_relocation);
        assert!(!mobility.remote_only);
    }

    #[test]
    fn test_empty_text_yields_empty_profile() {
        let profile = extract_profile("", today());
        assert_eq!(profile, CandidateProfile::default());
    }

    #[test]
    fn test_markdown_headers_recognized() {
        let text = "## Skills\nRust, Go\n";
        let profile = extract_profile(text, today());
        assert_eq!(profile.skills, vec!["Rust", "Go"]);
    }
}
