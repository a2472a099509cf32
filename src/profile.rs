//! Candidate data model: work history, education, certifications, location

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Average month length in days, used to turn date ranges into month counts.
const DAYS_PER_MONTH: f64 = 30.44;

/// Structured candidate data, typically produced by best-effort extraction
/// from resume text. Every section may be empty; analyzers treat empty
/// sections as "no evidence", not as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    pub location: Option<CandidateLocation>,
    pub mobility: Option<MobilityPreferences>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub role: String,
    pub company: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Derived from the date range when both ends are present; otherwise
    /// whatever the source declared (possibly zero).
    pub duration_months: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub field: String,
    pub institution: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub gpa: Option<f32>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: Option<String>,
    pub date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateLocation {
    pub city: String,
    pub region: Option<String>,
    pub country: Option<String>,
    /// (latitude, longitude) in degrees, when geocoded.
    pub coordinates: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MobilityPreferences {
    #[serde(default)]
    pub remote_only: bool,
    #[serde(default)]
    pub open_to_relocation: bool,
    #[serde(default)]
    pub hybrid_ok: bool,
    pub max_commute_km: Option<f32>,
    #[serde(default)]
    pub preferred_cities: Vec<String>,
}

/// Whole months covered by a date range, rounded up.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let days = (end - start).num_days() as f64;
    (days / DAYS_PER_MONTH).ceil() as u32
}

impl Experience {
    pub fn new(role: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Set the date range and derive `duration_months` from it.
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self.duration_months = months_between(start, end);
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }
}

impl Certification {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        matches!(self.expiry_date, Some(expiry) if today > expiry)
    }
}

impl CandidateLocation {
    pub fn same_city(&self, other_city: &str) -> bool {
        self.city.trim().eq_ignore_ascii_case(other_city.trim())
    }
}
