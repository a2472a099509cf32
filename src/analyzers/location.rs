//! Geographic and work-arrangement viability
//!
//! Distance is Haversine when both sides are geocoded, otherwise a tiered
//! estimate from city/region/country equality. The score walks a small state
//! machine over remote preference, relocation and commute distance, then gets
//! proximity adjustments and is clamped to [0, 100].

use crate::config::JobLocationSpec;
use crate::profile::{CandidateLocation, MobilityPreferences};
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;
const DEFAULT_MAX_COMMUTE_KM: f32 = 50.0;
const SAME_CITY_THRESHOLD_KM: f64 = 5.0;

/// Tiered distance estimates when coordinates are missing.
const SAME_REGION_KM: f64 = 30.0;
const SAME_COUNTRY_KM: f64 = 300.0;
const FAR_AWAY_KM: f64 = 1000.0;

pub struct LocationAnalyzer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationMatchType {
    Exact,
    SameCity,
    Commutable,
    RequiresRelocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkArrangement {
    Remote,
    Hybrid,
    OnSite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationAnalysis {
    pub score: f32,
    pub distance_km: f64,
    pub match_type: LocationMatchType,
    pub work_arrangement: WorkArrangement,
    pub is_viable: bool,
    pub recommendations: Vec<String>,
}

/// Great-circle distance between two (lat, lon) points in km.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

impl LocationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        candidate: &CandidateLocation,
        mobility: &MobilityPreferences,
        job: &JobLocationSpec,
    ) -> LocationAnalysis {
        let distance_km = self.distance(candidate, job);
        let effective_max = effective_max_commute(mobility, job);
        let match_type = classify(distance_km, effective_max);

        let mut recommendations = Vec::new();

        // Remote-only candidates short-circuit the commute logic entirely.
        if mobility.remote_only {
            let score: f32 = if job.remote_allowed { 100.0 } else { 0.0 };
            if !job.remote_allowed {
                recommendations
                    .push("Candidate only works remotely but the position requires presence".to_string());
            }
            return LocationAnalysis {
                score: score.clamp(0.0, 100.0),
                distance_km,
                match_type,
                work_arrangement: WorkArrangement::Remote,
                is_viable: score > 0.0,
                recommendations,
            };
        }

        let (mut score, work_arrangement) = match match_type {
            LocationMatchType::RequiresRelocation => {
                if mobility.open_to_relocation {
                    recommendations.push(
                        "Relocation required; discuss relocation support during the process"
                            .to_string(),
                    );
                    (70.0, WorkArrangement::OnSite)
                } else {
                    (0.0, WorkArrangement::OnSite)
                }
            }
            _ => {
                if distance_km > 30.0 {
                    recommendations.push(
                        "Long commute; consider offering flexible scheduling".to_string(),
                    );
                }
                if job.hybrid_allowed && mobility.hybrid_ok {
                    (90.0, WorkArrangement::Hybrid)
                } else {
                    (85.0, WorkArrangement::OnSite)
                }
            }
        };

        score += match match_type {
            LocationMatchType::Exact => 10.0,
            LocationMatchType::SameCity => 5.0,
            LocationMatchType::Commutable => {
                -20.0 * (distance_km / effective_max as f64).min(1.0) as f32
            }
            LocationMatchType::RequiresRelocation => 0.0,
        };

        if !mobility.preferred_cities.is_empty()
            && !mobility
                .preferred_cities
                .iter()
                .any(|c| c.trim().eq_ignore_ascii_case(job.city.trim()))
        {
            score -= 10.0;
        }

        let score = score.clamp(0.0, 100.0);
        LocationAnalysis {
            score,
            distance_km,
            match_type,
            work_arrangement,
            is_viable: score > 0.0,
            recommendations,
        }
    }

    fn distance(&self, candidate: &CandidateLocation, job: &JobLocationSpec) -> f64 {
        if let (Some(a), Some(b)) = (candidate.coordinates, job.coordinates) {
            return haversine_km(a, b);
        }
        if candidate.same_city(&job.city) {
            return 0.0;
        }
        if same_field(&candidate.region, &job.region) {
            return SAME_REGION_KM;
        }
        if same_field(&candidate.country, &job.country) {
            return SAME_COUNTRY_KM;
        }
        FAR_AWAY_KM
    }
}

impl Default for LocationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn effective_max_commute(mobility: &MobilityPreferences, job: &JobLocationSpec) -> f32 {
    let candidate_max = mobility.max_commute_km.unwrap_or(DEFAULT_MAX_COMMUTE_KM);
    let job_max = job.max_commute_km.unwrap_or(DEFAULT_MAX_COMMUTE_KM);
    candidate_max.min(job_max).min(DEFAULT_MAX_COMMUTE_KM)
}

fn classify(distance_km: f64, effective_max: f32) -> LocationMatchType {
    if distance_km == 0.0 {
        LocationMatchType::Exact
    } else if distance_km < SAME_CITY_THRESHOLD_KM {
        LocationMatchType::SameCity
    } else if distance_km <= effective_max as f64 {
        LocationMatchType::Commutable
    } else {
        LocationMatchType::RequiresRelocation
    }
}

fn same_field(a: &Option<String>, b: &Option<String>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin() -> CandidateLocation {
        CandidateLocation {
            city: "Berlin".to_string(),
            region: Some("Berlin".to_string()),
            country: Some("Germany".to_string()),
            coordinates: Some((52.52, 13.405)),
        }
    }

    fn job_in(city: &str, coordinates: Option<(f64, f64)>) -> JobLocationSpec {
        JobLocationSpec {
            city: city.to_string(),
            region: Some(city.to_string()),
            country: Some("Germany".to_string()),
            coordinates,
            remote_allowed: false,
            hybrid_allowed: true,
            max_commute_km: None,
        }
    }

    fn commuter() -> MobilityPreferences {
        MobilityPreferences {
            hybrid_ok: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // Berlin to Munich is roughly 500 km
        let d = haversine_km((52.52, 13.405), (48.137, 11.575));
        assert!(d > 480.0 && d < 520.0);
    }

    #[test]
    fn test_identical_coordinates_exact_match() {
        let analysis = LocationAnalyzer::new().analyze(
            &berlin(),
            &commuter(),
            &job_in("Berlin", Some((52.52, 13.405))),
        );
        assert_eq!(analysis.distance_km, 0.0);
        assert_eq!(analysis.match_type, LocationMatchType::Exact);
        // 90 hybrid + 10 exact would exceed 100; clamped
        assert_eq!(analysis.score, 100.0);
        assert!(analysis.is_viable);
    }

    #[test]
    fn test_tiered_estimate_same_city() {
        let candidate = CandidateLocation {
            city: "Berlin".to_string(),
            ..Default::default()
        };
        let analysis =
            LocationAnalyzer::new().analyze(&candidate, &commuter(), &job_in("berlin", None));
        assert_eq!(analysis.distance_km, 0.0);
        assert_eq!(analysis.match_type, LocationMatchType::Exact);
    }

    #[test]
    fn test_remote_only_against_remote_job() {
        let mobility = MobilityPreferences {
            remote_only: true,
            ..Default::default()
        };
        let mut job = job_in("Berlin", None);
        job.remote_allowed = true;

        let analysis = LocationAnalyzer::new().analyze(&berlin(), &mobility, &job);
        assert_eq!(analysis.score, 100.0);
        assert_eq!(analysis.work_arrangement, WorkArrangement::Remote);
    }

    #[test]
    fn test_remote_only_against_onsite_job() {
        let mobility = MobilityPreferences {
            remote_only: true,
            ..Default::default()
        };
        let analysis = LocationAnalyzer::new().analyze(&berlin(), &mobility, &job_in("Berlin", None));
        assert_eq!(analysis.score, 0.0);
        assert!(!analysis.is_viable);
        assert!(!analysis.recommendations.is_empty());
    }

    #[test]
    fn test_relocation_accepted() {
        let mobility = MobilityPreferences {
            open_to_relocation: true,
            ..Default::default()
        };
        // Berlin to Munich, far outside commute range
        let analysis = LocationAnalyzer::new().analyze(
            &berlin(),
            &mobility,
            &job_in("Munich", Some((48.137, 11.575))),
        );
        assert_eq!(analysis.match_type, LocationMatchType::RequiresRelocation);
        assert_eq!(analysis.score, 70.0);
        assert_eq!(analysis.work_arrangement, WorkArrangement::OnSite);
        assert!(analysis.recommendations.iter().any(|r| r.contains("elocation")));
    }

    #[test]
    fn test_relocation_refused() {
        let analysis = LocationAnalyzer::new().analyze(
            &berlin(),
            &commuter(),
            &job_in("Munich", Some((48.137, 11.575))),
        );
        assert_eq!(analysis.score, 0.0);
        assert!(!analysis.is_viable);
    }

    #[test]
    fn test_commutable_distance_penalty() {
        // Potsdam to Berlin center, ~27 km
        let candidate = CandidateLocation {
            city: "Potsdam".to_string(),
            coordinates: Some((52.39, 13.065)),
            ..Default::default()
        };
        let analysis = LocationAnalyzer::new().analyze(
            &candidate,
            &commuter(),
            &job_in("Berlin", Some((52.52, 13.405))),
        );
        assert_eq!(analysis.match_type, LocationMatchType::Commutable);
        assert_eq!(analysis.work_arrangement, WorkArrangement::Hybrid);
        // 90 hybrid base minus a proportional commute penalty
        assert!(analysis.score < 90.0);
        assert!(analysis.score > 70.0);
        assert!(analysis.is_viable);
    }

    #[test]
    fn test_unlisted_preferred_city_penalty() {
        let mobility = MobilityPreferences {
            hybrid_ok: true,
            preferred_cities: vec!["Hamburg".to_string()],
            ..Default::default()
        };
        let with_pref = LocationAnalyzer::new().analyze(
            &berlin(),
            &mobility,
            &job_in("Berlin", Some((52.52, 13.405))),
        );
        let without_pref = LocationAnalyzer::new().analyze(
            &berlin(),
            &commuter(),
            &job_in("Berlin", Some((52.52, 13.405))),
        );
        assert_eq!(without_pref.score - with_pref.score, 10.0);
    }

    #[test]
    fn test_hybrid_requires_both_sides() {
        let mut job = job_in("Berlin", Some((52.52, 13.405)));
        job.hybrid_allowed = false;
        let analysis = LocationAnalyzer::new().analyze(&berlin(), &commuter(), &job);
        assert_eq!(analysis.work_arrangement, WorkArrangement::OnSite);
        // 85 on-site + 10 exact
        assert_eq!(analysis.score, 95.0);
    }
}
