//! Candidate matcher library
//!
//! Deterministic scoring of candidate profiles against structured job
//! specifications, with multi-candidate ranking and optional narrative
//! enrichment.

pub mod aggregator;
pub mod analyzers;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod extract;
pub mod input;
pub mod output;
pub mod profile;
pub mod similarity;

pub use aggregator::{AnalysisAggregator, BatchOutcome, Candidate, CandidateReport, Verdict};
pub use catalog::SkillsCatalog;
pub use config::{AppConfig, JobSpec};
pub use error::{MatcherError, Result};
pub use profile::CandidateProfile;
