//! Per-dimension candidate analyzers
//!
//! Each analyzer is independent and synchronous; the aggregator composes
//! their outputs into a single report.

pub mod criteria;
pub mod education;
pub mod experience;
pub mod location;
pub mod red_flags;
pub mod skills;

pub use criteria::{CustomCriteriaAnalysis, CustomCriteriaAnalyzer, CustomCriterion};
pub use education::{EducationAnalysis, EducationAnalyzer};
pub use experience::{ExperienceAnalysis, ExperienceAnalyzer};
pub use location::{LocationAnalysis, LocationAnalyzer};
pub use red_flags::{RedFlagAnalysis, RedFlagAnalyzer};
pub use skills::{SkillsAnalysis, SkillsAnalyzer};
