//! Skill catalog: category membership and synonym equivalence
//!
//! The authored table maps each canonical skill to one category and an
//! optional synonym list. At load time the one-directional synonym lists are
//! expanded into symmetric, transitive equivalence classes; the catalog is
//! immutable after that.

use crate::error::{MatcherError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub struct SkillsCatalog {
    category_of: HashMap<String, String>,
    class_of: HashMap<String, usize>,
    classes: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    skills: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    category: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

/// Built-in skill table. Canonical name first, synonyms after.
const DEFAULT_SKILLS: &[(&str, &str, &[&str])] = &[
    // Programming languages
    ("languages", "javascript", &["js", "ecmascript"]),
    ("languages", "typescript", &["ts"]),
    ("languages", "python", &["py"]),
    ("languages", "java", &[]),
    ("languages", "c++", &["cpp"]),
    ("languages", "c#", &["csharp"]),
    ("languages", "go", &["golang"]),
    ("languages", "rust", &[]),
    ("languages", "ruby", &[]),
    ("languages", "php", &[]),
    ("languages", "kotlin", &[]),
    ("languages", "swift", &[]),
    ("languages", "scala", &[]),
    // Frontend
    ("frontend", "react", &["reactjs", "react.js"]),
    ("frontend", "angular", &["angularjs"]),
    ("frontend", "vue", &["vuejs", "vue.js"]),
    ("frontend", "html", &["html5"]),
    ("frontend", "css", &["css3"]),
    ("frontend", "sass", &["scss"]),
    ("frontend", "redux", &[]),
    ("frontend", "next.js", &["nextjs"]),
    // Backend
    ("backend", "node.js", &["node", "nodejs"]),
    ("backend", "express", &["expressjs"]),
    ("backend", "django", &[]),
    ("backend", "flask", &[]),
    ("backend", "spring", &["spring boot"]),
    ("backend", "rails", &["ruby on rails"]),
    ("backend", "graphql", &[]),
    ("backend", "rest", &["restful"]),
    ("backend", "grpc", &[]),
    // Databases
    ("databases", "postgresql", &["postgres"]),
    ("databases", "mysql", &[]),
    ("databases", "mongodb", &["mongo"]),
    ("databases", "redis", &[]),
    ("databases", "sqlite", &[]),
    ("databases", "elasticsearch", &[]),
    ("databases", "sql", &[]),
    // Cloud and infrastructure
    ("cloud", "aws", &["amazon web services"]),
    ("cloud", "azure", &[]),
    ("cloud", "gcp", &["google cloud"]),
    ("cloud", "docker", &[]),
    ("cloud", "kubernetes", &["k8s"]),
    ("cloud", "terraform", &[]),
    ("cloud", "jenkins", &[]),
    ("cloud", "ci/cd", &["cicd", "continuous integration"]),
    ("cloud", "linux", &[]),
    // Data and ML
    ("data", "machine learning", &["ml"]),
    ("data", "tensorflow", &[]),
    ("data", "pytorch", &[]),
    ("data", "pandas", &[]),
    ("data", "numpy", &[]),
    ("data", "spark", &[]),
    ("data", "kafka", &[]),
    // Soft skills and process
    ("soft", "leadership", &[]),
    ("soft", "communication", &[]),
    ("soft", "teamwork", &["collaboration"]),
    ("soft", "problem solving", &["problem-solving"]),
    ("soft", "project management", &[]),
    ("soft", "mentoring", &["coaching"]),
    ("soft", "agile", &[]),
    ("soft", "scrum", &[]),
];

impl SkillsCatalog {
    /// Catalog built from the embedded default table.
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        for (category, name, synonyms) in DEFAULT_SKILLS {
            catalog.insert(name, category, synonyms.iter().copied());
        }
        catalog
    }

    /// Load a catalog from a TOML file, replacing the default table.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| MatcherError::Configuration(format!("Failed to parse skill catalog: {}", e)))?;

        if file.skills.is_empty() {
            return Err(MatcherError::Configuration(
                "Skill catalog contains no skills".to_string(),
            ));
        }

        let mut catalog = Self::empty();
        for entry in &file.skills {
            catalog.insert(&entry.name, &entry.category, entry.synonyms.iter().map(|s| s.as_str()));
        }
        Ok(catalog)
    }

    fn empty() -> Self {
        Self {
            category_of: HashMap::new(),
            class_of: HashMap::new(),
            classes: Vec::new(),
        }
    }

    fn insert<'a>(&mut self, name: &str, category: &str, synonyms: impl Iterator<Item = &'a str>) {
        let canonical = name.trim().to_lowercase();
        let mut members = vec![canonical.clone()];
        members.extend(synonyms.map(|s| s.trim().to_lowercase()));

        // Merge into an existing class if any member is already known, so
        // equivalence stays transitive across authored entries.
        let class_id = members
            .iter()
            .find_map(|m| self.class_of.get(m).copied())
            .unwrap_or_else(|| {
                self.classes.push(Vec::new());
                self.classes.len() - 1
            });

        for member in members {
            if !self.classes[class_id].contains(&member) {
                self.classes[class_id].push(member.clone());
            }
            self.class_of.insert(member.clone(), class_id);
            self.category_of.entry(member).or_insert_with(|| category.to_lowercase());
        }
    }

    /// The skill itself plus every name considered equivalent to it.
    /// Unknown skills map to a singleton set.
    pub fn variants(&self, skill: &str) -> Vec<String> {
        let key = skill.trim().to_lowercase();
        match self.class_of.get(&key) {
            Some(&id) => {
                let mut out = vec![key.clone()];
                out.extend(self.classes[id].iter().filter(|m| **m != key).cloned());
                out
            }
            None => vec![key],
        }
    }

    /// Symmetric equivalence test. A skill is always equivalent to itself.
    pub fn is_equivalent(&self, a: &str, b: &str) -> bool {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a == b {
            return true;
        }
        match (self.class_of.get(&a), self.class_of.get(&b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Canonical name of a skill's equivalence class, if known.
    pub fn canonical(&self, skill: &str) -> Option<&str> {
        let key = skill.trim().to_lowercase();
        self.class_of
            .get(&key)
            .and_then(|&id| self.classes[id].first())
            .map(|s| s.as_str())
    }

    pub fn category_of(&self, skill: &str) -> Option<&str> {
        self.category_of.get(&skill.trim().to_lowercase()).map(|s| s.as_str())
    }

    /// Number of distinct equivalence classes.
    pub fn skill_count(&self) -> usize {
        self.classes.len()
    }

    /// Every known name, canonical and synonym alike.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.class_of.keys().map(|s| s.as_str())
    }
}

impl Default for SkillsCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_loads() {
        let catalog = SkillsCatalog::new();
        assert!(catalog.skill_count() > 30);
        assert_eq!(catalog.category_of("react"), Some("frontend"));
        assert_eq!(catalog.category_of("js"), Some("languages"));
    }

    #[test]
    fn test_variants_include_synonyms() {
        let catalog = SkillsCatalog::new();
        let variants = catalog.variants("javascript");
        assert!(variants.contains(&"js".to_string()));
        assert!(variants.contains(&"ecmascript".to_string()));
        assert_eq!(variants[0], "javascript");
    }

    #[test]
    fn test_unknown_skill_is_singleton() {
        let catalog = SkillsCatalog::new();
        assert_eq!(catalog.variants("cobol"), vec!["cobol".to_string()]);
        assert_eq!(catalog.category_of("cobol"), None);
    }

    #[test]
    fn test_equivalence_is_symmetric() {
        let catalog = SkillsCatalog::new();
        for name in catalog.all_names() {
            for other in catalog.variants(name) {
                assert_eq!(
                    catalog.is_equivalent(name, &other),
                    catalog.is_equivalent(&other, name),
                    "asymmetric equivalence for {} / {}",
                    name,
                    other
                );
            }
        }
        assert!(catalog.is_equivalent("k8s", "kubernetes"));
        assert!(catalog.is_equivalent("kubernetes", "k8s"));
        assert!(!catalog.is_equivalent("kubernetes", "docker"));
    }

    #[test]
    fn test_equivalence_is_transitive() {
        let catalog = SkillsCatalog::new();
        // js <-> javascript <-> ecmascript all share one class
        assert!(catalog.is_equivalent("js", "ecmascript"));
    }

    #[test]
    fn test_toml_catalog() {
        let toml = r#"
            [[skills]]
            name = "fortran"
            category = "languages"
            synonyms = ["f90"]

            [[skills]]
            name = "cobol"
            category = "languages"
        "#;
        let catalog = SkillsCatalog::from_toml_str(toml).unwrap();
        assert_eq!(catalog.skill_count(), 2);
        assert!(catalog.is_equivalent("fortran", "f90"));
        assert_eq!(catalog.canonical("f90"), Some("fortran"));
    }

    #[test]
    fn test_empty_toml_rejected() {
        assert!(SkillsCatalog::from_toml_str("").is_err());
    }
}
