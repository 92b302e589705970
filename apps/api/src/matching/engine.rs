//! Query Engine — ranks careers against a free-form skill list.
//!
//! `CareerMatcher` owns the catalog, vocabulary and career vectors. It is built
//! once at startup and shared behind an `Arc`; every query borrows it immutably
//! and allocates only its own output.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::matching::catalog::{Catalog, CareerRecord, CatalogLoadError, Vocabulary};
use crate::matching::index::{CareerIndex, SkillVector};

pub const DEFAULT_TOPN: usize = 10;
const MAX_TOP_SKILLS: usize = 10;
const MAX_LINKS: usize = 3;
const MAX_SUGGESTIONS: usize = 15;
/// Query terms longer than this also match as substrings of vocabulary terms.
const FUZZY_MIN_EXCLUSIVE: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Caller-supplied skills: a bare string is accepted as a one-element list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    One(String),
    Many(Vec<String>),
}

impl Default for SkillsInput {
    fn default() -> Self {
        SkillsInput::Many(vec![])
    }
}

impl SkillsInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            SkillsInput::One(skill) => vec![skill],
            SkillsInput::Many(skills) => skills,
        }
    }
}

/// One ranked career with the skills still to learn for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub career: String,
    #[serde(rename = "match")]
    pub score: f32,
    pub top_skills: Vec<String>,
    pub links: Vec<String>,
}

/// Typeahead result: matching vocabulary terms and career names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Suggestions {
    pub skills: Vec<String>,
    pub careers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CareerMatcher {
    records: Vec<CareerRecord>,
    vocabulary: Vocabulary,
    index: CareerIndex,
}

impl CareerMatcher {
    /// Loads the catalog at `path` and builds the index.
    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        Ok(Self::from_catalog(Catalog::load(path)?))
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        let index = CareerIndex::build(&catalog.records, &catalog.vocabulary);
        debug!(
            "Built {} career vectors over {} skills",
            index.len(),
            catalog.vocabulary.len()
        );
        Self {
            records: catalog.records,
            vocabulary: catalog.vocabulary,
            index,
        }
    }

    pub fn records(&self) -> &[CareerRecord] {
        &self.records
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Builds the query vector. A trimmed, lower-cased input matches a
    /// vocabulary term when equal to it, or when longer than two characters
    /// and contained in it ("pyth" hits "python"; "c" only hits "c").
    pub fn vectorize_query<S: AsRef<str>>(&self, skills: &[S]) -> SkillVector {
        let mut hits = Vec::new();
        for raw in skills {
            let needle = raw.as_ref().trim().to_lowercase();
            let fuzzy = needle.chars().count() > FUZZY_MIN_EXCLUSIVE;
            for (i, term) in self.vocabulary.terms().iter().enumerate() {
                if *term == needle || (fuzzy && term.contains(needle.as_str())) {
                    hits.push(i);
                }
            }
        }
        SkillVector::from_indicators(hits)
    }

    /// Ranks careers by cosine similarity to `skills` and returns at most
    /// `topn` of them. A query that matches no vocabulary term yields an
    /// empty list rather than an error.
    pub fn recommend_by_skills<S: AsRef<str>>(
        &self,
        skills: &[S],
        topn: usize,
    ) -> Result<Vec<Recommendation>, MatchError> {
        if topn == 0 {
            return Err(MatchError::InvalidArgument(
                "topn must be a positive integer".to_string(),
            ));
        }

        let query = self.vectorize_query(skills);
        if query.is_zero() {
            debug!("No vocabulary match for {} query skills", skills.len());
            return Ok(vec![]);
        }

        let mut ranked: Vec<(usize, f32)> = self
            .index
            .similarities(&query)
            .into_iter()
            .enumerate()
            .collect();
        // sort_by is stable: equal scores keep catalog order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let owned_terms: Vec<String> = skills
            .iter()
            .map(|s| s.as_ref().to_lowercase())
            .collect();

        let results: Vec<Recommendation> = ranked
            .into_iter()
            .take(topn)
            .map(|(i, score)| {
                let record = &self.records[i];
                Recommendation {
                    career: record.career.clone(),
                    score,
                    top_skills: skills_to_learn(&record.skills, &owned_terms),
                    links: record.links.iter().take(MAX_LINKS).cloned().collect(),
                }
            })
            .collect();

        debug!(
            "Ranked {} careers for {} query skills ({} vocabulary hits)",
            results.len(),
            skills.len(),
            query.indices().count()
        );
        Ok(results)
    }

    /// Case-insensitive substring search over vocabulary terms and career names.
    pub fn suggest(&self, query: &str) -> Suggestions {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Suggestions::default();
        }

        // vocabulary terms are already sorted and unique
        let skills = self
            .vocabulary
            .terms()
            .iter()
            .filter(|t| t.contains(needle.as_str()))
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect();

        let careers = self
            .records
            .iter()
            .map(|r| r.career.as_str())
            .filter(|c| c.to_lowercase().contains(needle.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(str::to_string)
            .collect();

        Suggestions { skills, careers }
    }

    /// Skills of the first career, in catalog order, whose name contains `name`
    /// case-insensitively. Blank or unmatched names give an empty slice.
    pub fn skills_for_career(&self, name: &str) -> &[String] {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return &[];
        }

        self.records
            .iter()
            .find(|r| r.career.to_lowercase().contains(needle.as_str()))
            .map(|r| r.skills.as_slice())
            .unwrap_or(&[])
    }
}

/// Career skills in authored order, minus any containing a query term.
fn skills_to_learn(career_skills: &[String], owned_terms: &[String]) -> Vec<String> {
    career_skills
        .iter()
        .filter(|skill| {
            let lower = skill.to_lowercase();
            !owned_terms.iter().any(|t| lower.contains(t.as_str()))
        })
        .take(MAX_TOP_SKILLS)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(career: &str, skills: &[&str], links: &[&str]) -> CareerRecord {
        CareerRecord {
            career: career.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            links: links.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matcher(records: Vec<CareerRecord>) -> CareerMatcher {
        CareerMatcher::from_catalog(Catalog::from_records(records))
    }

    fn two_career_matcher() -> CareerMatcher {
        matcher(vec![
            record(
                "Data Analyst",
                &["Python", "SQL", "Excel", "Statistics"],
                &[],
            ),
            record(
                "Web Developer",
                &["JavaScript", "HTML", "CSS", "Python"],
                &[],
            ),
        ])
    }

    fn hit_terms(m: &CareerMatcher, skills: &[&str]) -> Vec<String> {
        let terms = m.vocabulary().terms();
        m.vectorize_query(skills)
            .indices()
            .map(|i| terms[i].clone())
            .collect()
    }

    #[test]
    fn test_end_to_end_data_analyst_ranks_first() {
        let m = two_career_matcher();
        let results = m.recommend_by_skills(&["python", "sql"], 2).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].career, "Data Analyst");
        assert_eq!(results[1].career, "Web Developer");
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].top_skills, vec!["Excel", "Statistics"]);
        assert_eq!(results[1].top_skills, vec!["JavaScript", "HTML", "CSS"]);
    }

    #[test]
    fn test_scores_are_cosine_similarities() {
        let m = two_career_matcher();
        let results = m.recommend_by_skills(&["python", "sql"], 2).unwrap();
        // 2 shared of (2, 4) → 2 / (√2·2); 1 shared → 1 / (√2·2)
        assert!((results[0].score - 2.0 / (2.0_f32.sqrt() * 2.0)).abs() < 1e-5);
        assert!((results[1].score - 1.0 / (2.0_f32.sqrt() * 2.0)).abs() < 1e-5);
    }

    #[test]
    fn test_empty_query_returns_empty() {
        let m = two_career_matcher();
        let none: [&str; 0] = [];
        assert!(m.recommend_by_skills(&none, 10).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_skill_returns_empty() {
        let m = two_career_matcher();
        let results = m
            .recommend_by_skills(&["zzz_nonexistent_skill"], 10)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_topn_is_invalid_argument() {
        let m = two_career_matcher();
        let err = m.recommend_by_skills(&["python"], 0).unwrap_err();
        assert!(matches!(err, MatchError::InvalidArgument(_)));
    }

    #[test]
    fn test_result_length_capped_by_topn() {
        let m = two_career_matcher();
        let results = m.recommend_by_skills(&["python"], 1).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_topn_larger_than_catalog_returns_all() {
        let m = two_career_matcher();
        let results = m.recommend_by_skills(&["python"], 50).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let m = matcher(vec![
            record("Zookeeper", &["Animals"], &[]),
            record("Backend Developer", &["Go", "SQL"], &[]),
            record("Accountant", &["Excel"], &[]),
            record("Database Admin", &["SQL", "Go"], &[]),
        ]);
        let results = m.recommend_by_skills(&["sql"], 4).unwrap();
        let names: Vec<_> = results.iter().map(|r| r.career.as_str()).collect();
        assert_eq!(
            names,
            vec!["Backend Developer", "Database Admin", "Zookeeper", "Accountant"]
        );
        assert_eq!(results[2].score, 0.0);
        assert_eq!(results[3].score, 0.0);
    }

    #[test]
    fn test_short_term_matches_only_exactly() {
        let m = matcher(vec![
            record("Embedded Engineer", &["C", "C++", "Rust"], &[]),
            record("Statistician", &["R", "Regression"], &[]),
        ]);
        assert_eq!(hit_terms(&m, &["c"]), vec!["c"]);
        assert_eq!(hit_terms(&m, &["r"]), vec!["r"]);
        assert!(hit_terms(&m, &["ru"]).is_empty());
    }

    #[test]
    fn test_long_term_matches_as_substring() {
        let m = matcher(vec![record(
            "Developer",
            &["Python", "JavaScript", "Java"],
            &[],
        )]);
        assert_eq!(hit_terms(&m, &["pyt"]), vec!["python"]);
        // "java" is a substring of "javascript" too
        assert_eq!(hit_terms(&m, &["java"]), vec!["java", "javascript"]);
    }

    #[test]
    fn test_substring_direction_is_query_in_term() {
        let m = matcher(vec![record("Planner", &["Program"], &[])]);
        assert!(hit_terms(&m, &["programming"]).is_empty());
        assert_eq!(hit_terms(&m, &["gram"]), vec!["program"]);
    }

    #[test]
    fn test_query_terms_are_trimmed_and_lowercased() {
        let m = two_career_matcher();
        assert_eq!(hit_terms(&m, &["  SQL  "]), vec!["sql"]);
    }

    #[test]
    fn test_query_vector_is_unit_length() {
        let m = two_career_matcher();
        let v = m.vectorize_query(&["python", "sql", "css"]);
        assert!((v.norm() - 1.0).abs() < 1e-5);
        assert_eq!(m.vectorize_query(&["nothing here"]).norm(), 0.0);
    }

    #[test]
    fn test_top_skills_exclude_partial_overlap() {
        let m = matcher(vec![record(
            "Data Scientist",
            &["Machine Learning", "Deep Learning", "Python", "Statistics"],
            &[],
        )]);
        let results = m.recommend_by_skills(&["learning"], 1).unwrap();
        assert_eq!(results[0].top_skills, vec!["Python", "Statistics"]);
    }

    #[test]
    fn test_top_skills_and_links_are_capped() {
        let skills: Vec<String> = (0..15).map(|i| format!("Skill {i:02}")).collect();
        let skill_refs: Vec<&str> = skills.iter().map(String::as_str).collect();
        let m = matcher(vec![record(
            "Polymath",
            &skill_refs,
            &["l1", "l2", "l3", "l4", "l5"],
        )]);

        let results = m.recommend_by_skills(&["skill 00"], 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].top_skills.len(), 10);
        assert_eq!(results[0].top_skills[0], "Skill 01");
        assert_eq!(results[0].links, vec!["l1", "l2", "l3"]);
    }

    #[test]
    fn test_self_similarity_ranks_top() {
        let m = matcher(vec![
            record("Data Analyst", &["Python", "SQL", "Excel", "Statistics"], &[]),
            record("Web Developer", &["JavaScript", "HTML", "CSS", "Python"], &[]),
            record("DevOps Engineer", &["Linux", "Docker", "Kubernetes", "Python"], &[]),
        ]);
        for target in m.records().to_vec() {
            let query: Vec<String> = target.skills.iter().map(|s| s.to_lowercase()).collect();
            let results = m.recommend_by_skills(&query, 3).unwrap();
            let own = results.iter().find(|r| r.career == target.career).unwrap();
            assert!(results.iter().all(|r| own.score >= r.score));
            assert_eq!(results[0].career, target.career);
        }
    }

    #[test]
    fn test_skills_input_bare_string_is_one_element() {
        let single: SkillsInput = serde_json::from_str(r#""python""#).unwrap();
        assert_eq!(single.into_vec(), vec!["python"]);
        let many: SkillsInput = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(many.into_vec(), vec!["a", "b"]);
        assert!(SkillsInput::default().into_vec().is_empty());
    }

    #[test]
    fn test_recommendation_serializes_match_key() {
        let rec = Recommendation {
            career: "X".to_string(),
            score: 0.5,
            top_skills: vec![],
            links: vec![],
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["match"], 0.5);
        assert!(value.get("score").is_none());
    }

    #[test]
    fn test_suggest_blank_query_is_empty() {
        let m = two_career_matcher();
        assert_eq!(m.suggest(""), Suggestions::default());
        assert_eq!(m.suggest("   "), Suggestions::default());
    }

    #[test]
    fn test_suggest_matches_skills_and_careers() {
        let m = matcher(vec![
            record("Web Developer", &["JavaScript", "Java"], &[]),
            record("Data Analyst", &["SQL"], &[]),
            record("Java Developer", &["Java", "Spring"], &[]),
        ]);
        let s = m.suggest("JAVA");
        assert_eq!(s.skills, vec!["java", "javascript"]);
        assert_eq!(s.careers, vec!["Java Developer"]);

        let s = m.suggest("dev");
        assert!(s.skills.is_empty());
        assert_eq!(s.careers, vec!["Java Developer", "Web Developer"]);
    }

    #[test]
    fn test_suggest_dedups_and_caps_at_fifteen() {
        let mut records: Vec<CareerRecord> = (0..20)
            .map(|i| {
                let skill = format!("tool {i:02}");
                record(&format!("Engineer {i:02}"), &[skill.as_str()], &[])
            })
            .collect();
        records.push(record("Engineer 00", &["tool 00"], &[]));
        let m = matcher(records);

        let s = m.suggest("0");
        assert_eq!(s.skills.len(), 11);
        assert_eq!(s.careers.len(), 11);

        let s = m.suggest("e");
        assert_eq!(s.careers.len(), 15);
        assert_eq!(s.careers[0], "Engineer 00");
        assert_eq!(s.careers[14], "Engineer 14");
        let s = m.suggest("tool");
        assert_eq!(s.skills.len(), 15);
        assert_eq!(s.skills[14], "tool 14");
    }

    #[test]
    fn test_skills_for_career_first_match_wins() {
        let m = matcher(vec![
            record("Data Analyst", &["SQL"], &[]),
            record("Web Developer", &["HTML", "CSS"], &[]),
            record("DevOps Engineer", &["Docker"], &[]),
        ]);
        assert_eq!(m.skills_for_career("dev"), ["HTML", "CSS"]);
        assert_eq!(m.skills_for_career("DEVOPS"), ["Docker"]);
    }

    #[test]
    fn test_skills_for_career_blank_or_unknown_is_empty() {
        let m = two_career_matcher();
        assert!(m.skills_for_career("").is_empty());
        assert!(m.skills_for_career("  ").is_empty());
        assert!(m.skills_for_career("astronaut").is_empty());
    }
}
