//! Text preparation shared by the catalog builder and the query path.
//!
//! Catalog embeddings and query embeddings are only comparable when both
//! sides go through exactly these functions. Any change to the templates or
//! to `normalize_text` must bump `TEXT_FORMAT`, which invalidates every
//! previously built catalog artifact.

use crate::models::job::JobDetails;
use crate::models::resume::ResumeQuery;

/// Version tag of the normalization + template scheme below.
pub const TEXT_FORMAT: &str = "v1";

/// Lowercases, collapses runs of whitespace into a single space and trims.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Joins `label: value` lines, leaving out empty values.
/// Returns an empty string when every value is empty so the encoder yields
/// the zero vector instead of embedding the bare labels.
fn labelled(parts: &[(&str, &str)]) -> String {
    parts
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("{label}: {}", value.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn position_text(position: &str) -> String {
    labelled(&[("job role", position)])
}

pub fn qualification_text(qualification: &str) -> String {
    labelled(&[("qualification", qualification)])
}

/// Skills plus the optional summary of a resume.
pub fn query_skills_text(query: &ResumeQuery) -> String {
    labelled(&[("skills", query.skills.as_str()), ("summary", query.summary.as_str())])
}

/// Headline experience plus the optional work history of a resume.
pub fn query_experience_text(query: &ResumeQuery) -> String {
    let combined = format!("{} {}", query.experience.trim(), query.work_experience.trim());
    labelled(&[("experience", combined.as_str())])
}

/// Skills plus the description of a job posting.
/// The description also carries the experience requirements, so the query's
/// experience text is scored against this embedding too.
pub fn job_skills_text(job: &JobDetails) -> String {
    labelled(&[
        ("skills", job.skills.as_str()),
        ("description", job.job_description.as_str()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_and_case() {
        assert_eq!(
            normalize_text("  Senior\tML \n\n Engineer  "),
            "senior ml engineer"
        );
    }

    #[test]
    fn test_normalize_whitespace_only_is_empty() {
        assert_eq!(normalize_text(" \t\n "), "");
    }

    #[test]
    fn test_empty_field_produces_empty_text() {
        assert_eq!(position_text(""), "");
        assert_eq!(qualification_text("   "), "");
    }

    #[test]
    fn test_skills_text_skips_missing_summary() {
        let query = ResumeQuery {
            skills: "Python, SQL".to_string(),
            ..ResumeQuery::default()
        };
        assert_eq!(query_skills_text(&query), "skills: Python, SQL");
    }

    #[test]
    fn test_experience_text_joins_work_history() {
        let query = ResumeQuery {
            experience: "3 years".to_string(),
            work_experience: "Backend at Acme".to_string(),
            ..ResumeQuery::default()
        };
        assert_eq!(
            query_experience_text(&query),
            "experience: 3 years Backend at Acme"
        );
    }

    #[test]
    fn test_empty_experience_produces_empty_text() {
        assert_eq!(query_experience_text(&ResumeQuery::default()), "");
    }
}
