use serde::Deserialize;

/// Raw resume fields as they arrive in a request body.
/// Every field is optional; `ResumeQuery::from` applies the defaults once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchRequest {
    pub position: Option<String>,
    pub skills: Option<String>,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub summary: Option<String>,
    pub work_experience: Option<String>,
    pub location: Option<String>,
}

/// A validated matching request. Absent text fields are empty strings,
/// an absent or blank location is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeQuery {
    pub position: String,
    pub skills: String,
    pub qualification: String,
    pub experience: String,
    pub summary: String,
    pub work_experience: String,
    pub location: Option<String>,
}

impl ResumeQuery {
    /// True when no field carries any text to match on.
    pub fn is_blank(&self) -> bool {
        [
            &self.position,
            &self.skills,
            &self.qualification,
            &self.experience,
            &self.summary,
            &self.work_experience,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }
}

impl From<MatchRequest> for ResumeQuery {
    fn from(req: MatchRequest) -> Self {
        Self {
            position: req.position.unwrap_or_default(),
            skills: req.skills.unwrap_or_default(),
            qualification: req.qualification.unwrap_or_default(),
            experience: req.experience.unwrap_or_default(),
            summary: req.summary.unwrap_or_default(),
            work_experience: req.work_experience.unwrap_or_default(),
            location: req
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        }
    }
}
