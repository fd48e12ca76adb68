use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One education entry extracted from a resume. All fields are free-form;
/// parsers disagree on degree naming far too often to enumerate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Education {
    pub degree: Option<String>,
    pub major: Option<String>,
    pub institute: Option<String>,
}

/// A start/end pair as it appears on the resume ("Jan 2020", "2021", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPeriod {
    pub start: String,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: Option<String>,
    pub position: Option<String>,
    pub duration: Option<WorkPeriod>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// A parsed resume as supplied by the resume pool. Immutable once parsed:
/// the upload/extraction pipeline writes it exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    /// Unique per owner; identity component of every candidate derived from it.
    pub filename: String,
    pub owner_id: Uuid,
    pub owner_email: String,
    /// Candidate name/email as extracted from the resume text, when the
    /// parser found them.
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education_details: Vec<Education>,
    #[serde(default)]
    pub work_experience_details: Vec<WorkExperience>,
}

impl ResumeRecord {
    /// Display name for the candidate: parsed name, else the filename stem.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self
                .filename
                .rsplit_once('.')
                .map(|(stem, _)| stem.to_string())
                .unwrap_or_else(|| self.filename.clone()),
        }
    }

    /// Contact email for the candidate: parsed email, else the uploader's.
    pub fn contact_email(&self) -> String {
        match &self.email {
            Some(email) if !email.trim().is_empty() => email.clone(),
            _ => self.owner_email.clone(),
        }
    }
}
