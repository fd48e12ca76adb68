//! Prompt construction for the LLM match scorer.

use crate::llm_client::prompts::{EVIDENCE_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::models::job::JobDescription;
use crate::models::resume::ResumeRecord;

/// System prompt for scoring calls.
pub fn scoring_system() -> String {
    format!("{JSON_ONLY_SYSTEM}\n\n{EVIDENCE_INSTRUCTION}")
}

/// Builds the user prompt for one (job, resume) scoring call.
pub fn build_scoring_prompt(job: &JobDescription, resume: &ResumeRecord) -> String {
    let mut prompt = String::new();

    prompt.push_str("Evaluate how well the following resume matches the job posting.\n\n");

    prompt.push_str(&format!("JOB TITLE: {}\n\nJOB DESCRIPTION:\n{}\n", job.title, job.description));
    if !job.requirements.is_empty() {
        prompt.push_str("\nREQUIREMENTS:\n");
        for requirement in &job.requirements {
            prompt.push_str(&format!("- {requirement}\n"));
        }
    }

    prompt.push_str("\nRESUME DATA:\n");
    prompt.push_str(&format!("Skills: {}\n", resume.skills.join(", ")));

    if !resume.education_details.is_empty() {
        prompt.push_str("Education:\n");
        for education in &resume.education_details {
            let degree = education.degree.as_deref().unwrap_or("(unknown degree)");
            let major = education.major.as_deref().unwrap_or("");
            let institute = education.institute.as_deref().unwrap_or("(unknown institute)");
            prompt.push_str(&format!("- {degree} {major} — {institute}\n"));
        }
    }

    if !resume.work_experience_details.is_empty() {
        prompt.push_str("Work experience:\n");
        for experience in &resume.work_experience_details {
            let company = experience.company.as_deref().unwrap_or("(unknown company)");
            let position = experience.position.as_deref().unwrap_or("(unknown role)");
            let period = experience
                .duration
                .as_ref()
                .map(|d| {
                    format!(
                        " ({} – {})",
                        d.start,
                        d.end.as_deref().unwrap_or("present")
                    )
                })
                .unwrap_or_default();
            prompt.push_str(&format!("- {position} at {company}{period}\n"));
            if !experience.technologies.is_empty() {
                prompt.push_str(&format!(
                    "  technologies: {}\n",
                    experience.technologies.join(", ")
                ));
            }
        }
    }

    prompt.push_str(
        "\nReturn a JSON object with exactly these fields:\n\
         {\n\
           \"match_percentage\": <number 0-100>,\n\
           \"matching_skills\": [<skills from the resume that satisfy the job>],\n\
           \"missing_requirements\": [<job requirements the resume does not cover>],\n\
           \"experience_match\": <true if work history fits the role>,\n\
           \"education_match\": <true if education fits the role>,\n\
           \"overall_assessment\": \"<2-3 sentence summary>\"\n\
         }\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::resume::{Education, WorkExperience, WorkPeriod};

    fn job() -> JobDescription {
        let now = Utc::now();
        JobDescription {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Senior Rust Engineer".to_string(),
            description: "Build the matching backend.".to_string(),
            requirements: vec!["5+ years Rust".to_string(), "PostgreSQL".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    fn resume() -> ResumeRecord {
        ResumeRecord {
            filename: "jane.pdf".to_string(),
            owner_id: Uuid::new_v4(),
            owner_email: "recruiter@example.com".to_string(),
            name: Some("Jane Doe".to_string()),
            email: None,
            skills: vec!["Rust".to_string(), "Tokio".to_string()],
            education_details: vec![Education {
                degree: Some("B.S.".to_string()),
                major: Some("Computer Science".to_string()),
                institute: Some("MIT".to_string()),
            }],
            work_experience_details: vec![WorkExperience {
                company: Some("Acme".to_string()),
                position: Some("Backend Engineer".to_string()),
                duration: Some(WorkPeriod {
                    start: "Jan 2020".to_string(),
                    end: None,
                }),
                responsibilities: vec![],
                technologies: vec!["Rust".to_string()],
            }],
        }
    }

    #[test]
    fn test_prompt_includes_job_and_requirements() {
        let prompt = build_scoring_prompt(&job(), &resume());
        assert!(prompt.contains("Senior Rust Engineer"));
        assert!(prompt.contains("- 5+ years Rust"));
        assert!(prompt.contains("- PostgreSQL"));
    }

    #[test]
    fn test_prompt_includes_resume_details() {
        let prompt = build_scoring_prompt(&job(), &resume());
        assert!(prompt.contains("Rust, Tokio"));
        assert!(prompt.contains("MIT"));
        assert!(prompt.contains("Backend Engineer at Acme (Jan 2020 – present)"));
    }

    #[test]
    fn test_prompt_names_every_output_field() {
        let prompt = build_scoring_prompt(&job(), &resume());
        for field in [
            "match_percentage",
            "matching_skills",
            "missing_requirements",
            "experience_match",
            "education_match",
            "overall_assessment",
        ] {
            assert!(prompt.contains(field), "missing field {field}");
        }
    }

    #[test]
    fn test_system_prompt_forbids_prose() {
        let system = scoring_system();
        assert!(system.contains("valid JSON only"));
        assert!(system.contains("missing_requirements"));
    }
}
