//! Prompt construction — one builder method per pipeline stage.
//!
//! Every prompt deterministically encodes the instruction, the required
//! output shape, and the supplied context fields verbatim. The résumé and
//! job-description texts pass through unmodified up to the configured size
//! limit; oversized input is rejected with `InputTooLarge`, never truncated.

use thiserror::Error;

use crate::pipeline::models::{ApplicantLevel, PipelineInput};

/// Placeholder used when the caller supplies no current résumé.
const NO_RESUME_PROVIDED: &str = "No resume provided";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("{field} is {len} characters, exceeding the {limit}-character input limit")]
    InputTooLarge {
        field: &'static str,
        len: usize,
        limit: usize,
    },
}

/// Stage 1: role detection. Replace `{job_description}`.
const ROLE_DETECTION_PROMPT: &str = r#"Analyze the following job description and identify the primary job role/title.

Job Description: {job_description}

Respond with ONLY the job title/role in this exact format:
"Detected Role: [Job Title]"

Examples:
- "Detected Role: Software Engineer"
- "Detected Role: Marketing Manager"
- "Detected Role: Data Analyst"

Be specific and concise. Do not include any additional text or explanation."#;

/// Stage 2: template recommendation. Replace `{detected_role}`, `{applicant_level}`.
const TEMPLATE_RECOMMENDATION_PROMPT: &str = r#"Recommend the best resume template for this role and experience level.

Role: {detected_role}
Experience Level: {applicant_level}

Available templates:
- Minimal: Clean, simple design
- Modern: Contemporary with subtle colors
- Tech: Technical-focused with code elements
- Elegant: Professional with sophisticated styling

Respond with ONLY the template name (Minimal, Modern, Tech, or Elegant).

Consider:
- Industry standards for the role
- Experience level appropriateness
- Professional presentation"#;

/// Stage 3: résumé rewrite. Replace `{detected_role}`, `{company_name}`,
/// `{applicant_level}`, `{job_description}`, `{current_resume}`.
const RESUME_REWRITE_PROMPT: &str = r#"You are a professional career coach and resume optimization expert.
Generate an improved resume tailored for the detected role: {detected_role}

Inputs:
Company Name: {company_name}
Experience Level: {applicant_level}
Job Description: {job_description}
Current Resume: {current_resume}

Output (valid JSON only, no markdown fences, exactly this schema):
{
  "summary": "Optimized professional summary (2-3 sentences)",
  "skills": ["skill1", "skill2", "skill3", "skill4", "skill5"],
  "experience": [
    {
      "title": "Job Title",
      "company": "Company Name",
      "duration": "Duration",
      "achievements": ["achievement1", "achievement2", "achievement3"]
    }
  ],
  "projects": [
    {
      "name": "Project Name",
      "description": "Brief project description",
      "technologies": ["tech1", "tech2", "tech3"],
      "achievements": ["achievement1", "achievement2"]
    }
  ],
  "education": {
    "degree": "Degree Name",
    "institution": "Institution Name",
    "year": "Graduation Year"
  }
}

Ensure the content is:
- Tailored to {detected_role}
- ATS-friendly
- Achievement-focused with metrics where possible
- Professional and concise"#;

/// Stage 4: cover letter. Replace `{detected_role}`, `{company_name}`,
/// `{applicant_level}`, `{job_description}`, `{current_resume}`, `{tone}`.
const COVER_LETTER_PROMPT: &str = r#"Write a professional cover letter for the position: {detected_role}

Company: {company_name}
Experience Level: {applicant_level}
Job Description: {job_description}
Current Resume: {current_resume}
Tone: {tone}

Requirements:
- Address to {company_name}
- Use {tone} tone
- Highlight relevant skills for {detected_role}
- Show enthusiasm for the role
- Keep it professional and concise (3-4 paragraphs)
- Include specific references to the job description

Format as a proper cover letter with appropriate greeting and closing."#;

/// Stage 5: ATS breakdown. Replace `{job_description}`, `{resume_json}`,
/// `{detected_role}`.
const ATS_BREAKDOWN_PROMPT: &str = r#"Analyze the resume for ATS compatibility and provide a detailed breakdown.

Job Description: {job_description}
Improved Resume: {resume_json}
Detected Role: {detected_role}

Provide the analysis as valid JSON only (no markdown fences) in this format:
{
  "overallScore": 85,
  "categories": {
    "formatting": {"score": 90, "feedback": "Well-formatted with clear sections"},
    "keywords": {"score": 80, "feedback": "Good keyword usage, missing some technical terms"},
    "readability": {"score": 85, "feedback": "Clear and concise writing"},
    "actionVerbs": {"score": 75, "feedback": "Could use more action verbs"}
  },
  "missingKeywords": ["keyword1", "keyword2", "keyword3"],
  "recommendations": ["Add more technical skills", "Include specific metrics"]
}

All scores are integers from 0 to 100. Evaluate based on:
- ATS-friendly formatting
- Keyword matching with the job description
- Readability and clarity
- Use of action verbs"#;

/// Stage 6: skill gap. Replace `{job_description}`, `{resume_json}`,
/// `{detected_role}`, `{applicant_level}`.
const SKILL_GAP_PROMPT: &str = r#"Analyze the skill gap between the current resume and the job requirements.

Job Description: {job_description}
Improved Resume: {resume_json}
Detected Role: {detected_role}
Experience Level: {applicant_level}

Provide the analysis as valid JSON only (no markdown fences) in this format:
{
  "missingSkills": [
    {"skill": "React.js", "importance": "High", "reason": "Required for frontend development"}
  ],
  "recommendedSkills": [
    {"skill": "TypeScript", "importance": "Medium", "reason": "Would strengthen the resume"}
  ],
  "existingSkills": ["JavaScript", "HTML", "CSS"],
  "skillMatchPercentage": 75
}

"importance" is exactly one of "Low", "Medium", "High".
"skillMatchPercentage" is an integer from 0 to 100.

Focus on:
- Skills mentioned in the job description but missing from the resume
- Skills that would strengthen the application
- Current skills that match the requirements"#;

/// Stage 7: project suggestions. Replace `{detected_role}`, `{job_description}`.
const PROJECT_SUGGESTIONS_PROMPT: &str = r#"Generate 2-3 relevant project ideas for a fresher applying for: {detected_role}

Job Description: {job_description}
Experience Level: Fresher

Provide the projects as a valid JSON array only (no markdown fences) in this format:
[
  {
    "name": "Project Name",
    "description": "Detailed project description",
    "technologies": ["tech1", "tech2", "tech3"],
    "learningOutcomes": ["outcome1", "outcome2"],
    "difficulty": "Beginner",
    "estimatedTime": "2-3 weeks"
  }
]

"difficulty" is exactly one of "Beginner", "Intermediate", "Advanced".

Requirements:
- Projects must be relevant to {detected_role}
- Suitable for beginners
- Demonstrate practical skills
- Include modern technologies mentioned in the job description
- Provide clear learning outcomes"#;

/// Builds one prompt per stage. Stateless apart from the input size limit.
pub struct PromptBuilder {
    max_input_chars: usize,
}

impl PromptBuilder {
    pub fn new(max_input_chars: usize) -> Self {
        Self { max_input_chars }
    }

    /// Rejects oversized free-text fields before the pipeline issues any
    /// generation call.
    pub fn check_input(&self, input: &PipelineInput) -> Result<(), PromptError> {
        self.check_len("jobDescription", &input.job_description)?;
        if let Some(resume) = &input.current_resume {
            self.check_len("currentResume", resume)?;
        }
        Ok(())
    }

    fn check_len(&self, field: &'static str, text: &str) -> Result<(), PromptError> {
        let len = text.chars().count();
        if len > self.max_input_chars {
            return Err(PromptError::InputTooLarge {
                field,
                len,
                limit: self.max_input_chars,
            });
        }
        Ok(())
    }

    fn current_resume<'a>(input: &'a PipelineInput) -> &'a str {
        match input.current_resume.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => NO_RESUME_PROVIDED,
        }
    }

    pub fn role_detection(&self, input: &PipelineInput) -> Result<String, PromptError> {
        self.check_len("jobDescription", &input.job_description)?;
        Ok(ROLE_DETECTION_PROMPT.replace("{job_description}", &input.job_description))
    }

    pub fn template_recommendation(&self, detected_role: &str, level: ApplicantLevel) -> String {
        TEMPLATE_RECOMMENDATION_PROMPT
            .replace("{detected_role}", detected_role)
            .replace("{applicant_level}", level.as_str())
    }

    pub fn resume_rewrite(
        &self,
        input: &PipelineInput,
        detected_role: &str,
    ) -> Result<String, PromptError> {
        self.check_input(input)?;
        Ok(RESUME_REWRITE_PROMPT
            .replace("{detected_role}", detected_role)
            .replace("{company_name}", &input.company_name)
            .replace("{applicant_level}", input.applicant_level.as_str())
            .replace("{job_description}", &input.job_description)
            .replace("{current_resume}", Self::current_resume(input)))
    }

    pub fn cover_letter(
        &self,
        input: &PipelineInput,
        detected_role: &str,
    ) -> Result<String, PromptError> {
        self.check_input(input)?;
        Ok(COVER_LETTER_PROMPT
            .replace("{detected_role}", detected_role)
            .replace("{company_name}", &input.company_name)
            .replace("{applicant_level}", input.applicant_level.as_str())
            .replace("{job_description}", &input.job_description)
            .replace("{current_resume}", Self::current_resume(input))
            .replace("{tone}", input.cover_letter_tone.as_str()))
    }

    pub fn ats_breakdown(
        &self,
        input: &PipelineInput,
        resume_json: &str,
        detected_role: &str,
    ) -> Result<String, PromptError> {
        self.check_len("jobDescription", &input.job_description)?;
        Ok(ATS_BREAKDOWN_PROMPT
            .replace("{job_description}", &input.job_description)
            .replace("{resume_json}", resume_json)
            .replace("{detected_role}", detected_role))
    }

    pub fn skill_gap(
        &self,
        input: &PipelineInput,
        resume_json: &str,
        detected_role: &str,
    ) -> Result<String, PromptError> {
        self.check_len("jobDescription", &input.job_description)?;
        Ok(SKILL_GAP_PROMPT
            .replace("{job_description}", &input.job_description)
            .replace("{resume_json}", resume_json)
            .replace("{detected_role}", detected_role)
            .replace("{applicant_level}", input.applicant_level.as_str()))
    }

    pub fn project_suggestions(
        &self,
        input: &PipelineInput,
        detected_role: &str,
    ) -> Result<String, PromptError> {
        self.check_len("jobDescription", &input.job_description)?;
        Ok(PROJECT_SUGGESTIONS_PROMPT
            .replace("{detected_role}", detected_role)
            .replace("{job_description}", &input.job_description))
    }
}
