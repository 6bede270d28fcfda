//! Resume review — summary of the resume plus improvement suggestions.
//! Canonical input is an uploaded document; pasted text is also accepted.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::flows::invoker::Flow;
use crate::flows::prompts::{RESUME_REVIEW_SYSTEM, RESUME_REVIEW_TEMPLATE};
use crate::flows::schema::{
    require_text, ResumeFields, ResumePayload, ResumeShape, ValidationErrors,
};
use crate::flows::template::{render, Prompt};

pub struct ResumeReview;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeReviewRequest {
    #[serde(flatten)]
    pub resume: ResumeFields,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeReviewInput {
    #[serde(flatten)]
    pub resume: ResumePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeReviewOutput {
    /// Skills, education and key projects.
    pub summary: String,
    /// Weak areas, missing sections, formatting tips.
    pub suggestions: String,
}

impl Flow for ResumeReview {
    const NAME: &'static str = "resumeReviewFlow";

    type Request = ResumeReviewRequest;
    type Input = ResumeReviewInput;
    type Output = ResumeReviewOutput;

    fn validate(request: Self::Request) -> Result<Self::Input, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let resume = request
            .resume
            .into_payload(ResumeShape::Document, &mut errors);
        match resume {
            Some(resume) if errors.is_empty() => Ok(ResumeReviewInput { resume }),
            _ => Err(errors),
        }
    }

    fn render(input: &Self::Input) -> Prompt {
        Prompt::new(
            RESUME_REVIEW_SYSTEM,
            render(RESUME_REVIEW_TEMPLATE, &[("resume", input.resume.slot())]),
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "A summary of the skills, education, and key projects in the resume."
                },
                "suggestions": {
                    "type": "string",
                    "description": "Suggestions for improvement, including weak areas, missing sections, and formatting tips."
                }
            },
            "required": ["summary", "suggestions"],
            "additionalProperties": false
        })
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_text("summary", &output.summary)?;
        require_text("suggestions", &output.suggestions)
    }
}
