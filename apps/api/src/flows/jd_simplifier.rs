//! Job description simplifier — plain-language summary, skills and prep tips.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::flows::invoker::Flow;
use crate::flows::prompts::{JD_SIMPLIFIER_SYSTEM, JD_SIMPLIFIER_TEMPLATE};
use crate::flows::schema::{null_as_empty, require_min_chars, require_text, ValidationErrors};
use crate::flows::template::{render, Prompt, Slot};

const MIN_JOB_DESCRIPTION_CHARS: usize = 50;

pub struct JobDescriptionSimplifier;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyJobDescriptionRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyJobDescriptionInput {
    pub job_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyJobDescriptionOutput {
    pub summary: String,
    pub required_skills: String,
    pub preparation_tips: String,
}

impl Flow for JobDescriptionSimplifier {
    const NAME: &'static str = "simplifyJobDescriptionFlow";

    type Request = SimplifyJobDescriptionRequest;
    type Input = SimplifyJobDescriptionInput;
    type Output = SimplifyJobDescriptionOutput;

    fn validate(request: Self::Request) -> Result<Self::Input, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let job_description = require_min_chars(
            &mut errors,
            "jobDescription",
            &request.job_description,
            MIN_JOB_DESCRIPTION_CHARS,
            "Job description must be at least 50 characters.",
        );
        errors.finish(|| SimplifyJobDescriptionInput { job_description })
    }

    fn render(input: &Self::Input) -> Prompt {
        Prompt::new(
            JD_SIMPLIFIER_SYSTEM,
            render(
                JD_SIMPLIFIER_TEMPLATE,
                &[("jobDescription", Slot::Text(&input.job_description))],
            ),
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "A summary of the job description."
                },
                "requiredSkills": {
                    "type": "string",
                    "description": "The key skills required for the job."
                },
                "preparationTips": {
                    "type": "string",
                    "description": "Tips on how a student can prepare for the job."
                }
            },
            "required": ["summary", "requiredSkills", "preparationTips"],
            "additionalProperties": false
        })
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_text("summary", &output.summary)?;
        require_text("requiredSkills", &output.required_skills)?;
        require_text("preparationTips", &output.preparation_tips)
    }
}
