//! Cover letter generation for a given role and company.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::flows::invoker::Flow;
use crate::flows::prompts::{COVER_LETTER_SYSTEM, COVER_LETTER_TEMPLATE};
use crate::flows::schema::{
    null_as_empty, require_min_chars, require_text, ResumeFields, ResumePayload, ResumeShape,
    ValidationErrors,
};
use crate::flows::template::{render, Prompt, Slot};

pub struct CoverLetter;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub role_title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company_name: String,
    #[serde(flatten)]
    pub resume: ResumeFields,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterInput {
    pub role_title: String,
    pub company_name: String,
    #[serde(flatten)]
    pub resume: ResumePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterOutput {
    pub cover_letter: String,
}

impl Flow for CoverLetter {
    const NAME: &'static str = "generateCoverLetterFlow";

    type Request = CoverLetterRequest;
    type Input = CoverLetterInput;
    type Output = CoverLetterOutput;

    fn validate(request: Self::Request) -> Result<Self::Input, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let role_title = require_min_chars(
            &mut errors,
            "roleTitle",
            &request.role_title,
            3,
            "Role title is required.",
        );
        let company_name = require_min_chars(
            &mut errors,
            "companyName",
            &request.company_name,
            2,
            "Company name is required.",
        );
        let resume = request.resume.into_payload(ResumeShape::Text, &mut errors);

        match resume {
            Some(resume) if errors.is_empty() => Ok(CoverLetterInput {
                role_title,
                company_name,
                resume,
            }),
            _ => Err(errors),
        }
    }

    fn render(input: &Self::Input) -> Prompt {
        Prompt::new(
            COVER_LETTER_SYSTEM,
            render(
                COVER_LETTER_TEMPLATE,
                &[
                    ("roleTitle", Slot::Text(&input.role_title)),
                    ("companyName", Slot::Text(&input.company_name)),
                    ("resume", input.resume.slot()),
                ],
            ),
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "coverLetter": {
                    "type": "string",
                    "description": "The generated cover letter."
                }
            },
            "required": ["coverLetter"],
            "additionalProperties": false
        })
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_text("coverLetter", &output.cover_letter)
    }
}
