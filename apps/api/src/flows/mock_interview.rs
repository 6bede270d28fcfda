//! Mock HR interview questions for an internship role.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::flows::invoker::Flow;
use crate::flows::prompts::{MOCK_HR_SYSTEM, MOCK_HR_TEMPLATE};
use crate::flows::schema::{null_as_empty, require_items, require_min_chars, ValidationErrors};
use crate::flows::template::{render, Prompt, Slot};

/// Number of questions the prompt asks for. Not enforced on the answer.
pub const REQUESTED_QUESTIONS: usize = 5;

pub struct MockHrQuestions;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockHrQuestionsRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub internship_role: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockHrQuestionsInput {
    pub internship_role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockHrQuestionsOutput {
    pub questions: Vec<String>,
}

impl Flow for MockHrQuestions {
    const NAME: &'static str = "generateMockHrQuestionsFlow";

    type Request = MockHrQuestionsRequest;
    type Input = MockHrQuestionsInput;
    type Output = MockHrQuestionsOutput;

    fn validate(request: Self::Request) -> Result<Self::Input, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let internship_role = require_min_chars(
            &mut errors,
            "internshipRole",
            &request.internship_role,
            3,
            "Internship role must be at least 3 characters.",
        );
        errors.finish(|| MockHrQuestionsInput { internship_role })
    }

    fn render(input: &Self::Input) -> Prompt {
        Prompt::new(
            MOCK_HR_SYSTEM,
            render(
                MOCK_HR_TEMPLATE,
                &[("internshipRole", Slot::Text(&input.internship_role))],
            ),
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "questions": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "An array of generated HR interview questions."
                }
            },
            "required": ["questions"],
            "additionalProperties": false
        })
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        require_items("questions", &output.questions)?;
        if output.questions.len() != REQUESTED_QUESTIONS {
            warn!(
                "Expected {} interview questions, model returned {}",
                REQUESTED_QUESTIONS,
                output.questions.len()
            );
        }
        Ok(())
    }
}
