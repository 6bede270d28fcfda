//! Internship readiness score (0–100) with personalized tips.

use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use tracing::warn;

use crate::flows::invoker::Flow;
use crate::flows::prompts::{READINESS_SYSTEM, READINESS_TEMPLATE};
use crate::flows::schema::{
    require_items, ResumeFields, ResumePayload, ResumeShape, ValidationErrors,
};
use crate::flows::template::{render, Prompt};

/// Number of tips the prompt asks for. Not enforced on the answer.
pub const REQUESTED_TIPS: usize = 3;

pub struct InternshipReadiness;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadinessRequest {
    #[serde(flatten)]
    pub resume: ResumeFields,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessInput {
    #[serde(flatten)]
    pub resume: ResumePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessOutput {
    /// Readiness out of 100. Kept as the model wrote it, integer or float.
    pub score: Number,
    pub tips: Vec<String>,
}

impl Flow for InternshipReadiness {
    const NAME: &'static str = "internshipReadinessFlow";

    type Request = ReadinessRequest;
    type Input = ReadinessInput;
    type Output = ReadinessOutput;

    fn validate(request: Self::Request) -> Result<Self::Input, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let resume = request.resume.into_payload(ResumeShape::Text, &mut errors);
        match resume {
            Some(resume) if errors.is_empty() => Ok(ReadinessInput { resume }),
            _ => Err(errors),
        }
    }

    fn render(input: &Self::Input) -> Prompt {
        Prompt::new(
            READINESS_SYSTEM,
            render(READINESS_TEMPLATE, &[("resume", input.resume.slot())]),
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "score": {
                    "type": "number",
                    "minimum": 0,
                    "maximum": 100,
                    "description": "An internship readiness score out of 100."
                },
                "tips": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "Personalized tips to improve internship readiness."
                }
            },
            "required": ["score", "tips"],
            "additionalProperties": false
        })
    }

    fn check_output(output: &Self::Output) -> Result<(), String> {
        let in_range = output
            .score
            .as_f64()
            .is_some_and(|score| (0.0..=100.0).contains(&score));
        if !in_range {
            return Err(format!("score {} is outside 0..=100", output.score));
        }
        require_items("tips", &output.tips)?;
        if output.tips.len() != REQUESTED_TIPS {
            warn!(
                "Expected {} readiness tips, model returned {}",
                REQUESTED_TIPS,
                output.tips.len()
            );
        }
        Ok(())
    }
}
