//! Flow Invoker — one end-to-end model call per request.
//!
//! Flow: validate → render → model (with output schema, under a timeout) →
//!       parse + check output → best-effort interaction log → return.
//!
//! Nothing here is cached or shared between calls; the invoker only holds
//! `Arc`s to its two collaborators and is cheap to clone into every handler.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::flows::schema::ValidationErrors;
use crate::flows::template::Prompt;
use crate::interactions::InteractionLogger;
use crate::llm_client::{LlmError, ModelProvider, ModelRequest};

/// A single feature: its wire request, validated input, template and output contract.
pub trait Flow: Send + Sync + 'static {
    /// Flow name, also used as the model tool name and the interaction label.
    const NAME: &'static str;

    type Request: DeserializeOwned + Send + 'static;
    type Input: Serialize + Send + Sync;
    type Output: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn validate(request: Self::Request) -> Result<Self::Input, ValidationErrors>;

    fn render(input: &Self::Input) -> Prompt;

    /// JSON Schema the model's answer must follow.
    fn output_schema() -> Value;

    /// Checks the deserialized output beyond shape: non-blank text, ranges.
    fn check_output(output: &Self::Output) -> Result<(), String>;
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationErrors),

    #[error("model provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("output contract violated: {0}")]
    ContractViolation(String),
}

#[derive(Clone)]
pub struct FlowInvoker {
    model: Arc<dyn ModelProvider>,
    logger: Arc<dyn InteractionLogger>,
    timeout: Duration,
}

impl FlowInvoker {
    pub fn new(
        model: Arc<dyn ModelProvider>,
        logger: Arc<dyn InteractionLogger>,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            logger,
            timeout,
        }
    }

    /// Runs flow `F` for one request. Invalid input never reaches the model;
    /// a missing or malformed answer is a contract violation, never a partial result.
    pub async fn invoke<F: Flow>(&self, request: F::Request) -> Result<F::Output, FlowError> {
        let input = F::validate(request)?;

        let model_request = ModelRequest {
            tool_name: F::NAME,
            prompt: F::render(&input),
            output_schema: F::output_schema(),
        };

        let raw = tokio::time::timeout(self.timeout, self.model.generate(&model_request))
            .await
            .map_err(|_| FlowError::Timeout(self.timeout))??;

        let output = parse_output::<F>(raw)?;
        info!("Flow {} completed", F::NAME);

        self.log_interaction::<F>(&input, &output).await;

        Ok(output)
    }

    async fn log_interaction<F: Flow>(&self, input: &F::Input, output: &F::Output) {
        let values = serde_json::to_value(input)
            .and_then(|input| serde_json::to_value(output).map(|output| (input, output)));
        match values {
            Ok((input, output)) => self.logger.record(F::NAME, input, output).await,
            Err(e) => warn!("Skipping interaction log for {}: {e}", F::NAME),
        }
    }
}

fn parse_output<F: Flow>(raw: Value) -> Result<F::Output, FlowError> {
    if raw.is_null() {
        return Err(FlowError::ContractViolation(format!(
            "{} returned no output",
            F::NAME
        )));
    }
    let output: F::Output = serde_json::from_value(raw)
        .map_err(|e| FlowError::ContractViolation(format!("{}: {e}", F::NAME)))?;
    F::check_output(&output)
        .map_err(|e| FlowError::ContractViolation(format!("{}: {e}", F::NAME)))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::cover_letter::{CoverLetter, CoverLetterRequest};
    use crate::flows::jd_simplifier::{JobDescriptionSimplifier, SimplifyJobDescriptionRequest};
    use crate::flows::mock_interview::{MockHrQuestions, MockHrQuestionsRequest};
    use crate::flows::readiness::{InternshipReadiness, ReadinessRequest};
    use crate::flows::resume_review::{ResumeReview, ResumeReviewRequest};
    use crate::flows::schema::ResumeFields;
    use crate::flows::testing::{
        pdf_data_uri, resume_text, FailingStore, RecordingStore, StubModel,
    };
    use crate::interactions::{NoopInteractionLogger, StoreInteractionLogger};
    use serde_json::json;

    fn invoker_with(model: Arc<StubModel>, store: Arc<RecordingStore>) -> FlowInvoker {
        FlowInvoker::new(
            model,
            Arc::new(StoreInteractionLogger::new(store)),
            Duration::from_secs(5),
        )
    }

    fn output_json<T: Serialize>(output: &T) -> Value {
        serde_json::to_value(output).unwrap()
    }

    #[tokio::test]
    async fn test_job_description_scenario_returns_model_output_unmodified() {
        let answer = json!({ "summary": "S", "requiredSkills": "K", "preparationTips": "P" });
        let model = StubModel::returning(answer.clone());
        let store = RecordingStore::new();
        let invoker = invoker_with(model.clone(), store.clone());

        let request = SimplifyJobDescriptionRequest {
            job_description: "j".repeat(55),
        };
        let output = invoker
            .invoke::<JobDescriptionSimplifier>(request)
            .await
            .unwrap();

        assert_eq!(output_json(&output), answer);
        assert_eq!(model.calls(), 1);
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].1.flow_name, "simplifyJobDescriptionFlow");
    }

    #[tokio::test]
    async fn test_mock_interview_scenario_preserves_question_order() {
        let answer = json!({ "questions": ["Q1", "Q2", "Q3", "Q4", "Q5"] });
        let model = StubModel::returning(answer.clone());
        let invoker = invoker_with(model, RecordingStore::new());

        let output = invoker
            .invoke::<MockHrQuestions>(MockHrQuestionsRequest {
                internship_role: "SE Intern".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output.questions, vec!["Q1", "Q2", "Q3", "Q4", "Q5"]);
        assert_eq!(output_json(&output), answer);
    }

    #[tokio::test]
    async fn test_resume_review_returns_model_output_unmodified() {
        let answer = json!({ "summary": "Strong Rust projects", "suggestions": "Add a skills section" });
        let model = StubModel::returning(answer.clone());
        let invoker = invoker_with(model.clone(), RecordingStore::new());

        let request = ResumeReviewRequest {
            resume: ResumeFields::document(pdf_data_uri(64)),
        };
        let output = invoker.invoke::<ResumeReview>(request).await.unwrap();

        assert_eq!(output_json(&output), answer);
        let sent = model.last_request().unwrap();
        assert_eq!(sent.prompt.media().count(), 1);
    }

    #[tokio::test]
    async fn test_cover_letter_returns_model_output_unmodified() {
        let answer = json!({ "coverLetter": "Dear Hiring Manager," });
        let model = StubModel::returning(answer.clone());
        let invoker = invoker_with(model.clone(), RecordingStore::new());

        let request = CoverLetterRequest {
            role_title: "Data Intern".to_string(),
            company_name: "Acme".to_string(),
            resume: ResumeFields::text(resume_text()),
        };
        let output = invoker.invoke::<CoverLetter>(request).await.unwrap();

        assert_eq!(output_json(&output), answer);
        let sent = model.last_request().unwrap();
        assert!(sent.prompt.text().contains("Data Intern"));
        assert!(sent.prompt.text().contains("Acme"));
        assert_eq!(sent.tool_name, "generateCoverLetterFlow");
    }

    #[tokio::test]
    async fn test_readiness_returns_model_output_unmodified() {
        let answer = json!({ "score": 72, "tips": ["T1", "T2", "T3"] });
        let model = StubModel::returning(answer.clone());
        let invoker = invoker_with(model, RecordingStore::new());

        let request = ReadinessRequest {
            resume: ResumeFields::text(resume_text()),
        };
        let output = invoker.invoke::<InternshipReadiness>(request).await.unwrap();

        assert_eq!(output.score.as_u64(), Some(72));
        assert_eq!(output.tips, vec!["T1", "T2", "T3"]);
        assert_eq!(output_json(&output), answer);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_model() {
        let model = StubModel::returning(json!({}));
        let store = RecordingStore::new();
        let invoker = invoker_with(model.clone(), store.clone());

        let short_jd = invoker
            .invoke::<JobDescriptionSimplifier>(SimplifyJobDescriptionRequest {
                job_description: "too short".to_string(),
            })
            .await;
        let short_role = invoker
            .invoke::<MockHrQuestions>(MockHrQuestionsRequest {
                internship_role: "SE".to_string(),
            })
            .await;
        let no_resume = invoker
            .invoke::<ResumeReview>(ResumeReviewRequest::default())
            .await;
        let bad_cover = invoker
            .invoke::<CoverLetter>(CoverLetterRequest {
                role_title: "QA".to_string(),
                company_name: "A".to_string(),
                resume: ResumeFields::text("short"),
            })
            .await;
        let bad_readiness = invoker
            .invoke::<InternshipReadiness>(ReadinessRequest {
                resume: ResumeFields::document("not a data uri"),
            })
            .await;

        assert!(matches!(short_jd, Err(FlowError::InvalidInput(_))));
        assert!(matches!(short_role, Err(FlowError::InvalidInput(_))));
        assert!(matches!(no_resume, Err(FlowError::InvalidInput(_))));
        match bad_cover {
            Err(FlowError::InvalidInput(errors)) => assert_eq!(errors.fields().len(), 3),
            other => panic!("expected invalid input, got {other:?}"),
        }
        assert!(matches!(bad_readiness, Err(FlowError::InvalidInput(_))));
        assert_eq!(model.calls(), 0);
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_missing_output_field_is_contract_violation() {
        let model = StubModel::returning(json!({ "summary": "S", "requiredSkills": "K" }));
        let store = RecordingStore::new();
        let invoker = invoker_with(model, store.clone());

        let result = invoker
            .invoke::<JobDescriptionSimplifier>(SimplifyJobDescriptionRequest {
                job_description: "j".repeat(60),
            })
            .await;

        assert!(matches!(result, Err(FlowError::ContractViolation(_))));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_absent_output_is_contract_violation() {
        let model = StubModel::returning(Value::Null);
        let invoker = invoker_with(model, RecordingStore::new());

        let result = invoker
            .invoke::<MockHrQuestions>(MockHrQuestionsRequest {
                internship_role: "Backend Intern".to_string(),
            })
            .await;

        assert!(matches!(result, Err(FlowError::ContractViolation(_))));
    }

    #[tokio::test]
    async fn test_non_numeric_score_is_contract_violation() {
        let model = StubModel::returning(json!({ "score": "high", "tips": ["a", "b", "c"] }));
        let invoker = invoker_with(model, RecordingStore::new());

        let result = invoker
            .invoke::<InternshipReadiness>(ReadinessRequest {
                resume: ResumeFields::text(resume_text()),
            })
            .await;

        assert!(matches!(result, Err(FlowError::ContractViolation(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_contract_violation() {
        let model = StubModel::returning(json!({ "score": 140, "tips": ["a", "b", "c"] }));
        let invoker = invoker_with(model, RecordingStore::new());

        let result = invoker
            .invoke::<InternshipReadiness>(ReadinessRequest {
                resume: ResumeFields::text(resume_text()),
            })
            .await;

        assert!(matches!(result, Err(FlowError::ContractViolation(_))));
    }

    #[tokio::test]
    async fn test_provider_error_is_surfaced() {
        let model = StubModel::failing();
        let store = RecordingStore::new();
        let invoker = invoker_with(model.clone(), store.clone());

        let result = invoker
            .invoke::<MockHrQuestions>(MockHrQuestionsRequest {
                internship_role: "Design Intern".to_string(),
            })
            .await;

        assert!(matches!(result, Err(FlowError::Provider(_))));
        assert_eq!(model.calls(), 1);
        assert!(store.records().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_model_times_out() {
        let model = StubModel::hanging();
        let invoker = FlowInvoker::new(
            model,
            Arc::new(NoopInteractionLogger),
            Duration::from_secs(30),
        );

        let result = invoker
            .invoke::<MockHrQuestions>(MockHrQuestionsRequest {
                internship_role: "Design Intern".to_string(),
            })
            .await;

        assert!(matches!(result, Err(FlowError::Timeout(d)) if d == Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_unconfigured_store_still_returns_result() {
        let answer = json!({ "questions": ["Q1", "Q2", "Q3", "Q4", "Q5"] });
        let invoker = FlowInvoker::new(
            StubModel::returning(answer.clone()),
            Arc::new(NoopInteractionLogger),
            Duration::from_secs(5),
        );

        let output = invoker
            .invoke::<MockHrQuestions>(MockHrQuestionsRequest {
                internship_role: "SE Intern".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output_json(&output), answer);
    }

    #[tokio::test]
    async fn test_store_failure_does_not_change_result() {
        let answer = json!({ "summary": "S", "requiredSkills": "K", "preparationTips": "P" });
        let store = FailingStore::new();
        let invoker = FlowInvoker::new(
            StubModel::returning(answer.clone()),
            Arc::new(StoreInteractionLogger::new(store.clone())),
            Duration::from_secs(5),
        );

        let output = invoker
            .invoke::<JobDescriptionSimplifier>(SimplifyJobDescriptionRequest {
                job_description: "j".repeat(55),
            })
            .await
            .unwrap();

        assert_eq!(output_json(&output), answer);
        assert_eq!(store.attempts(), 1);
    }

    #[tokio::test]
    async fn test_logged_document_is_truncated_but_result_is_not() {
        let answer = json!({ "coverLetter": "Dear Hiring Manager," });
        let store = RecordingStore::new();
        let invoker = invoker_with(StubModel::returning(answer.clone()), store.clone());
        let document = pdf_data_uri(4096);

        let output = invoker
            .invoke::<CoverLetter>(CoverLetterRequest {
                role_title: "Data Intern".to_string(),
                company_name: "Acme".to_string(),
                resume: ResumeFields::document(document.clone()),
            })
            .await
            .unwrap();

        assert_eq!(output_json(&output), answer);

        let records = store.records();
        let (collection, record) = &records[0];
        assert_eq!(collection, "interactions");
        let logged = record.input["resumeDocument"].as_str().unwrap();
        assert_eq!(logged, format!("{}...", &document[..100]));
        assert_eq!(record.input["roleTitle"], "Data Intern");
        assert_eq!(record.output, answer);
    }
}
