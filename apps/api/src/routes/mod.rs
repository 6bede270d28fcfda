pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::flows::cover_letter::CoverLetter;
use crate::flows::handlers::{handle_flow, handle_list_flows};
use crate::flows::invoker::Flow;
use crate::flows::jd_simplifier::JobDescriptionSimplifier;
use crate::flows::mock_interview::MockHrQuestions;
use crate::flows::readiness::InternshipReadiness;
use crate::flows::resume_review::ResumeReview;
use crate::state::AppState;

/// Uploaded resumes travel inline as data URIs.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

const RESUME_REVIEW_PATH: &str = "/api/v1/flows/resume-review";
const COVER_LETTER_PATH: &str = "/api/v1/flows/cover-letter";
const JD_SIMPLIFIER_PATH: &str = "/api/v1/flows/job-description-simplifier";
const MOCK_HR_PATH: &str = "/api/v1/flows/mock-hr-questions";
const READINESS_PATH: &str = "/api/v1/flows/readiness-score";

/// (flow name, path) for every flow endpoint.
pub const FLOW_ENDPOINTS: [(&str, &str); 5] = [
    (ResumeReview::NAME, RESUME_REVIEW_PATH),
    (CoverLetter::NAME, COVER_LETTER_PATH),
    (JobDescriptionSimplifier::NAME, JD_SIMPLIFIER_PATH),
    (MockHrQuestions::NAME, MOCK_HR_PATH),
    (InternshipReadiness::NAME, READINESS_PATH),
];

async fn not_found() -> AppError {
    AppError::NotFound("No such endpoint".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/flows", get(handle_list_flows))
        .route(RESUME_REVIEW_PATH, post(handle_flow::<ResumeReview>))
        .route(COVER_LETTER_PATH, post(handle_flow::<CoverLetter>))
        .route(
            JD_SIMPLIFIER_PATH,
            post(handle_flow::<JobDescriptionSimplifier>),
        )
        .route(MOCK_HR_PATH, post(handle_flow::<MockHrQuestions>))
        .route(READINESS_PATH, post(handle_flow::<InternshipReadiness>))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
