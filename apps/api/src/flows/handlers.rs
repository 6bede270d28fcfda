//! Axum route handlers for the Flow API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::flows::invoker::Flow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FlowDescriptor {
    pub name: &'static str,
    pub path: &'static str,
}

/// POST /api/v1/flows/{feature}
///
/// Validates the body, runs the flow and returns its schema-valid output.
/// Any model or contract failure surfaces as one generic error.
pub async fn handle_flow<F: Flow>(
    State(state): State<AppState>,
    payload: Result<Json<F::Request>, JsonRejection>,
) -> Result<Json<F::Output>, AppError> {
    let Json(request) = payload?;
    let output = state.invoker.invoke::<F>(request).await?;
    Ok(Json(output))
}

/// GET /api/v1/flows
pub async fn handle_list_flows() -> Json<Vec<FlowDescriptor>> {
    Json(
        crate::routes::FLOW_ENDPOINTS
            .iter()
            .map(|&(name, path)| FlowDescriptor { name, path })
            .collect(),
    )
}
