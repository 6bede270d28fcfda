use crate::flows::invoker::FlowInvoker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model provider and interaction logger are chosen once at start-up
    /// and live inside the invoker.
    pub invoker: FlowInvoker,
}
