// InternSpark flows: one schema-validated model call per feature.
// All model calls go through the FlowInvoker — handlers never touch llm_client.

pub mod cover_letter;
pub mod handlers;
pub mod invoker;
pub mod jd_simplifier;
pub mod mock_interview;
pub mod prompts;
pub mod readiness;
pub mod resume_review;
pub mod schema;
pub mod template;

#[cfg(test)]
pub mod testing;
