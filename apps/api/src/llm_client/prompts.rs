// Shared prompt constants and prompt-building utilities.
// Each flow defines its own template in flows/prompts.rs.
// This file contains cross-cutting prompt fragments.

/// Description attached to the forced output tool of every structured call.
pub const STRUCTURED_TOOL_DESCRIPTION: &str = "Return the final answer. \
    Every field in the input schema is required. \
    Do not leave any field empty.";

