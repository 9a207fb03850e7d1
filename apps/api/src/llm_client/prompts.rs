// Shared prompt fragments.
// Each service that needs oracle calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Appended to every prompt whose response is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
IMPORTANT: Return ONLY the JSON. No additional text, notes, or markdown formatting.";

/// Appended to prompts whose response is shown to the user verbatim.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
Format the response as a single paragraph without any additional text or explanations.";
