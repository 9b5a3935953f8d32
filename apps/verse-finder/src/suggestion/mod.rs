// Verse suggestion: prompt building, the text → image request pipeline, and
// mapping of AI failures to user-facing errors.
// All AI calls go through llm_client; no direct HTTP here.

pub mod classify;
pub mod prompts;
pub mod requester;
