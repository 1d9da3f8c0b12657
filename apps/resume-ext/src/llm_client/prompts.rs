// Shared prompt fragments. Each caller defines its own prompts.rs alongside
// it; only cross-cutting fragments live here.

/// System prompt fragment that asks for a single JSON object.
/// The unwrapper still tolerates fenced or chatty replies.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with a single valid JSON object. \
    Do NOT include explanations or apologies.";

/// Instruction appended to extraction prompts to keep the model from guessing.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    CRITICAL: Only report values that appear in the document text. \
    Do NOT infer, interpolate, or invent details. \
    If a value is not present, use null (or an empty list/object).";
