// Cross-cutting prompt fragments. Prompts specific to one service live in a
// prompts.rs next to that service (the scoring prompt sits in matching/).

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction keeping scorer verdicts grounded in the resume text supplied.
pub const EVIDENCE_INSTRUCTION: &str = "\
    CRITICAL: Base every judgement only on the resume data provided. \
    Do NOT infer skills, titles, or durations that are not present. \
    A requirement with no supporting evidence in the resume belongs in \
    missing_requirements, never in matching_skills.";
