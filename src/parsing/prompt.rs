use crate::services::CompletionRequest;

/// Near-deterministic sampling: the reply must be a small structured array.
pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 800;

pub const SYSTEM_PROMPT: &str = "You are a nutrition assistant. Your ONLY job is to identify EVERY food item mentioned and return nutrition data for each one.

RULE: If the user mentions multiple foods, you MUST create a separate entry for each one.

Example input: \"half a cheeseburger and 15 french fries\"
You MUST return:
[
  {\"name\": \"half a cheeseburger\", \"estimated_calories\": 250, \"estimated_protein\": 15, \"assumed_weight_g\": 100, \"notes\": \"half of standard cheeseburger\"},
  {\"name\": \"15 french fries\", \"estimated_calories\": 150, \"estimated_protein\": 2, \"assumed_weight_g\": 50, \"notes\": \"15 medium french fries\"}
]

DO NOT combine foods into one entry. DO NOT skip any foods mentioned.

Portion sizes may be vague (\"a handful\", \"a bowl\", \"some\"). Use your judgment to resolve every portion to a best-effort weight in grams, and explain the assumption in notes.

The response must be valid JSON. Return your response as a JSON array. Each object in the array must contain exactly these fields: name, estimated_calories, estimated_protein, assumed_weight_g, notes.

Respond ONLY with a valid JSON array, and nothing else. Do NOT use markdown or code blocks. Do NOT wrap your response in triple backticks or any other formatting. If no foods are identified, return an empty array: []";

pub fn build_request(utterance: &str) -> CompletionRequest {
    CompletionRequest {
        system: SYSTEM_PROMPT.to_string(),
        user: utterance.to_string(),
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}
