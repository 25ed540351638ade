// Shared prompt fragments.
// Each module that calls the LLM keeps its own prompts.rs; this file only holds
// what every text-generation call appends.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// All customer-facing copy is written for a Taiwanese audience.
pub const TRADITIONAL_CHINESE_INSTRUCTION: &str = "\
    所有面向旅客的文字一律使用繁體中文（台灣用語），\
    專有名詞可保留原文。JSON 的欄位名稱維持英文，不得翻譯。";
