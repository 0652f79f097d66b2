// src/compose.rs
//! Splitting generated text into the publishable body and the image prompt.

/// Marker line the persona prompt asks the model to finish with. Everything
/// after the first occurrence is treated as the image prompt.
pub const MARKER: &str = "IMAGE_PROMPT:";

/// Used when the model did not produce a usable prompt of its own.
pub const DEFAULT_IMAGE_PROMPT: &str =
    "сатирическая газетная карикатура, политика, гротеск, тушь и акварель";

/// Outcome of splitting the raw model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub body: String,
    pub image_prompt: Option<String>,
}

/// Pure and total: no marker means the whole trimmed text is the body and the
/// prompt is absent (callers substitute [`DEFAULT_IMAGE_PROMPT`]).
pub fn split_generated(raw: &str) -> GenerationResult {
    match raw.find(MARKER) {
        None => GenerationResult {
            body: raw.trim().to_string(),
            image_prompt: None,
        },
        Some(pos) => {
            let body = raw[..pos].trim().to_string();
            let prompt = strip_decorations(raw[pos + MARKER.len()..].trim());
            GenerationResult {
                body,
                image_prompt: if prompt.is_empty() { None } else { Some(prompt) },
            }
        }
    }
}

/// Models like to wrap the prompt in brackets, quotes or markdown emphasis.
fn strip_decorations(s: &str) -> String {
    s.trim_matches(|c: char| {
        matches!(
            c,
            '[' | ']' | '(' | ')' | '"' | '\'' | '«' | '»' | '*' | '`'
        ) || c.is_whitespace()
    })
    .to_string()
}
