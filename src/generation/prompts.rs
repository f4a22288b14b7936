//! Prompt templates
//!
//! Each action the user can take maps to a [`PromptKind`]; the kind decides
//! the prompt text and the sampling temperature.

use serde::{Deserialize, Serialize};

/// Temperature boost applied when regenerating, for more variation
const REGENERATE_TEMPERATURE_BOOST: f64 = 0.2;

/// Tones offered in the result dialog
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Professional,
    Casual,
    Creative,
    Technical,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Professional, Tone::Casual, Tone::Creative, Tone::Technical];

    pub fn label(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Creative => "Creative",
            Tone::Technical => "Technical",
        }
    }

    /// Parse a tone label, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label().eq_ignore_ascii_case(s.trim()))
    }
}

/// What the user asked for
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Enhance,
    Reprompt,
    Tone(Tone),
    Meaning,
    Regenerate,
}

impl PromptKind {
    /// Whether the result is a definition rather than a rewrite
    pub fn is_meaning(&self) -> bool {
        matches!(self, PromptKind::Meaning)
    }

    /// Sampling temperature for this kind given the configured one
    pub fn temperature(&self, configured: f64) -> f64 {
        match self {
            PromptKind::Regenerate => (configured + REGENERATE_TEMPERATURE_BOOST).min(1.0),
            _ => configured,
        }
    }

    /// Build the full prompt for `text`, with optional extra context
    pub fn build(&self, text: &str, context: Option<&str>) -> String {
        let context = context.map(str::trim).filter(|c| !c.is_empty());
        match self {
            PromptKind::Enhance => enhance_prompt(text, context),
            PromptKind::Reprompt => {
                let mut prompt = String::from(
                    "As an expert prompt engineer, create a fresh, concise version (max 3-4 sentences) of this prompt:",
                );
                push_context(&mut prompt, context, "Additional context to consider");
                push_quoted(&mut prompt, text, "Return ONLY the enhanced prompt with NO explanations.");
                prompt
            }
            PromptKind::Tone(Tone::Technical) => {
                let mut prompt = String::from(
                    "As an expert prompt engineer, create a CONCISE, TECHNICAL prompt (max 3-4 sentences). \
                     Focus on technical accuracy, precision, and developer-friendly language:",
                );
                push_context(&mut prompt, context, "Additional context to consider");
                push_quoted(&mut prompt, text, "Return ONLY the enhanced technical prompt with NO explanations.");
                prompt
            }
            PromptKind::Tone(tone) => {
                let mut prompt = format!(
                    "As an expert prompt engineer, create a CONCISE, OPTIMIZED prompt (max 3-4 sentences) with a {} tone:",
                    tone.label().to_lowercase()
                );
                push_context(&mut prompt, context, "Additional context to consider");
                push_quoted(&mut prompt, text, "Return ONLY the enhanced prompt with NO explanations.");
                prompt
            }
            PromptKind::Meaning => meaning_prompt(text, context),
            PromptKind::Regenerate => {
                let mut prompt =
                    String::from("Rewrite and improve this text with a fresh perspective, preserving the original meaning:");
                push_context(&mut prompt, context, "Consider this context");
                push_quoted(&mut prompt, text, "Return only the improved text.");
                prompt
            }
        }
    }
}

fn push_context(prompt: &mut String, context: Option<&str>, label: &str) {
    if let Some(context) = context {
        prompt.push_str(&format!("\n{}: {}", label, context));
    }
}

fn push_quoted(prompt: &mut String, text: &str, closing: &str) {
    prompt.push_str(&format!("\n\n\"{}\"\n\n{}", text, closing));
}

fn enhance_prompt(text: &str, context: Option<&str>) -> String {
    let mut prompt = String::from(
        "As an expert prompt engineer, enhance this prompt to be more effective for AI models. \
         Create a CONCISE, OPTIMIZED prompt (max 3-4 sentences) with:\n\
         - Clear instructions\n\
         - Specific details only when needed\n\
         - Professional structure\n\
         - No unnecessary words\n\n\
         Only add detailed instructions when a specific tone is mentioned. Return only the enhanced prompt:",
    );
    push_context(&mut prompt, context, "Additional context to consider");
    push_quoted(&mut prompt, text, "Return ONLY the enhanced prompt with NO explanations.");
    prompt
}

const MEANING_EXAMPLES: &str = "Then, in a SEPARATE SECTION, provide 2-3 practical EXAMPLES showing how this \
word/phrase is used in different contexts. Format examples as bullet points and BOLD the selected \
word/phrase where it appears in examples.";

const MEANING_EXAMPLE_LINES: &str = "**Examples:**\n\
• [Example 1 with **selected word** highlighted]\n\
• [Example 2 with **selected word** highlighted]\n\
• [Example 3 with **selected word** highlighted]";

fn meaning_prompt(text: &str, context: Option<&str>) -> String {
    match context {
        None => format!(
            "Provide a VERY CONCISE meaning of the following text (maximum 2-3 lines or 40 words):\n\n\
             \"{}\"\n\n{}\n\n\
             Format your response EXACTLY as follows with clear separation:\n\n\
             **Meaning:**\n[short, concise definition - maximum 2-3 lines]\n\n{}",
            text, MEANING_EXAMPLES, MEANING_EXAMPLE_LINES
        ),
        Some(context) => format!(
            "Provide a VERY CONCISE meaning of the following text (maximum 2-3 lines or 40 words).\n\
             IMPORTANT: Use this additional context when explaining: {}\n\n\
             \"{}\"\n\n{}\n\n\
             Format your response EXACTLY as follows with clear separation:\n\
             **Meaning:**\n[short, concise definition that incorporates the provided context - maximum 2-3 lines]\n\n{}",
            context, text, MEANING_EXAMPLES, MEANING_EXAMPLE_LINES
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_quotes_text() {
        let prompt = PromptKind::Enhance.build("fix my essey", None);
        assert!(prompt.contains("\"fix my essey\""));
        assert!(prompt.ends_with("Return ONLY the enhanced prompt with NO explanations."));
        assert!(!prompt.contains("Additional context"));
    }

    #[test]
    fn test_context_is_included_when_present() {
        let prompt = PromptKind::Enhance.build("x y", Some("for a class handout"));
        assert!(prompt.contains("Additional context to consider: for a class handout"));

        let blank = PromptKind::Enhance.build("x y", Some("   "));
        assert!(!blank.contains("Additional context"));
    }

    #[test]
    fn test_tone_prompts() {
        let casual = PromptKind::Tone(Tone::Casual).build("hello there", None);
        assert!(casual.contains("with a casual tone"));

        let technical = PromptKind::Tone(Tone::Technical).build("hello there", None);
        assert!(technical.contains("TECHNICAL"));
        assert!(technical.contains("enhanced technical prompt"));
    }

    #[test]
    fn test_meaning_prompt_variants() {
        let plain = PromptKind::Meaning.build("serendipity", None);
        assert!(plain.contains("**Meaning:**"));
        assert!(plain.contains("\"serendipity\""));

        let with_ctx = PromptKind::Meaning.build("serendipity", Some("in biology"));
        assert!(with_ctx.contains("IMPORTANT: Use this additional context when explaining: in biology"));
    }

    #[test]
    fn test_regenerate_temperature_is_clamped() {
        assert!((PromptKind::Regenerate.temperature(0.5) - 0.7).abs() < 1e-9);
        assert_eq!(PromptKind::Regenerate.temperature(0.9), 1.0);
        assert_eq!(PromptKind::Enhance.temperature(0.9), 0.9);
    }

    #[test]
    fn test_tone_parse() {
        assert_eq!(Tone::parse("creative"), Some(Tone::Creative));
        assert_eq!(Tone::parse(" Technical "), Some(Tone::Technical));
        assert_eq!(Tone::parse("angry"), None);
    }
}
