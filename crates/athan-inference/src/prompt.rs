//! Structured-extraction prompt construction.
//!
//! The prompt is built dynamically from the live category registry so that
//! renaming or adding categories in the config file changes both the model
//! instructions and the validation schema in lockstep.

use athan_core::CategoryRegistry;

/// Build the extraction prompt for a Burmese voice note.
///
/// Instructs the model to transcribe into Burmese content, produce a short
/// Burmese summary, choose exactly one category from the configured set
/// (exact, case-sensitive names), extract 3-5 English tags, and title the
/// note in whatever language the speaker used.
pub fn build_extraction_prompt(registry: &CategoryRegistry) -> String {
    let category_lines: String = registry
        .all()
        .iter()
        .map(|c| format!("- {}: {}\n", c.name, c.description))
        .collect();

    let names = registry.names();
    let quoted: Vec<String> = names.iter().map(|n| format!("\"{}\"", n)).collect();
    let exact_list = quoted.join(", ");
    let enum_hint = names.join("|");

    format!(
        r#"You are analyzing a Burmese voice note. Follow these steps PRECISELY:

STEP 1: TRANSCRIBE
Transcribe the audio to Burmese text. This becomes the CONTENT field.
Preserve the original meaning and nuance. Do NOT translate to English.

STEP 2: SUMMARIZE
Create a brief, intelligent summary (1-2 sentences) in Burmese.
Focus on KEY POINTS and main ideas. This is the SUMMARY field.
The summary should be different from and shorter than the full transcription.

STEP 3: CATEGORIZE
Choose EXACTLY ONE category from this list. You MUST use the EXACT name (case-sensitive):
{category_lines}
CRITICAL: Pick the PRIMARY purpose of the note based on the main intent.
You MUST return one of these EXACT strings: {exact_list}
Do NOT use variations, lowercase, or synonyms. Use the exact category name shown above.

STEP 4: EXTRACT TAGS
Extract 3-5 relevant tags in English that describe key topics, themes, or keywords.
Tags should help organize and find this note later.

STEP 5: CREATE TITLE
Generate a brief, descriptive title (maximum 10 words).
Keep the title in the speaker's original language(s) - Burmese, English, or mixed.

Return your response as valid JSON in this EXACT format:
{{
  "title": "string in the speaker's original language (max 10 words)",
  "content": "full transcription in Burmese",
  "summary": "1-2 sentence summary in Burmese",
  "category": "{enum_hint}",
  "tags": ["tag1", "tag2", "tag3", "tag4", "tag5"]
}}

EXTREMELY IMPORTANT:
- The "category" field MUST be exactly one of: {exact_list}
- Use the EXACT spelling and capitalization shown above
- If you're unsure which category fits best, default to "Personal"
- Do NOT invent new categories or use variations

Language: content and summary in Burmese (my-MM), tags in English.
"#
    )
}
