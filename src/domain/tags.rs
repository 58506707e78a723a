//! Tag normalization and the category emoji table.

use super::normalize_text;

/// Emoji shown next to known category tags
static TAG_EMOJIS: &[(&str, &str)] = &[
    ("basics", "📚"),
    ("greetings", "👋"),
    ("everyday", "🌞"),
    ("family", "🐶"),
    ("food", "🍜"),
    ("work", "💼"),
    ("questions", "❓"),
    ("shopping", "🛒"),
    ("restaurant", "🍽️"),
    ("cooking", "👨‍🍳"),
    ("hobbies", "🎨"),
    ("holidays", "🎉"),
    ("health", "🏥"),
    ("travel", "✈️"),
    ("directions", "🗺️"),
    ("time", "⏰"),
    ("weather", "🌤️"),
    ("numbers", "🔢"),
    ("colors", "🎨"),
    ("animals", "🐾"),
    ("body", "🧍"),
    ("clothing", "👔"),
    ("emotions", "😊"),
    ("home", "🏠"),
    ("transportation", "🚗"),
    ("education", "🎓"),
    ("sports", "⚽"),
    ("nature", "🌳"),
    ("technology", "💻"),
    ("places", "🏠"),
    ("pronouns", "👤"),
];

/// Fallback for tags without a dedicated emoji
pub const DEFAULT_TAG_EMOJI: &str = "🏷️";

/// Trimmed, NFC-normalized, lowercased tag
pub fn normalize_tag(tag: &str) -> String {
    normalize_text(tag).to_lowercase()
}

/// Normalize a tag list, dropping blanks and duplicates (first occurrence wins)
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = normalize_tag(tag);
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Look up the emoji for a tag (case-insensitive)
pub fn tag_emoji(tag: &str) -> &'static str {
    let tag = normalize_tag(tag);
    TAG_EMOJIS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, emoji)| *emoji)
        .unwrap_or(DEFAULT_TAG_EMOJI)
}
