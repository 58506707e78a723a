pub mod card;
pub mod tags;
pub mod tip;

use unicode_normalization::UnicodeNormalization;

pub use card::{CardDraft, CardId, CardPatch, Flashcard};
pub use tags::{normalize_tag, normalize_tags, tag_emoji};
pub use tip::{Tip, TipDraft, TipId, TipPatch};

/// Backend-assigned identity shared by cards and tips
pub type RecordId = i64;

/// Trim and NFC-normalize user text. Vietnamese input methods emit both
/// precomposed and combining diacritics for the same word.
pub(crate) fn normalize_text(s: &str) -> String {
  s.trim().nfc().collect()
}

/// Normalize an optional field; blank text becomes `None`
pub(crate) fn optional_text(s: Option<String>) -> Option<String> {
  s.map(|s| normalize_text(&s)).filter(|s| !s.is_empty())
}
