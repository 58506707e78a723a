use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{normalize_tags, normalize_text, optional_text, RecordId};
use crate::error::ValidationError;

pub type CardId = RecordId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
  pub id: CardId,
  /// Front side (Vietnamese prompt)
  pub question: String,
  /// Back side revealed on flip
  pub answer: String,
  #[serde(default)]
  pub example: Option<String>,
  /// Only meaningful when `example` is set
  #[serde(default)]
  pub example_translation: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub notes: Option<String>,
  /// None until the card has been shown once
  #[serde(default)]
  pub last_seen: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
}

impl Flashcard {
  pub fn has_tag(&self, tag: &str) -> bool {
    self.tags.iter().any(|t| t == tag)
  }

  /// True if any of `tags` is on this card (OR semantics)
  pub fn has_any_tag(&self, tags: &BTreeSet<String>) -> bool {
    self.tags.iter().any(|t| tags.contains(t))
  }

  /// Merge the `Some` fields of a normalized patch into this card.
  /// Blank optional text in the patch clears the field.
  pub fn apply(&mut self, patch: &CardPatch) {
    if let Some(question) = &patch.question {
      self.question = question.clone();
    }
    if let Some(answer) = &patch.answer {
      self.answer = answer.clone();
    }
    if let Some(example) = &patch.example {
      self.example = optional_text(Some(example.clone()));
    }
    if let Some(translation) = &patch.example_translation {
      self.example_translation = optional_text(Some(translation.clone()));
    }
    if let Some(tags) = &patch.tags {
      self.tags = tags.clone();
    }
    if let Some(notes) = &patch.notes {
      self.notes = optional_text(Some(notes.clone()));
    }
    if self.example.is_none() {
      self.example_translation = None;
    }
  }

  /// Check the invariants a stored card must hold
  pub fn validate(&self) -> Result<(), ValidationError> {
    check_required(&self.question, &self.answer, &self.tags)
  }
}

/// Fields supplied by the user when creating a card.
/// The backend assigns `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardDraft {
  #[serde(default)]
  pub question: String,
  #[serde(default)]
  pub answer: String,
  #[serde(default)]
  pub example: Option<String>,
  #[serde(default, alias = "exampleTranslation")]
  pub example_translation: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub notes: Option<String>,
}

impl CardDraft {
  pub fn new(question: &str, answer: &str, tags: &[&str]) -> Self {
    Self {
      question: question.to_string(),
      answer: answer.to_string(),
      tags: tags.iter().map(|t| t.to_string()).collect(),
      ..Default::default()
    }
  }

  /// Normalize every field and reject drafts missing question, answer or tags
  pub fn validated(self) -> Result<Self, ValidationError> {
    let example = optional_text(self.example);
    let example_translation = if example.is_some() {
      optional_text(self.example_translation)
    } else {
      None
    };
    let draft = Self {
      question: normalize_text(&self.question),
      answer: normalize_text(&self.answer),
      example,
      example_translation,
      tags: normalize_tags(&self.tags),
      notes: optional_text(self.notes),
    };
    check_required(&draft.question, &draft.answer, &draft.tags)?;
    Ok(draft)
  }
}

/// Partial update; `None` leaves a field as it is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPatch {
  #[serde(default)]
  pub question: Option<String>,
  #[serde(default)]
  pub answer: Option<String>,
  #[serde(default)]
  pub example: Option<String>,
  #[serde(default, alias = "exampleTranslation")]
  pub example_translation: Option<String>,
  #[serde(default)]
  pub tags: Option<Vec<String>>,
  #[serde(default)]
  pub notes: Option<String>,
}

impl CardPatch {
  pub fn normalized(self) -> Self {
    Self {
      question: self.question.map(|q| normalize_text(&q)),
      answer: self.answer.map(|a| normalize_text(&a)),
      example: self.example.map(|e| normalize_text(&e)),
      example_translation: self.example_translation.map(|t| normalize_text(&t)),
      tags: self.tags.map(|tags| normalize_tags(&tags)),
      notes: self.notes.map(|n| normalize_text(&n)),
    }
  }

  pub fn is_empty(&self) -> bool {
    self == &Self::default()
  }
}

fn check_required(question: &str, answer: &str, tags: &[String]) -> Result<(), ValidationError> {
  if question.is_empty() {
    return Err(ValidationError::MissingQuestion);
  }
  if answer.is_empty() {
    return Err(ValidationError::MissingAnswer);
  }
  if tags.is_empty() {
    return Err(ValidationError::MissingTags);
  }
  Ok(())
}
