use serde::{Deserialize, Serialize};

use super::{normalize_tags, normalize_text, optional_text, RecordId};
use crate::error::ValidationError;

pub type TipId = RecordId;

/// A study tip. `content` is markdown and is never rendered here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub id: TipId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Tip {
    pub fn apply(&mut self, patch: &TipPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(category) = &patch.category {
            self.category = optional_text(Some(category.clone()));
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required(&self.title, &self.content)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TipDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TipDraft {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    pub fn validated(self) -> Result<Self, ValidationError> {
        let draft = Self {
            title: normalize_text(&self.title),
            // Leading indentation is significant in markdown, only trim the ends of the block
            content: self.content.trim_end().trim_start_matches('\n').to_string(),
            category: optional_text(self.category),
            tags: normalize_tags(&self.tags),
        };
        check_required(&draft.title, &draft.content)?;
        Ok(draft)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TipPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TipPatch {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|t| normalize_text(&t)),
            content: self
                .content
                .map(|c| c.trim_end().trim_start_matches('\n').to_string()),
            category: self.category.map(|c| normalize_text(&c)),
            tags: self.tags.map(|tags| normalize_tags(&tags)),
        }
    }
}

fn check_required(title: &str, content: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if content.trim().is_empty() {
        return Err(ValidationError::MissingContent);
    }
    Ok(())
}
