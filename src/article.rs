//! Article records as they travel between the remote archive, the local
//! snapshot and the reader.

use std::{
    borrow::Cow,
    convert::Infallible,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{
    Date, OffsetDateTime,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};

/// Average reading speed used to estimate reading time.
pub const WORDS_PER_MINUTE: usize = 200;

/// Categories offered by the creation form.
pub const CATEGORIES: [&str; 5] = ["ARCHITECTURE", "PHILOSOPHY", "DESIGN", "TECH", "FINANCE"];

/// Cover image used when the author does not pick one.
pub const DEFAULT_COVER_IMAGE: &str = "https://images.unsplash.com/photo-1486406146926-c627a92ad1ab?q=80&w=2070&auto=format&fit=crop";

const PLAIN_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DISPLAY_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[day] [month repr:short] [year]");

/// Identifier of an article.
///
/// The remote archive may hand out numbers while local entries use strings.
/// Two ids are equal when their textual forms are equal, so `1` and `"1"`
/// name the same article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    /// Numeric id, usually assigned by the remote service.
    Number(i64),
    /// Textual id.
    Text(String),
}

impl ArticleId {
    /// Id derived from a point in time, in milliseconds since the Unix epoch.
    #[must_use]
    pub fn from_timestamp(at: OffsetDateTime) -> Self {
        Self::Text((at.unix_timestamp_nanos() / 1_000_000).to_string())
    }

    /// Textual form used for comparison and for the URL fragment.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(number) => Cow::Owned(number.to_string()),
            Self::Text(text) => Cow::Borrowed(text),
        }
    }

    /// The id that follows this one, when it is numeric in textual form.
    #[must_use]
    pub fn successor(&self) -> Option<Self> {
        match self {
            Self::Number(number) => number.checked_add(1).map(Self::Number),
            Self::Text(text) => text
                .parse::<i128>()
                .ok()
                .and_then(|value| value.checked_add(1))
                .map(|value| Self::Text(value.to_string())),
        }
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl PartialEq for ArticleId {
    fn eq(&self, other: &Self) -> bool {
        self.as_text() == other.as_text()
    }
}

impl Eq for ArticleId {}

impl Hash for ArticleId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_text().hash(state);
    }
}

impl From<i64> for ArticleId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ArticleId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl FromStr for ArticleId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Estimated reading time of `text` in minutes, never less than one.
#[must_use]
pub fn reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE))
        .unwrap_or(u32::MAX)
        .max(1)
}

/// A single archive entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Unique id within the archive.
    pub id: ArticleId,
    /// Headline.
    pub title: String,
    /// Classification, the first entry is the primary category.
    pub category: Vec<String>,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Short summary shown in the list.
    pub description: String,
    /// ISO-8601 date or timestamp.
    pub date: String,
    /// Cover image URL.
    pub cover_image: String,
    /// Body text.
    pub content: String,
    /// Minutes to read, assigned at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<u32>,
}

impl Article {
    /// Turn a draft into an article with the given id, deriving its reading time.
    #[must_use]
    pub fn from_draft(draft: Draft, id: ArticleId) -> Self {
        let reading_time = reading_time(&draft.content);
        Self {
            id,
            title: draft.title,
            category: draft.category,
            tags: draft.tags,
            description: draft.description,
            date: draft.date,
            cover_image: draft.cover_image,
            content: draft.content,
            reading_time: Some(reading_time),
        }
    }

    /// First category, used as the article's classification.
    #[must_use]
    pub fn primary_category(&self) -> Option<&str> {
        self.category.first().map(String::as_str)
    }

    /// Reading time in minutes.
    ///
    /// Remote payloads may omit it, in which case it is derived from the content.
    #[must_use]
    pub fn minutes_to_read(&self) -> u32 {
        self.reading_time
            .unwrap_or_else(|| reading_time(&self.content))
    }

    /// Calendar date the article was recorded on, if `date` can be parsed.
    #[must_use]
    pub fn recorded(&self) -> Option<Date> {
        OffsetDateTime::parse(&self.date, &Rfc3339)
            .map(OffsetDateTime::date)
            .or_else(|_| Date::parse(&self.date, PLAIN_DATE))
            .ok()
    }

    /// Recorded date formatted like `15 Feb 2026`, falling back to the raw value.
    #[must_use]
    pub fn recorded_label(&self) -> String {
        self.recorded()
            .and_then(|date| date.format(DISPLAY_DATE).ok())
            .unwrap_or_else(|| self.date.clone())
    }
}

/// Payload submitted for creation, before an id and reading time are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Headline.
    pub title: String,
    /// Classification.
    pub category: Vec<String>,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Short summary.
    pub description: String,
    /// ISO-8601 date.
    pub date: String,
    /// Cover image URL.
    pub cover_image: String,
    /// Body text.
    pub content: String,
}

/// Reasons a draft is not ready to be submitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidDraft {
    /// A required text field is blank.
    #[error("The {0} of an entry cannot be empty")]
    EmptyField(&'static str),
    /// No category was chosen.
    #[error("An entry needs at least one category")]
    NoCategory,
}

impl Draft {
    /// Create a draft with the form defaults: first category, today's date
    /// and the default cover image.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            category: vec![CATEGORIES[0].to_string()],
            tags: None,
            description: description.into(),
            date: today(),
            cover_image: DEFAULT_COVER_IMAGE.to_string(),
            content: content.into(),
        }
    }

    /// Replace the categories.
    #[must_use]
    pub fn with_category(mut self, category: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.category = category.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the tags. An empty list clears them.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        self.tags = (!tags.is_empty()).then_some(tags);
        self
    }

    /// Replace the date.
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Replace the cover image.
    #[must_use]
    pub fn with_cover_image(mut self, cover_image: impl Into<String>) -> Self {
        self.cover_image = cover_image.into();
        self
    }

    /// Check the fields the creation form requires.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), InvalidDraft> {
        let required = [
            ("title", &self.title),
            ("description", &self.description),
            ("content", &self.content),
            ("date", &self.date),
            ("cover image", &self.cover_image),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(InvalidDraft::EmptyField(name));
            }
        }
        if self.category.iter().all(|category| category.trim().is_empty()) {
            return Err(InvalidDraft::NoCategory);
        }
        Ok(())
    }
}

/// Today's date as `YYYY-MM-DD`.
#[must_use]
pub fn today() -> String {
    OffsetDateTime::now_utc()
        .date()
        .format(PLAIN_DATE)
        .unwrap_or_default()
}
