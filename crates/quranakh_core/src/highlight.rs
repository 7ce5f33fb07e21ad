//! crates/quranakh_core/src/highlight.rs
//!
//! Mistake highlights over ayah/word ranges, their fixed category colors, and
//! the per-page completion view derived from them.
//!
//! A highlight starts in one of the four mistake categories and moves to the
//! terminal gold "resolved" color once the student has corrected it. The color
//! it came from is kept so the transition can be reverted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest surah number in the mushaf.
pub const SURAH_COUNT: u32 = 114;

/// Ayah count of the longest surah (al-Baqarah).
pub const MAX_AYAH_NUMBER: u32 = 286;

/// Upper bound on page numbers across the printed mushaf layouts in use.
pub const MAX_PAGE_NUMBER: u32 = 1000;

/// Display color of a resolved highlight.
pub const RESOLVED_DISPLAY_COLOR: &str = "#FFD700";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HighlightError {
    #[error("Unknown mistake category: {0}")]
    InvalidCategory(String),
    #[error("Highlight {0} is already resolved")]
    AlreadyResolved(Uuid),
    #[error("Highlight {0} is not resolved")]
    NotResolved(Uuid),
    #[error("Highlight {0} has no previous color to restore")]
    MissingPreviousColor(Uuid),
    #[error("Invalid highlight range: {0}")]
    InvalidRange(String),
}

//=========================================================================================
// Categories and Colors
//=========================================================================================

/// The kinds of recitation mistake a teacher can mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeCategory {
    Recap,
    Tajweed,
    Haraka,
    Letter,
}

impl MistakeCategory {
    pub const ALL: [MistakeCategory; 4] = [
        MistakeCategory::Recap,
        MistakeCategory::Tajweed,
        MistakeCategory::Haraka,
        MistakeCategory::Letter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MistakeCategory::Recap => "recap",
            MistakeCategory::Tajweed => "tajweed",
            MistakeCategory::Haraka => "haraka",
            MistakeCategory::Letter => "letter",
        }
    }

    /// The fixed color the category is drawn with.
    pub fn display_color(self) -> &'static str {
        match self {
            MistakeCategory::Recap => "#8B5CF6",
            MistakeCategory::Tajweed => "#10B981",
            MistakeCategory::Haraka => "#F97316",
            MistakeCategory::Letter => "#EF4444",
        }
    }
}

impl FromStr for MistakeCategory {
    type Err = HighlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MistakeCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| HighlightError::InvalidCategory(s.to_string()))
    }
}

impl fmt::Display for MistakeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Looks up the display color for a category name as stored in the database.
pub fn color_for_category(name: &str) -> Result<&'static str, HighlightError> {
    name.parse::<MistakeCategory>().map(MistakeCategory::display_color)
}

/// The color state of a highlight: a mistake category, or resolved.
///
/// Stored as the plain strings `recap`, `tajweed`, `haraka`, `letter`, `gold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HighlightColor {
    Mistake(MistakeCategory),
    Resolved,
}

impl HighlightColor {
    pub const RESOLVED_NAME: &'static str = "gold";

    pub fn as_str(self) -> &'static str {
        match self {
            HighlightColor::Mistake(category) => category.as_str(),
            HighlightColor::Resolved => Self::RESOLVED_NAME,
        }
    }

    pub fn display_color(self) -> &'static str {
        match self {
            HighlightColor::Mistake(category) => category.display_color(),
            HighlightColor::Resolved => RESOLVED_DISPLAY_COLOR,
        }
    }

    pub fn is_resolved(self) -> bool {
        self == HighlightColor::Resolved
    }
}

impl FromStr for HighlightColor {
    type Err = HighlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::RESOLVED_NAME {
            return Ok(HighlightColor::Resolved);
        }
        s.parse().map(HighlightColor::Mistake)
    }
}

impl TryFrom<String> for HighlightColor {
    type Error = HighlightError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HighlightColor> for String {
    fn from(color: HighlightColor) -> Self {
        color.as_str().to_string()
    }
}

impl From<MistakeCategory> for HighlightColor {
    fn from(category: MistakeCategory) -> Self {
        HighlightColor::Mistake(category)
    }
}

//=========================================================================================
// Highlights
//=========================================================================================

/// The teacher-supplied part of a highlight, before it gets an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHighlight {
    pub student_id: Uuid,
    pub surah: u32,
    pub ayah_start: u32,
    pub ayah_end: u32,
    pub word_start: Option<u32>,
    pub word_end: Option<u32>,
    pub page_number: Option<u32>,
    pub category: MistakeCategory,
    pub note: Option<String>,
    pub audio_note_url: Option<String>,
}

impl NewHighlight {
    /// Checks that the ayah/word range describes a real, ordered span.
    pub fn validate(&self) -> Result<(), HighlightError> {
        let invalid = |msg: String| Err(HighlightError::InvalidRange(msg));

        if !(1..=SURAH_COUNT).contains(&self.surah) {
            return invalid(format!("surah {} is outside 1..={SURAH_COUNT}", self.surah));
        }
        if self.ayah_start == 0 || self.ayah_end == 0 {
            return invalid("ayah numbers start at 1".to_string());
        }
        if self.ayah_end > MAX_AYAH_NUMBER {
            return invalid(format!(
                "ayah {} is beyond {MAX_AYAH_NUMBER}",
                self.ayah_end
            ));
        }
        if let Some(page) = self.page_number {
            check_page(page)?;
        }
        if self.ayah_start > self.ayah_end {
            return invalid(format!(
                "ayah_start {} is after ayah_end {}",
                self.ayah_start, self.ayah_end
            ));
        }
        match (self.word_start, self.word_end) {
            (Some(0), _) | (_, Some(0)) => invalid("word indices start at 1".to_string()),
            (None, Some(_)) => invalid("word_end given without word_start".to_string()),
            (Some(start), Some(end)) if self.ayah_start == self.ayah_end && start > end => {
                invalid(format!("word_start {start} is after word_end {end}"))
            }
            _ => Ok(()),
        }
    }
}

/// Checks that `page` is a plausible mushaf page number.
pub fn check_page(page: u32) -> Result<u32, HighlightError> {
    if (1..=MAX_PAGE_NUMBER).contains(&page) {
        Ok(page)
    } else {
        Err(HighlightError::InvalidRange(format!(
            "page {page} is outside 1..={MAX_PAGE_NUMBER}"
        )))
    }
}

/// A persisted mistake marking on a student's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: Uuid,
    pub student_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub surah: u32,
    pub ayah_start: u32,
    pub ayah_end: u32,
    pub word_start: Option<u32>,
    pub word_end: Option<u32>,
    pub page_number: Option<u32>,
    pub color: HighlightColor,
    pub previous_color: Option<HighlightColor>,
    pub note: Option<String>,
    pub audio_note_url: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Highlight {
    /// Builds a new, unresolved highlight from validated teacher input.
    pub fn create(
        new: NewHighlight,
        teacher_id: Option<Uuid>,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, HighlightError> {
        new.validate()?;
        Ok(Self {
            id,
            student_id: new.student_id,
            teacher_id,
            surah: new.surah,
            ayah_start: new.ayah_start,
            ayah_end: new.ayah_end,
            word_start: new.word_start,
            word_end: new.word_end,
            page_number: new.page_number,
            color: new.category.into(),
            previous_color: None,
            note: new.note,
            audio_note_url: new.audio_note_url,
            resolved_at: None,
            resolved_by: None,
            created_at: now,
        })
    }

    pub fn is_resolved(&self) -> bool {
        self.color.is_resolved()
    }

    /// Moves the highlight to the resolved color, remembering its category.
    pub fn resolve(&self, resolved_by: Uuid, now: DateTime<Utc>) -> Result<Self, HighlightError> {
        if self.is_resolved() {
            return Err(HighlightError::AlreadyResolved(self.id));
        }
        Ok(Self {
            previous_color: Some(self.color),
            color: HighlightColor::Resolved,
            resolved_at: Some(now),
            resolved_by: Some(resolved_by),
            ..self.clone()
        })
    }

    /// Reverts a resolved highlight to the color it had before.
    pub fn unresolve(&self) -> Result<Self, HighlightError> {
        if !self.is_resolved() {
            return Err(HighlightError::NotResolved(self.id));
        }
        let previous = self
            .previous_color
            .filter(|c| !c.is_resolved())
            .ok_or(HighlightError::MissingPreviousColor(self.id))?;
        Ok(Self {
            color: previous,
            previous_color: None,
            resolved_at: None,
            resolved_by: None,
            ..self.clone()
        })
    }
}

//=========================================================================================
// Page Progress
//=========================================================================================

/// How many highlights on one page have been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageProgress {
    pub is_complete: bool,
    pub completed: usize,
    pub total: usize,
}

impl PageProgress {
    fn tally<'a>(highlights: impl IntoIterator<Item = &'a Highlight>) -> Self {
        let (completed, total) = highlights
            .into_iter()
            .fold((0, 0), |(done, all), h| (done + h.is_resolved() as usize, all + 1));
        Self {
            // An empty page is not complete.
            is_complete: total > 0 && completed == total,
            completed,
            total,
        }
    }
}

/// Completion state of `page_number` over the given highlights.
pub fn page_progress(highlights: &[Highlight], page_number: u32) -> PageProgress {
    PageProgress::tally(
        highlights
            .iter()
            .filter(|h| h.page_number == Some(page_number)),
    )
}

/// Completion state of every page that has at least one highlight.
pub fn progress_by_page(highlights: &[Highlight]) -> BTreeMap<u32, PageProgress> {
    let mut pages: BTreeMap<u32, Vec<&Highlight>> = BTreeMap::new();
    for h in highlights {
        if let Some(page) = h.page_number {
            pages.entry(page).or_default().push(h);
        }
    }
    pages
        .into_iter()
        .map(|(page, on_page)| (page, PageProgress::tally(on_page)))
        .collect()
}
