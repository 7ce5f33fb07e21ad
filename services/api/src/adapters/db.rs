//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of
//! the `DatabaseService` port from the core crate. It talks to the hosted
//! PostgreSQL database through `sqlx`. The tables belong to the hosted
//! database; nothing here creates or migrates them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quranakh_core::access::{Profile, Role};
use quranakh_core::highlight::{Highlight, HighlightColor};
use quranakh_core::ports::{DatabaseService, PortError, PortResult};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn unexpected(e: impl ToString) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Narrows a domain number to the `integer` column type.
fn to_column(n: u32) -> PortResult<i32> {
    i32::try_from(n).map_err(|_| unexpected(format!("{n} does not fit an integer column")))
}

fn from_column(n: i32) -> PortResult<u32> {
    u32::try_from(n).map_err(|_| unexpected(format!("Negative value {n} in a numeric column")))
}

fn not_found_or_unexpected(what: String) -> impl FnOnce(sqlx::Error) -> PortError {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        other => unexpected(other),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ProfileRecord {
    id: Uuid,
    role: String,
    school_id: Option<Uuid>,
}
impl ProfileRecord {
    fn to_domain(self) -> PortResult<Profile> {
        Ok(Profile {
            id: self.id,
            role: self.role.parse::<Role>().map_err(unexpected)?,
            school_id: self.school_id,
        })
    }
}

#[derive(FromRow)]
struct HighlightRecord {
    id: Uuid,
    student_id: Uuid,
    teacher_id: Option<Uuid>,
    surah: i32,
    ayah_start: i32,
    ayah_end: i32,
    word_start: Option<i32>,
    word_end: Option<i32>,
    page_number: Option<i32>,
    color: String,
    previous_color: Option<String>,
    note: Option<String>,
    audio_note_url: Option<String>,
    resolved_at: Option<DateTime<Utc>>,
    resolved_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}
impl HighlightRecord {
    fn to_domain(self) -> PortResult<Highlight> {
        let color = |s: &str| s.parse::<HighlightColor>().map_err(unexpected);
        Ok(Highlight {
            id: self.id,
            student_id: self.student_id,
            teacher_id: self.teacher_id,
            surah: from_column(self.surah)?,
            ayah_start: from_column(self.ayah_start)?,
            ayah_end: from_column(self.ayah_end)?,
            word_start: self.word_start.map(from_column).transpose()?,
            word_end: self.word_end.map(from_column).transpose()?,
            page_number: self.page_number.map(from_column).transpose()?,
            color: color(self.color.as_str())?,
            previous_color: self.previous_color.as_deref().map(color).transpose()?,
            note: self.note,
            audio_note_url: self.audio_note_url,
            resolved_at: self.resolved_at,
            resolved_by: self.resolved_by,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct AnnotationRecord {
    drawing: Value,
}

const HIGHLIGHT_COLUMNS: &str = "id, student_id, teacher_id, surah, ayah_start, ayah_end, \
     word_start, word_end, page_number, color, previous_color, note, audio_note_url, \
     resolved_at, resolved_by, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_profile(&self, profile_id: Uuid) -> PortResult<Profile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, role, school_id FROM profiles WHERE id = $1",
        )
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Profile {} not found", profile_id)))?;
        record.to_domain()
    }

    async fn is_parent_of(&self, parent_id: Uuid, student_id: Uuid) -> PortResult<bool> {
        let linked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM parent_students WHERE parent_id = $1 AND student_id = $2)",
        )
        .bind(parent_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(linked)
    }

    async fn insert_highlight(&self, h: &Highlight) -> PortResult<()> {
        let word_start = h.word_start.map(to_column).transpose()?;
        let word_end = h.word_end.map(to_column).transpose()?;
        let page_number = h.page_number.map(to_column).transpose()?;
        sqlx::query(&format!(
            "INSERT INTO highlights ({HIGHLIGHT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(h.id)
        .bind(h.student_id)
        .bind(h.teacher_id)
        .bind(to_column(h.surah)?)
        .bind(to_column(h.ayah_start)?)
        .bind(to_column(h.ayah_end)?)
        .bind(word_start)
        .bind(word_end)
        .bind(page_number)
        .bind(h.color.as_str())
        .bind(h.previous_color.map(HighlightColor::as_str))
        .bind(h.note.as_deref())
        .bind(h.audio_note_url.as_deref())
        .bind(h.resolved_at)
        .bind(h.resolved_by)
        .bind(h.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_highlight(&self, highlight_id: Uuid) -> PortResult<Highlight> {
        let record = sqlx::query_as::<_, HighlightRecord>(&format!(
            "SELECT {HIGHLIGHT_COLUMNS} FROM highlights WHERE id = $1"
        ))
        .bind(highlight_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found_or_unexpected(format!("Highlight {} not found", highlight_id)))?;
        record.to_domain()
    }

    async fn update_highlight(&self, h: &Highlight) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE highlights SET color = $1, previous_color = $2, note = $3, \
             audio_note_url = $4, resolved_at = $5, resolved_by = $6 WHERE id = $7",
        )
        .bind(h.color.as_str())
        .bind(h.previous_color.map(HighlightColor::as_str))
        .bind(h.note.as_deref())
        .bind(h.audio_note_url.as_deref())
        .bind(h.resolved_at)
        .bind(h.resolved_by)
        .bind(h.id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Highlight {} not found", h.id)));
        }
        Ok(())
    }

    async fn delete_highlight(&self, highlight_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = $1")
            .bind(highlight_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Highlight {} not found", highlight_id)));
        }
        Ok(())
    }

    async fn list_highlights(
        &self,
        student_id: Uuid,
        page_number: Option<u32>,
    ) -> PortResult<Vec<Highlight>> {
        let records = sqlx::query_as::<_, HighlightRecord>(&format!(
            "SELECT {HIGHLIGHT_COLUMNS} FROM highlights \
             WHERE student_id = $1 AND ($2::int IS NULL OR page_number = $2) \
             ORDER BY surah, ayah_start, word_start NULLS FIRST, created_at"
        ))
        .bind(student_id)
        .bind(page_number.map(to_column).transpose()?)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(HighlightRecord::to_domain).collect()
    }

    async fn save_annotation(
        &self,
        student_id: Uuid,
        page_number: u32,
        sketch: &Value,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO annotations (student_id, page_number, drawing, updated_at) \
             VALUES ($1, $2, $3, now()) \
             ON CONFLICT (student_id, page_number) \
             DO UPDATE SET drawing = EXCLUDED.drawing, updated_at = now()",
        )
        .bind(student_id)
        .bind(to_column(page_number)?)
        .bind(sketch)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn get_annotation(
        &self,
        student_id: Uuid,
        page_number: u32,
    ) -> PortResult<Option<Value>> {
        let record = sqlx::query_as::<_, AnnotationRecord>(
            "SELECT drawing FROM annotations WHERE student_id = $1 AND page_number = $2",
        )
        .bind(student_id)
        .bind(to_column(page_number)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.drawing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_beyond_the_column_range_are_rejected() {
        assert_eq!(to_column(604).ok(), Some(604));
        assert!(matches!(to_column(u32::MAX), Err(PortError::Unexpected(_))));
        assert!(matches!(to_column(i32::MAX as u32 + 1), Err(PortError::Unexpected(_))));
    }

    #[test]
    fn negative_column_values_are_rejected() {
        assert_eq!(from_column(7).ok(), Some(7));
        assert!(matches!(from_column(-1), Err(PortError::Unexpected(_))));
    }
}
