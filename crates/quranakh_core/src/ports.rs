//! crates/quranakh_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core relies on.
//! Persistence is owned by the hosted database; the core only sees this port.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::access::Profile;
use crate::highlight::Highlight;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Profiles ---
    async fn get_profile(&self, profile_id: Uuid) -> PortResult<Profile>;

    async fn is_parent_of(&self, parent_id: Uuid, student_id: Uuid) -> PortResult<bool>;

    // --- Highlights ---
    async fn insert_highlight(&self, highlight: &Highlight) -> PortResult<()>;

    async fn get_highlight(&self, highlight_id: Uuid) -> PortResult<Highlight>;

    /// Overwrites the stored row (last write wins).
    async fn update_highlight(&self, highlight: &Highlight) -> PortResult<()>;

    async fn delete_highlight(&self, highlight_id: Uuid) -> PortResult<()>;

    /// All highlights of a student, optionally restricted to one page.
    async fn list_highlights(
        &self,
        student_id: Uuid,
        page_number: Option<u32>,
    ) -> PortResult<Vec<Highlight>>;

    // --- Annotation sketches (stored as opaque JSON) ---
    async fn save_annotation(
        &self,
        student_id: Uuid,
        page_number: u32,
        sketch: &Value,
    ) -> PortResult<()>;

    async fn get_annotation(&self, student_id: Uuid, page_number: u32)
        -> PortResult<Option<Value>>;
}
