//! Shared helpers for API integration tests: an in-memory `DatabaseService`,
//! a seeded school, and request/response plumbing.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use api_lib::config::Config;
use api_lib::web::{self, middleware::USER_ID_HEADER, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use quranakh_core::access::{Profile, Role};
use quranakh_core::highlight::Highlight;
use quranakh_core::ports::{DatabaseService, PortError, PortResult};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// In-memory port
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryDb {
    profiles: Mutex<HashMap<Uuid, Profile>>,
    parent_links: Mutex<HashSet<(Uuid, Uuid)>>,
    highlights: Mutex<HashMap<Uuid, Highlight>>,
    annotations: Mutex<HashMap<(Uuid, u32), Value>>,
}

impl InMemoryDb {
    pub fn add_profile(&self, id: Uuid, role: Role, school_id: Option<Uuid>) {
        self.profiles
            .lock()
            .unwrap()
            .insert(id, Profile { id, role, school_id });
    }

    pub fn link_parent(&self, parent_id: Uuid, student_id: Uuid) {
        self.parent_links
            .lock()
            .unwrap()
            .insert((parent_id, student_id));
    }

    pub fn put_annotation(&self, student_id: Uuid, page: u32, sketch: Value) {
        self.annotations
            .lock()
            .unwrap()
            .insert((student_id, page), sketch);
    }

    pub fn annotation(&self, student_id: Uuid, page: u32) -> Option<Value> {
        self.annotations
            .lock()
            .unwrap()
            .get(&(student_id, page))
            .cloned()
    }

    pub fn highlight_count(&self) -> usize {
        self.highlights.lock().unwrap().len()
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn get_profile(&self, profile_id: Uuid) -> PortResult<Profile> {
        self.profiles
            .lock()
            .unwrap()
            .get(&profile_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Profile {profile_id} not found")))
    }

    async fn is_parent_of(&self, parent_id: Uuid, student_id: Uuid) -> PortResult<bool> {
        Ok(self
            .parent_links
            .lock()
            .unwrap()
            .contains(&(parent_id, student_id)))
    }

    async fn insert_highlight(&self, highlight: &Highlight) -> PortResult<()> {
        self.highlights
            .lock()
            .unwrap()
            .insert(highlight.id, highlight.clone());
        Ok(())
    }

    async fn get_highlight(&self, highlight_id: Uuid) -> PortResult<Highlight> {
        self.highlights
            .lock()
            .unwrap()
            .get(&highlight_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Highlight {highlight_id} not found")))
    }

    async fn update_highlight(&self, highlight: &Highlight) -> PortResult<()> {
        let mut highlights = self.highlights.lock().unwrap();
        match highlights.get_mut(&highlight.id) {
            Some(existing) => {
                *existing = highlight.clone();
                Ok(())
            }
            None => Err(PortError::NotFound(format!(
                "Highlight {} not found",
                highlight.id
            ))),
        }
    }

    async fn delete_highlight(&self, highlight_id: Uuid) -> PortResult<()> {
        self.highlights
            .lock()
            .unwrap()
            .remove(&highlight_id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Highlight {highlight_id} not found")))
    }

    async fn list_highlights(
        &self,
        student_id: Uuid,
        page_number: Option<u32>,
    ) -> PortResult<Vec<Highlight>> {
        let mut found: Vec<Highlight> = self
            .highlights
            .lock()
            .unwrap()
            .values()
            .filter(|h| h.student_id == student_id)
            .filter(|h| page_number.is_none() || h.page_number == page_number)
            .cloned()
            .collect();
        found.sort_by_key(|h| (h.surah, h.ayah_start, h.word_start, h.created_at));
        Ok(found)
    }

    async fn save_annotation(
        &self,
        student_id: Uuid,
        page_number: u32,
        sketch: &Value,
    ) -> PortResult<()> {
        self.put_annotation(student_id, page_number, sketch.clone());
        Ok(())
    }

    async fn get_annotation(
        &self,
        student_id: Uuid,
        page_number: u32,
    ) -> PortResult<Option<Value>> {
        Ok(self.annotation(student_id, page_number))
    }
}

// ---------------------------------------------------------------------------
// Seeded school
// ---------------------------------------------------------------------------

pub struct School {
    pub db: Arc<InMemoryDb>,
    pub app: Router,
    pub teacher: Uuid,
    pub student: Uuid,
    pub classmate: Uuid,
    pub parent: Uuid,
    pub outside_teacher: Uuid,
}

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        cors_origin: "http://localhost:3000".to_string(),
        max_body_bytes: 2 * 1024 * 1024,
        db_max_connections: 1,
    }
}

/// One school with a teacher, two students and a parent, plus a teacher from
/// another school.
pub fn school() -> School {
    let school_id = Uuid::new_v4();
    let db = Arc::new(InMemoryDb::default());

    let teacher = Uuid::new_v4();
    let student = Uuid::new_v4();
    let classmate = Uuid::new_v4();
    let parent = Uuid::new_v4();
    let outside_teacher = Uuid::new_v4();

    db.add_profile(teacher, Role::Teacher, Some(school_id));
    db.add_profile(student, Role::Student, Some(school_id));
    db.add_profile(classmate, Role::Student, Some(school_id));
    db.add_profile(parent, Role::Parent, None);
    db.add_profile(outside_teacher, Role::Teacher, Some(Uuid::new_v4()));
    db.link_parent(parent, student);

    let state = Arc::new(AppState {
        db: db.clone(),
        config: Arc::new(test_config()),
    });
    let app = web::router(state).unwrap();

    School {
        db,
        app,
        teacher,
        student,
        classmate,
        parent,
        outside_teacher,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Sends one request through the router and returns the status and JSON body
/// (`Value::Null` for an empty body).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    caller: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = caller {
        builder = builder.header(USER_ID_HEADER, id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
