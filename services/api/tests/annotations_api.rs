//! Integration tests for storing and rendering annotation sketches.

mod common;

use axum::http::{Method, StatusCode};
use common::{school, send};
use serde_json::json;

fn captured_sketch() -> serde_json::Value {
    json!({
        "width": 1000.0,
        "height": 800.0,
        "paths": [
            {
                "paths": [ {"x": 500.0, "y": 400.0}, {"x": 250.0, "y": 200.0} ],
                "strokeColor": "#d00",
                "strokeWidth": 3,
                "drawMode": true
            }
        ]
    })
}

#[tokio::test]
async fn sketch_is_stored_relative_and_rendered_at_new_size() {
    let s = school();
    let uri = format!("/students/{}/pages/7/annotations", s.student);

    let (status, stored) =
        send(&s.app, Method::PUT, &uri, Some(s.teacher), Some(captured_sketch())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["version"], "2.0");
    assert_eq!(stored["paths"][0]["paths"][0], json!({"x": 0.5, "y": 0.5}));
    assert_eq!(stored["containerDimensions"], json!({"width": 1000.0, "height": 800.0}));
    assert_eq!(s.db.annotation(s.student, 7), Some(stored));

    let zoomed = format!("{uri}?width=1500&height=1200");
    let (status, body) = send(&s.app, Method::GET, &zoomed, Some(s.student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["legacy"], false);
    let stroke = &body["sketch"]["paths"][0];
    assert_eq!(stroke["paths"][0], json!({"x": 750.0, "y": 600.0}));
    assert_eq!(stroke["paths"][1], json!({"x": 375.0, "y": 300.0}));
    assert_eq!(stroke["strokeColor"], "#d00");
    assert_eq!(stroke["strokeWidth"], 3);
}

#[tokio::test]
async fn legacy_sketch_is_returned_exactly_as_stored() {
    let s = school();
    let legacy = json!({
        "canvasId": "page-2",
        "paths": [
            { "paths": [ {"x": 1400, "y": 90, "pressure": 0.4} ], "strokeColor": "#000" }
        ]
    });
    s.db.put_annotation(s.student, 2, legacy.clone());

    let uri = format!("/students/{}/pages/2/annotations?width=10&height=10", s.student);
    let (status, body) = send(&s.app, Method::GET, &uri, Some(s.teacher), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["legacy"], true);
    assert_eq!(body["sketch"], legacy);
    assert_eq!(body["sketch"].to_string(), legacy.to_string());
}

#[tokio::test]
async fn legacy_sketch_of_any_shape_is_returned() {
    let s = school();
    let legacy = json!({ "lines": [[1, 2], [3, 4]] });
    s.db.put_annotation(s.student, 3, legacy.clone());

    let uri = format!("/students/{}/pages/3/annotations?width=10&height=10", s.student);
    let (status, body) = send(&s.app, Method::GET, &uri, Some(s.teacher), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sketch"], legacy);
}

#[tokio::test]
async fn render_without_surface_size_gets_an_error_code() {
    let s = school();
    s.db.put_annotation(s.student, 2, json!({ "paths": [] }));

    let uri = format!("/students/{}/pages/2/annotations?height=10", s.student);
    let (status, body) = send(&s.app, Method::GET, &uri, Some(s.teacher), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn missing_sketch_is_not_found() {
    let s = school();
    let uri = format!("/students/{}/pages/9/annotations?width=100&height=100", s.student);
    let (status, body) = send(&s.app, Method::GET, &uri, Some(s.teacher), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn negative_surface_is_a_bad_request() {
    let s = school();
    let uri = format!("/students/{}/pages/7/annotations", s.student);
    let mut sketch = captured_sketch();
    sketch["width"] = json!(-1.0);

    let (status, body) = send(&s.app, Method::PUT, &uri, Some(s.teacher), Some(sketch)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(s.db.annotation(s.student, 7), None);
}

#[tokio::test]
async fn parents_cannot_draw() {
    let s = school();
    let uri = format!("/students/{}/pages/7/annotations", s.student);
    let (status, _) =
        send(&s.app, Method::PUT, &uri, Some(s.parent), Some(captured_sketch())).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
