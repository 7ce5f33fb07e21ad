//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI 3 document of the REST API to disk.
//!
//! Usage: `openapi [OUTPUT]` (defaults to `openapi.json`).

use api_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let doc = ApiDoc::openapi();
    std::fs::write(&path, doc.to_pretty_json()?)?;
    println!(
        "Wrote {} paths to {}",
        doc.paths.paths.len(),
        path.display()
    );
    Ok(())
}
