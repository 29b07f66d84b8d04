//! Embedded single-page UI
//!
//! Release builds embed `ui/`; debug builds read it from disk, so edits show
//! up without recompiling.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Marker in `index.html` replaced by the rendered welcome bubble
pub const WELCOME_SLOT: &str = "<!-- welcome -->";

/// Serve a file from `ui/assets/`
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let key = format!("assets/{}", path.trim_start_matches('/'));

    match Assets::get(&key) {
        Some(content) => {
            let mime = mime_guess::from_path(&key).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// The page shell, with `welcome_html` placed in the transcript
pub fn index_html(welcome_html: &str) -> Option<String> {
    let content = Assets::get("index.html")?;
    let page = String::from_utf8(content.data.into_owned()).ok()?;
    Some(page.replace(WELCOME_SLOT, welcome_html))
}
